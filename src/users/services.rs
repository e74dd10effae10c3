use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::error;

use crate::error::ApiError;
use crate::users::dto::RegisterRequest;
use crate::users::model::{BankTransfer, Ifsc, PaymentMethods, Paypal, Role, User};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Registration input after field validation. `payment_methods` is only
/// populated for Auctioneers, so downstream code cannot create one without
/// payout details.
#[derive(Debug)]
pub struct ValidatedRegistration {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    pub role: Role,
    pub payment_methods: Option<PaymentMethods>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Field checks for registration, in the order clients expect the messages:
/// the shared required fields first, then the Auctioneer payout checks
/// (bank details, PayPal, IFSC) each with its own message.
pub fn validate_registration(req: &RegisterRequest) -> Result<ValidatedRegistration, ApiError> {
    // The password is presence-checked like the other fields but must reach
    // the hasher exactly as sent; trimming it here would store a hash the
    // user's own password can never match at login.
    let password_as_sent = req.password.as_deref().filter(|p| !p.trim().is_empty());
    let (user_name, email, password, phone, address, role) = match (
        non_empty(&req.user_name),
        non_empty(&req.email),
        password_as_sent,
        non_empty(&req.phone),
        non_empty(&req.address),
        req.role,
    ) {
        (Some(u), Some(e), Some(p), Some(ph), Some(a), Some(r)) => (u, e, p, ph, a, r),
        _ => return Err(ApiError::Validation("Please fill full form.")),
    };

    if !is_valid_email(email) {
        return Err(ApiError::Validation("Please provide a valid email."));
    }

    let payment_methods = match role {
        Role::Bidder => None,
        Role::Auctioneer => {
            let (bank_account_name, bank_account_number, bank_name) = match (
                non_empty(&req.bank_account_name),
                non_empty(&req.bank_account_number),
                non_empty(&req.bank_name),
            ) {
                (Some(name), Some(number), Some(bank)) => (name, number, bank),
                _ => {
                    return Err(ApiError::Validation(
                        "Please provide your full bank details.",
                    ))
                }
            };

            let paypal_email = non_empty(&req.paypal_email).ok_or(ApiError::Validation(
                "Please provide your PayPal email.",
            ))?;

            let ifsc = non_empty(&req.ifsc).ok_or(ApiError::Validation(
                "Please provide your valid IFSC Code.",
            ))?;

            Some(PaymentMethods {
                bank_transfer: BankTransfer {
                    bank_account_number: bank_account_number.to_string(),
                    bank_account_name: bank_account_name.to_string(),
                    bank_name: bank_name.to_string(),
                },
                ifsc: Ifsc {
                    code: ifsc.to_string(),
                },
                paypal: Paypal {
                    paypal_email: paypal_email.to_string(),
                },
            })
        }
    };

    Ok(ValidatedRegistration {
        user_name: user_name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        phone: phone.to_string(),
        address: address.to_string(),
        role,
        payment_methods,
    })
}

/// Leaderboard ordering: positive spenders only, highest first. The sort is
/// stable so equal spenders keep their fetch order.
pub fn rank_by_spend(mut users: Vec<User>) -> Vec<User> {
    users.retain(|u| u.money_spent > Decimal::ZERO);
    users.sort_by(|a, b| b.money_spent.cmp(&a.money_spent));
    users
}

pub(crate) fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}


#[cfg(test)]
mod leaderboard_tests {
    use super::*;
    use crate::users::model::sample_user;

    fn user_with_spend(name: &str, spend: i64) -> User {
        let mut user = sample_user();
        user.user_name = name.to_string();
        user.money_spent = Decimal::from(spend);
        user
    }

    #[test]
    fn ranks_positive_spenders_descending() {
        let users = vec![
            user_with_spend("a", 0),
            user_with_spend("b", 50),
            user_with_spend("c", 10),
            user_with_spend("d", 0),
            user_with_spend("e", 200),
        ];
        let ranked = rank_by_spend(users);
        let spends: Vec<i64> = ranked
            .iter()
            .map(|u| u.money_spent.try_into().unwrap())
            .collect();
        assert_eq!(spends, vec![200, 50, 10]);
    }

    #[test]
    fn ties_keep_fetch_order() {
        let users = vec![
            user_with_spend("first", 10),
            user_with_spend("second", 10),
            user_with_spend("third", 25),
        ];
        let ranked = rank_by_spend(users);
        let names: Vec<&str> = ranked.iter().map(|u| u.user_name.as_str()).collect();
        assert_eq!(names, vec!["third", "first", "second"]);
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(rank_by_spend(Vec::new()).is_empty());
    }
}
