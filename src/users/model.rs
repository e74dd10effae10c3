use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::storage::UploadedMedia;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    Bidder,
    Auctioneer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransfer {
    pub bank_account_number: String,
    pub bank_account_name: String,
    pub bank_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ifsc {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paypal {
    pub paypal_email: String,
}

/// Payout details collected at registration. Only Auctioneers carry one;
/// the registration validator refuses to build an Auctioneer without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethods {
    pub bank_transfer: BankTransfer,
    pub ifsc: Ifsc,
    pub paypal: Paypal,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 hash, never exposed in JSON
    pub phone: String,
    pub address: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<Json<PaymentMethods>>,
    pub money_spent: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<Json<UploadedMedia>>,
    pub created_at: OffsetDateTime,
}

/// Fields for a fresh insert; id, money_spent and created_at come from
/// the database defaults.
#[derive(Debug)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub address: String,
    pub role: Role,
    pub payment_methods: Option<Json<PaymentMethods>>,
    pub profile_image: Option<Json<UploadedMedia>>,
}

#[cfg(test)]
pub(crate) fn sample_user() -> User {
    User {
        id: Uuid::new_v4(),
        user_name: "ravi".into(),
        email: "ravi@example.com".into(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$secret".into(),
        phone: "9999999999".into(),
        address: "12 Auction Lane".into(),
        role: Role::Bidder,
        payment_methods: None,
        money_spent: Decimal::ZERO,
        profile_image: None,
        created_at: OffsetDateTime::now_utc(),
    }
}
