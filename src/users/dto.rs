use serde::{Deserialize, Serialize};

use crate::users::model::{Role, User};

/// Registration body. Everything is optional at the wire level so a missing
/// field surfaces as the form-validation error, not a deserialization reject.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,

    pub bank_account_number: Option<String>,
    pub bank_account_name: Option<String>,
    pub bank_name: Option<String>,
    pub paypal_email: Option<String>,
    pub ifsc: Option<String>,

    /// Raw image bytes; optional, the upload path is skipped without it.
    pub profile_image: Option<serde_bytes::ByteBuf>,
    pub profile_image_content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body returned by register and login alongside the session cookie.
#[derive(Debug, Serialize)]
pub struct AuthBody {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileBody {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardBody {
    pub success: bool,
    pub leaderboard: Vec<User>,
}
