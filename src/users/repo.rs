use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::model::{NewUser, User};

const USER_COLUMNS: &str = "id, user_name, email, password_hash, phone, address, \
                            role, payment_methods, money_spent, profile_image, created_at";

impl User {
    /// Find a user by email. The row carries the password hash; callers other
    /// than login must not echo it (serialization strips it regardless).
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. A unique violation on email or user_name maps to
    /// `ApiError::Conflict` — the database constraint is the real duplicate
    /// check, not the read that preceded it.
    pub async fn create(db: &PgPool, new: &NewUser) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users \
                 (user_name, email, password_hash, phone, address, role, \
                  payment_methods, profile_image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new.user_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.phone)
        .bind(&new.address)
        .bind(new.role)
        .bind(&new.payment_methods)
        .bind(&new.profile_image)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Everyone who has spent money. Ordering happens in the service layer.
    pub async fn find_spenders(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE money_spent > 0"
        ))
        .fetch_all(db)
        .await?;
        Ok(users)
    }
}
