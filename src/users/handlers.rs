use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use bytes::Bytes;
use sqlx::types::Json as Jsonb;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::ApiError,
    state::AppState,
    users::{
        dto::{AuthBody, LeaderboardBody, LoginRequest, MessageBody, ProfileBody, RegisterRequest},
        jwt::{issue_token, AuthUser, JwtKeys, TOKEN_COOKIE},
        model::{NewUser, User},
        services::{
            ext_from_mime, hash_password, rank_by_spend, validate_registration, verify_password,
        },
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", get(logout))
        .route("/users/me", get(profile))
        .route("/users/leaderboard", get(leaderboard))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthBody>), ApiError> {
    let registration = validate_registration(&payload)?;

    // Fast-path duplicate check; the unique index is still the authority
    // if two registrations race.
    if User::find_by_email(&state.db, &registration.email)
        .await?
        .is_some()
    {
        warn!(email = %registration.email, "email already registered");
        return Err(ApiError::Conflict);
    }

    let profile_image = match payload.profile_image {
        Some(bytes) => {
            let content_type = payload
                .profile_image_content_type
                .as_deref()
                .unwrap_or("image/jpeg");
            let ext = ext_from_mime(content_type)
                .ok_or(ApiError::Validation("File format not supported."))?;
            let key = format!("users/{}.{}", Uuid::new_v4(), ext);
            let uploaded = state
                .media
                .upload(&key, Bytes::from(bytes.into_vec()), content_type)
                .await
                .map_err(ApiError::Upload)?;
            Some(Jsonb(uploaded))
        }
        None => None,
    };

    let password_hash = hash_password(&registration.password)?;

    let user = User::create(
        &state.db,
        &NewUser {
            user_name: registration.user_name,
            email: registration.email,
            password_hash,
            phone: registration.phone,
            address: registration.address,
            role: registration.role,
            payment_methods: registration.payment_methods.map(Jsonb),
            profile_image,
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, role = ?user.role, "user registered");
    let keys = JwtKeys::from_ref(&state);
    issue_token(&keys, jar, user, "User Registered.", StatusCode::CREATED)
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthBody>), ApiError> {
    let (email, password) = match (payload.email.as_deref(), payload.password.as_deref()) {
        (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (e.trim(), p),
        _ => return Err(ApiError::Validation("Please fill full form.")),
    };

    // Unknown email and wrong password must be indistinguishable.
    let user = match User::find_by_email(&state.db, email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::Auth);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth);
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let keys = JwtKeys::from_ref(&state);
    issue_token(&keys, jar, user, "Login successfully.", StatusCode::OK)
}

/// Clears the session on the client by overwriting the cookie with an
/// empty value that expires immediately.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (StatusCode, CookieJar, Json<MessageBody>) {
    let cookie = Cookie::build((TOKEN_COOKIE, ""))
        .http_only(true)
        .path("/")
        .expires(OffsetDateTime::now_utc())
        .build();
    (
        StatusCode::OK,
        jar.add(cookie),
        Json(MessageBody {
            success: true,
            message: "Logout Successfully.".to_string(),
        }),
    )
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileBody>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::Unauthorized("User not authenticated."))?;
    Ok(Json(ProfileBody {
        success: true,
        user,
    }))
}

#[instrument(skip(state))]
pub async fn leaderboard(State(state): State<AppState>) -> Result<Json<LeaderboardBody>, ApiError> {
    let spenders = User::find_spenders(&state.db).await?;
    Ok(Json(LeaderboardBody {
        success: true,
        leaderboard: rank_by_spend(spenders),
    }))
}

#[cfg(test)]
mod logout_tests {
    use super::*;
    use axum::http::{header, HeaderMap};
    use axum::response::IntoResponse;
    use axum_extra::extract::cookie::Expiration;

    #[tokio::test]
    async fn logout_expires_the_cookie_now() {
        let jar = CookieJar::from_headers(&HeaderMap::new());
        let res = logout(jar).await.into_response();
        assert_eq!(res.status(), StatusCode::OK);

        let set_cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie header")
            .to_str()
            .unwrap()
            .to_string();
        let cookie = Cookie::parse(set_cookie).expect("parse cookie");
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.http_only(), Some(true));
        match cookie.expires().expect("expiry") {
            Expiration::DateTime(dt) => assert!(dt <= OffsetDateTime::now_utc()),
            Expiration::Session => panic!("expected a dated expiry"),
        }
    }

    #[tokio::test]
    async fn logout_body_is_success_message() {
        let jar = CookieJar::from_headers(&HeaderMap::new());
        let (_, _, Json(body)) = logout(jar).await;
        assert!(body.success);
        assert_eq!(body.message, "Logout Successfully.");
    }
}
