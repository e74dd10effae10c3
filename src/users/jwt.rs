use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    Json, RequestPartsExt,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::AuthBody;
use crate::users::model::User;

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub token_ttl: Duration,
    pub cookie_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_days,
            cookie_ttl_days,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            token_ttl: Duration::from_secs(ttl_days * 24 * 60 * 60),
            cookie_ttl: Duration::from_secs(cookie_ttl_days * 24 * 60 * 60),
        }
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.token_ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Sign a session token for `user` and write the one response a successful
/// auth request gets: the HttpOnly `token` cookie plus the JSON body.
pub fn issue_token(
    keys: &JwtKeys,
    jar: CookieJar,
    user: User,
    message: &str,
    status: StatusCode,
) -> Result<(StatusCode, CookieJar, Json<AuthBody>), ApiError> {
    let token = keys.sign(user.id)?;
    let expires = OffsetDateTime::now_utc()
        + TimeDuration::seconds(keys.cookie_ttl.as_secs() as i64);
    let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
        .http_only(true)
        .path("/")
        .expires(expires)
        .build();
    Ok((
        status,
        jar.add(cookie),
        Json(AuthBody {
            success: true,
            message: message.to_string(),
            token,
            user,
        }),
    ))
}

/// Authenticated caller, resolved from a Bearer header or the session
/// cookie. Handlers take this instead of reading ambient request state.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let bearer = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);

        let token = match bearer {
            Some(t) => t,
            None => {
                let jar: CookieJar = parts.extract().await.map_err(|_| {
                    ApiError::Unauthorized("User not authenticated.")
                })?;
                match jar.get(TOKEN_COOKIE) {
                    Some(c) => c.value().to_string(),
                    None => return Err(ApiError::Unauthorized("User not authenticated.")),
                }
            }
        };

        match keys.verify(&token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(ApiError::Unauthorized("Invalid or expired token."))
            }
        }
    }
}
