//! Authentication service for sign-in, session refresh, sign-out and accounts

use std::sync::OnceLock;

use bcrypt::{hash, verify, BcryptResult, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::{User, UserRole};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::{BootstrapConfig, Config};
use crate::error::{conflict_on_unique, AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for creating an inspector or admin account
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Tokens plus the signed-in account
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(flatten)]
    pub tokens: AuthTokens,
    pub user: User,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        let role = self
            .role
            .parse::<UserRole>()
            .map_err(|e| AppError::Internal(format!("Corrupt user record: {}", e)))?;
        Ok(User {
            id: self.id,
            email: self.email,
            name: self.name,
            role,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, name, role, is_active, created_at";

/// Decode and validate an access token
pub fn decode_access_token(secret: &str, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Emails are matched case-insensitively
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash verified against when the email has no account
fn placeholder_hash() -> Option<&'static str> {
    static PLACEHOLDER: OnceLock<Option<String>> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| hash("placeholder-password", DEFAULT_COST).ok())
        .as_deref()
}

/// Verify a password; a missing account always fails after the same work
fn check_password(password: &str, stored_hash: Option<&str>) -> BcryptResult<bool> {
    match stored_hash {
        Some(stored) => verify(password, stored),
        None => {
            if let Some(placeholder) = placeholder_hash() {
                verify(password, placeholder)?;
            }
            Ok(false)
        }
    }
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Authenticate user with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        let user = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(&email)
        .fetch_optional(&self.db)
        .await?;

        // bcrypt runs on the blocking pool
        let password = password.to_string();
        let password_hash = user.as_ref().map(|u| u.password_hash.clone());
        let valid = tokio::task::spawn_blocking(move || {
            check_password(&password, password_hash.as_deref())
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        let user = match user {
            Some(user) if valid => user,
            _ => {
                tracing::info!(email = %email, "sign-in rejected");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        sqlx::query("UPDATE users SET last_sign_in_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let user = user.into_user()?;
        let tokens = self.generate_tokens(&user)?;
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "user signed in");

        Ok(Session { tokens, user })
    }

    /// Rotate a refresh token into a fresh session
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<Session> {
        let token_hash = hash_token(refresh_token);

        // Refresh tokens are single-use
        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = NOW()
            WHERE token_hash = $1
              AND expires_at > NOW()
              AND revoked_at IS NULL
            RETURNING user_id
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        let user = self.current_user(user_id).await?;
        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        let tokens = self.generate_tokens(&user)?;
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        Ok(Session { tokens, user })
    }

    /// Revoke every outstanding refresh token of a user
    pub async fn sign_out(&self, user_id: Uuid) -> AppResult<u64> {
        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?
        .rows_affected();

        tracing::info!(user_id = %user_id, revoked, "user signed out");
        Ok(revoked)
    }

    /// Look up the account behind a session
    pub async fn current_user(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?
            .into_user()
    }

    /// Create an account
    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        input.validate()?;
        let email = normalize_email(&input.email);

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&self.db)
            .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "email".to_string(),
                message: "An account with this email already exists".to_string(),
            });
        }

        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&email)
        .bind(&password_hash)
        .bind(input.name.trim())
        .bind(input.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, "email", "An account with this email already exists"))?
        .into_user()?;

        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    /// List accounts, admins first
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY role ASC, name ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(UserRow::into_user)
        .collect()
    }

    /// Create the configured admin when no account exists yet
    pub async fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> AppResult<Option<User>> {
        let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password) else {
            return Ok(None);
        };

        let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        if users > 0 {
            return Ok(None);
        }

        let admin = self
            .create_user(CreateUserInput {
                email: email.clone(),
                password: password.clone(),
                name: bootstrap.admin_name.clone().unwrap_or_else(|| "Administrator".to_string()),
                role: UserRole::Admin,
            })
            .await?;
        Ok(Some(admin))
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user: &User) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let access_claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Refresh token (opaque random string)
        let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(hash_token(token))
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn token_for(exp: i64) -> String {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "inspector@example.com".to_string(),
            role: "inspector".to_string(),
            exp,
            iat: Utc::now().timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = hash_token("abc");
        assert_eq!(a.len(), 64);
        assert_eq!(a, hash_token("abc"));
        assert_ne!(a, hash_token("abd"));
        assert_eq!(
            a,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_check_password_with_account() {
        let stored = hash("correct horse", 4).unwrap();
        assert!(check_password("correct horse", Some(&stored)).unwrap());
        assert!(!check_password("wrong horse", Some(&stored)).unwrap());
    }

    #[test]
    fn test_check_password_without_account_still_hashes() {
        assert!(placeholder_hash().is_some());
        assert!(!check_password("placeholder-password", None).unwrap());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Inspector@Example.COM "), "inspector@example.com");
    }

    #[test]
    fn test_decode_valid_token() {
        let token = token_for((Utc::now() + Duration::minutes(5)).timestamp());
        let claims = decode_access_token(SECRET, &token).unwrap();
        assert_eq!(claims.role, "inspector");
    }

    #[test]
    fn test_decode_expired_token() {
        let token = token_for((Utc::now() - Duration::hours(1)).timestamp());
        assert!(matches!(decode_access_token(SECRET, &token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_decode_wrong_secret() {
        let token = token_for((Utc::now() + Duration::minutes(5)).timestamp());
        assert!(matches!(decode_access_token("other", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_create_user_input_validation() {
        let input = CreateUserInput {
            email: "not-an-email".to_string(),
            password: "longenough".to_string(),
            name: "Pat".to_string(),
            role: UserRole::Inspector,
        };
        let err: AppError = input.validate().unwrap_err().into();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "email"));
    }
}
