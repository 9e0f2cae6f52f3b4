//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::User;
use shared::validation::{validate_email, validate_password};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for registering a new user
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Input for logging in
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Input for changing the current user's password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token issued after login or registration
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a new user account
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthTokens> {
        if input.username.len() < 3 {
            return Err(AppError::Validation {
                field: "username".to_string(),
                message: "Username must be at least 3 characters".to_string(),
                message_vi: "Tên đăng nhập phải có ít nhất 3 ký tự".to_string(),
            });
        }
        if validate_password(&input.password).is_err() {
            return Err(AppError::Validation {
                field: "password".to_string(),
                message: "Password must be at least 8 characters".to_string(),
                message_vi: "Mật khẩu phải có ít nhất 8 ký tự".to_string(),
            });
        }
        if let Some(ref email) = input.email {
            if validate_email(email).is_err() {
                return Err(AppError::Validation {
                    field: "email".to_string(),
                    message: "Invalid email format".to_string(),
                    message_vi: "Định dạng email không hợp lệ".to_string(),
                });
            }
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("bcrypt failure: {}", e)))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, full_name, email, role)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'user'))
            RETURNING *
            "#,
        )
        .bind(&input.username)
        .bind(&password_hash)
        .bind(&input.full_name)
        .bind(&input.email)
        .bind(&input.role)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "username"))?;

        self.issue_tokens(user)
    }

    /// Log in with username and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE username = $1 AND is_active = TRUE",
        )
        .bind(&input.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let matches = verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("bcrypt failure: {}", e)))?;
        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET last_login_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .fetch_one(&self.db)
        .await?;

        self.issue_tokens(user)
    }

    /// Look up an active account by id
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active = TRUE")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Change the password of an authenticated user
    pub async fn change_password(
        &self,
        user_id: Uuid,
        input: ChangePasswordInput,
    ) -> AppResult<()> {
        if validate_password(&input.new_password).is_err() {
            return Err(AppError::Validation {
                field: "new_password".to_string(),
                message: "Password must be at least 8 characters".to_string(),
                message_vi: "Mật khẩu phải có ít nhất 8 ký tự".to_string(),
            });
        }

        let current_hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let matches = verify(&input.current_password, &current_hash)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("bcrypt failure: {}", e)))?;
        if !matches {
            return Err(AppError::InvalidCredentials);
        }

        let new_hash = hash(&input.new_password, DEFAULT_COST)
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("bcrypt failure: {}", e)))?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(&new_hash)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    fn issue_tokens(&self, user: User) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("token encoding failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            user,
        })
    }
}
