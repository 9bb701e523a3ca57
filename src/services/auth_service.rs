use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::{User, UserRole};
use crate::services::email_service::EmailService;
use crate::services::user_service::UserService;
use crate::utils::{crypto, token};

/// Credential and token lifecycle. The signing secret is handed in at
/// startup; nothing here reads ambient configuration.
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(users: UserService, jwt_secret: String) -> Self {
        Self { users, jwt_secret }
    }

    pub fn sign_token(&self, user_id: Uuid) -> Result<String> {
        token::sign_token(user_id, &self.jwt_secret)
    }

    /// Resolves an `Authorization` header to a live user: scheme check,
    /// signature/expiry check, existence check, then staleness check against
    /// the last password change.
    pub async fn authenticate_bearer(&self, header: Option<&str>) -> Result<User> {
        let header = header.ok_or_else(|| {
            Error::Unauthenticated("You are not logged in! Please log in to get access.".into())
        })?;
        let bearer = header.strip_prefix("Bearer ").ok_or_else(|| {
            Error::Unauthenticated("You are not logged in! Please log in to get access.".into())
        })?;

        let claims = token::verify_token(bearer, &self.jwt_secret)?;

        let user = self
            .users
            .find_by_id(claims.sub, false)
            .await?
            .ok_or_else(|| {
                Error::Unauthenticated("The user belonging to this token no longer exists.".into())
            })?;

        if user.password_changed_after(claims.iat) {
            return Err(Error::Unauthenticated(
                "User recently changed password! Please log in again.".into(),
            ));
        }

        Ok(user)
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        role: Option<UserRole>,
        password: &str,
    ) -> Result<(String, User)> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(Error::BadRequest("Email already exists".into()));
        }

        let password_hash = crypto::hash_password(password)?;
        let user = self
            .users
            .insert(name, email, role.unwrap_or(UserRole::User), &password_hash)
            .await?;
        let token = self.sign_token(user.id)?;
        Ok((token, user))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = self.users.find_by_email(email).await?;
        match user {
            Some(user) if crypto::verify_password(password, &user.password) => {
                self.sign_token(user.id)
            }
            _ => Err(Error::Unauthenticated("Invalid credentials".into())),
        }
    }

    /// Issues a reset token and emails the plaintext. The stored side is only
    /// ever the hash; a failed dispatch rolls the token fields back.
    pub async fn forgot_password(&self, email: &str, mailer: &EmailService) -> Result<()> {
        let user = self.users.find_by_email(email).await?.ok_or_else(|| {
            Error::NotFound("There is no user with that email address.".into())
        })?;

        let (plaintext, token_hash) = crypto::generate_reset_token();
        let expires = Utc::now() + Duration::minutes(token::RESET_TOKEN_TTL_MINUTES);
        self.users
            .store_reset_token(user.id, &token_hash, expires)
            .await?;

        if let Err(err) = mailer.send_password_reset(&user.email, &plaintext).await {
            self.users.clear_reset_token(user.id).await?;
            return Err(err);
        }
        Ok(())
    }

    /// Consumes a reset token: hash the plaintext, match an unexpired row,
    /// swap the password and clear the token in one statement (single use).
    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<String> {
        let token_hash = crypto::hash_reset_token(reset_token);
        let user = self
            .users
            .find_by_reset_token(&token_hash)
            .await?
            .ok_or_else(|| Error::BadRequest("Token is invalid or has expired".into()))?;

        let password_hash = crypto::hash_password(new_password)?;
        let user = self.users.reset_password(user.id, &password_hash).await?;
        self.sign_token(user.id)
    }

    pub async fn update_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<String> {
        if !crypto::verify_password(current_password, &user.password) {
            return Err(Error::Unauthenticated("Your current password is wrong.".into()));
        }
        let password_hash = crypto::hash_password(new_password)?;
        let user = self.users.set_password(user.id, &password_hash).await?;
        self.sign_token(user.id)
    }
}
