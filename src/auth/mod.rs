//! Authentication: credential handling, token issuance, signup/login.

pub mod password;
pub mod token;

pub use token::{TokenError, TokenService};

use rand::Rng;
use tracing::info;

use crate::db::{self, AuthResponse, DbPool, StoreError, User, UserResponse};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already in use")]
    EmailInUse,
    /// One kind for both unknown email and wrong password, so responses
    /// cannot be used to enumerate accounts.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Login first to access this resource")]
    Unauthenticated,
    #[error("Account no longer exists")]
    AccountNotFound,
    #[error("Failed to hash password")]
    Hash,
    #[error("Failed to issue token")]
    TokenIssue,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AuthError::EmailInUse,
            other => AuthError::Store(other),
        }
    }
}

/// Composes the account directory, credential hasher and token service.
#[derive(Clone)]
pub struct AuthService {
    db: DbPool,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(db: DbPool, tokens: TokenService) -> Self {
        Self { db, tokens }
    }

    /// Register a new account with role `user` and log it in.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthError> {
        if db::users::find_by_email(&self.db, email).await?.is_some() {
            return Err(AuthError::EmailInUse);
        }

        // Hashing is CPU-bound; keep it off the async workers
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
            .await
            .map_err(|_| AuthError::Hash)?
            .map_err(|_| AuthError::Hash)?;

        let phone = placeholder_phone();

        // The UNIQUE constraint closes the lookup/insert race: a concurrent
        // signup with the same email maps to EmailInUse here too.
        let user =
            db::users::create_user(&self.db, name, email, &password_hash, "user", &phone).await?;

        info!(email = %user.email, "New account registered");

        let token = self
            .tokens
            .issue(&user.id)
            .map_err(|_| AuthError::TokenIssue)?;
        Ok(AuthResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    /// Verify credentials and issue a fresh token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let user = db::users::find_by_email(&self.db, email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
            .await
            .map_err(|_| AuthError::Hash)?;

        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&user.id)
            .map_err(|_| AuthError::TokenIssue)?;
        Ok(AuthResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    /// Resolve a bearer token to the user it was issued for.
    ///
    /// Tokens are not revoked on any event, so a token can outlive its
    /// account; that case is `AccountNotFound` rather than `Unauthenticated`.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let user_id = self
            .tokens
            .validate(token)
            .map_err(|_| AuthError::Unauthenticated)?;

        match db::users::find_by_id(&self.db, &user_id).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound) => Err(AuthError::AccountNotFound),
            Err(other) => Err(AuthError::Store(other)),
        }
    }
}

/// Placeholder phone number assigned at signup: +91 plus ten random digits.
fn placeholder_phone() -> String {
    let digits: u64 = rand::rng().random_range(1_000_000_000..10_000_000_000);
    format!("+91{}", digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_pool;

    async fn service() -> AuthService {
        let pool = init_test_pool().await;
        AuthService::new(pool, TokenService::new("test-secret", 1))
    }

    #[tokio::test]
    async fn test_signup_returns_token_and_public_view() {
        let auth = service().await;

        let response = auth
            .signup("Ada", "ada@example.com", "hunter2hunter2")
            .await
            .unwrap();

        assert!(!response.token.is_empty());
        assert_eq!(response.user.email, "ada@example.com");
        assert_eq!(response.user.role, "user");
        assert!(response.user.phone.starts_with("+91"));
        assert_eq!(response.user.phone.len(), 13);

        // The public view must not leak the password hash
        let json = serde_json::to_value(&response.user).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_signup_fails() {
        let auth = service().await;
        auth.signup("Ada", "ada@example.com", "hunter2hunter2")
            .await
            .unwrap();

        let err = auth
            .signup("Eve", "ada@example.com", "different-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailInUse));
    }

    #[tokio::test]
    async fn test_login_roundtrip() {
        let auth = service().await;
        auth.signup("Ada", "ada@example.com", "hunter2hunter2")
            .await
            .unwrap();

        let response = auth.login("ada@example.com", "hunter2hunter2").await.unwrap();
        assert_eq!(response.user.name, "Ada");

        let user = auth.authenticate(&response.token).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_credential_failures_are_indistinguishable() {
        let auth = service().await;
        auth.signup("Ada", "ada@example.com", "hunter2hunter2")
            .await
            .unwrap();

        let wrong_password = auth
            .login("ada@example.com", "not-the-password")
            .await
            .unwrap_err();
        let unknown_email = auth
            .login("nobody@example.com", "hunter2hunter2")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage() {
        let auth = service().await;
        let err = auth.authenticate("not-a-token").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_token_outliving_account() {
        let pool = init_test_pool().await;
        let auth = AuthService::new(pool.clone(), TokenService::new("test-secret", 1));

        let response = auth
            .signup("Ada", "ada@example.com", "hunter2hunter2")
            .await
            .unwrap();

        sqlx::query("DELETE FROM users WHERE email = ?")
            .bind("ada@example.com")
            .execute(&pool)
            .await
            .unwrap();

        let err = auth.authenticate(&response.token).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountNotFound));
    }
}
