use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::task;
use uuid::Uuid;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{NewUser, User},
};

/// Outcome of a successful registration or login
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Account registration, login, and stateless bearer-token authentication
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Creates an account and mints its API token. Username is trimmed and
    /// email lowercased before the store's uniqueness checks apply.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<AuthSession> {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::InvalidInput("Username is required".to_string()));
        }

        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AppError::InvalidInput(
                "A valid email is required".to_string(),
            ));
        }

        if password.len() < 8 {
            return Err(AppError::InvalidInput(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let password_hash = hash_password(password.to_string()).await?;
        let token = mint_token();

        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
                api_token: token.clone(),
            })
            .await?;

        tracing::info!(user_id = %user.id, "Account registered");

        Ok(AuthSession { user, token })
    }

    /// Verifies email + password. Unknown email and wrong password are the
    /// same undifferentiated rejection.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let email = email.trim().to_lowercase();

        let Some(record) = self.users.find_by_email(&email).await? else {
            return Err(AppError::Unauthenticated("Invalid credentials".to_string()));
        };

        let verified = verify_password(password.to_string(), record.password_hash.clone()).await?;
        if !verified {
            return Err(AppError::Unauthenticated("Invalid credentials".to_string()));
        }

        let token = record.api_token.clone();
        Ok(AuthSession {
            user: record.into(),
            token,
        })
    }

    /// Resolves a bearer token to its account. Called on every protected
    /// request; nothing is cached between calls.
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        self.users
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Invalid or expired token".to_string()))
    }
}

/// Argon2 is CPU-intensive, so both directions run on the blocking pool
async fn hash_password(password: String) -> AppResult<String> {
    task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password hashing task panicked: {}", e)))?
}

async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash format: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password verification task panicked: {}", e)))?
}

fn mint_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::MockUserStore;
    use chrono::Utc;

    fn test_user(username: &str, email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_trims_username_and_lowercases_email() {
        let mut store = MockUserStore::new();
        store
            .expect_create()
            .withf(|new_user: &NewUser| {
                new_user.username == "frodo"
                    && new_user.email == "frodo@shire.example"
                    && !new_user.api_token.is_empty()
                    && new_user.password_hash.starts_with("$argon2")
            })
            .returning(|new_user| Ok(test_user(&new_user.username, &new_user.email)));

        let service = AuthService::new(Arc::new(store));
        let session = service
            .register("  frodo  ", "Frodo@Shire.Example", "longpassword")
            .await
            .unwrap();

        assert_eq!(session.user.username, "frodo");
        assert!(!session.token.is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_short_password_before_store() {
        let mut store = MockUserStore::new();
        store.expect_create().times(0);

        let service = AuthService::new(Arc::new(store));
        let result = service.register("frodo", "frodo@shire.example", "short").await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let hash = hash_password("correct-password".to_string()).await.unwrap();
        let user = test_user("frodo", "frodo@shire.example");

        let mut store = MockUserStore::new();
        store.expect_find_by_email().returning(move |_| {
            Ok(Some(crate::models::UserCredentials {
                id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
                password_hash: hash.clone(),
                api_token: "token".to_string(),
                created_at: user.created_at,
                updated_at: user.updated_at,
            }))
        });

        let service = AuthService::new(Arc::new(store));

        let ok = service
            .login("frodo@shire.example", "correct-password")
            .await
            .unwrap();
        assert_eq!(ok.token, "token");

        let err = service.login("frodo@shire.example", "wrong").await;
        assert!(matches!(err, Err(AppError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_unauthenticated() {
        let mut store = MockUserStore::new();
        store.expect_find_by_email().returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(store));
        let result = service.login("nobody@example.com", "whatever-password").await;

        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token_is_unauthenticated() {
        let mut store = MockUserStore::new();
        store.expect_find_by_token().returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(store));
        let result = service.authenticate("bogus").await;

        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }
}
