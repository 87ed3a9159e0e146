use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use tracing::{debug, error, info, warn};

use crate::{
    auth::{
        dto::{SigninRequest, SigninResponse, SignupRequest},
        jwt::{JwtKeys, TokenError},
        password::{hash_password, verify_password, verify_unknown_account, PasswordError},
        repo::{with_timeout, CredentialStore, StoreError},
        repo_types::{NewUser, User},
    },
    state::AppState,
};

/// Outcome of a rejected signup or signin.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("email already registered")]
    DuplicateEmail,
    /// Unknown email and wrong password both end here.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Hash(PasswordError),
    #[error(transparent)]
    Token(TokenError),
}

/// Signup and signin over an injected store and key set.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    keys: JwtKeys,
    storage_timeout: Duration,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.users.clone(),
            state.jwt.clone(),
            state.config.storage_timeout(),
        )
    }
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, keys: JwtKeys, storage_timeout: Duration) -> Self {
        Self {
            store,
            keys,
            storage_timeout,
        }
    }

    /// Registers a new account. No token is issued; the caller signs in next.
    pub async fn signup(&self, req: SignupRequest) -> Result<User, AuthError> {
        let SignupRequest {
            name,
            email,
            password,
            confirm_password,
        } = req;

        if name.trim().is_empty()
            || email.trim().is_empty()
            || password.is_empty()
            || confirm_password.is_empty()
        {
            debug!("signup missing fields");
            return Err(AuthError::InvalidInput(
                "name, email, password and confirmPassword are required",
            ));
        }

        if password != confirm_password {
            debug!("signup password mismatch");
            return Err(AuthError::PasswordMismatch);
        }

        let existing = with_timeout(self.storage_timeout, self.store.find_by_email(&email))
            .await
            .map_err(|e| {
                error!(error = %e, "find_by_email failed");
                AuthError::Store(e)
            })?;
        if existing.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(&password).map_err(AuthError::Hash)?;

        let new_user = NewUser {
            name,
            email,
            password_hash,
        };
        let user = match with_timeout(self.storage_timeout, self.store.create(new_user)).await {
            Ok(u) => u,
            Err(StoreError::Duplicate) => {
                warn!("email registered concurrently; rejected by store");
                return Err(AuthError::DuplicateEmail);
            }
            Err(e) => {
                error!(error = %e, "create user failed");
                return Err(AuthError::Store(e));
            }
        };

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Checks credentials and issues a bearer token for the account's email.
    pub async fn signin(&self, req: SigninRequest) -> Result<SigninResponse, AuthError> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            debug!("signin missing fields");
            return Err(AuthError::InvalidInput("email and password are required"));
        }

        let user = match with_timeout(self.storage_timeout, self.store.find_by_email(&req.email))
            .await
        {
            Ok(Some(u)) => u,
            Ok(None) => {
                verify_unknown_account(&req.password);
                warn!(email = %req.email, "signin unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "find_by_email failed");
                return Err(AuthError::Store(e));
            }
        };

        let ok = match verify_password(&req.password, &user.password_hash) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, user_id = %user.id, "stored password digest unreadable");
                false
            }
        };
        if !ok {
            warn!(email = %req.email, user_id = %user.id, "signin invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.keys.issue(&user.email).map_err(|e| {
            error!(error = %e, "jwt sign failed");
            AuthError::Token(e)
        })?;

        info!(user_id = %user.id, email = %user.email, "user signed in");
        Ok(SigninResponse {
            token,
            name: user.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{jwt::DEFAULT_TTL, memory::InMemoryCredentialStore};
    use async_trait::async_trait;

    fn keys() -> JwtKeys {
        JwtKeys::new(b"test-secret", DEFAULT_TTL)
    }

    fn service_with(store: Arc<dyn CredentialStore>) -> AuthService {
        AuthService::new(store, keys(), Duration::from_secs(5))
    }

    fn signup_req(email: &str, password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            name: "A".into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    fn signin_req(email: &str, password: &str) -> SigninRequest {
        SigninRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn signup_stores_hash_not_plaintext() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let svc = service_with(store.clone());

        let user = svc
            .signup(signup_req("a@x.com", "secret1", "secret1"))
            .await
            .expect("signup");
        assert_eq!(user.email, "a@x.com");
        assert_ne!(user.password_hash, "secret1");
        assert!(verify_password("secret1", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn signup_rejects_empty_fields() {
        let svc = service_with(Arc::new(InMemoryCredentialStore::new()));
        let cases = [
            SignupRequest {
                name: "".into(),
                ..signup_req("a@x.com", "p", "p")
            },
            SignupRequest {
                name: "   ".into(),
                ..signup_req("a@x.com", "p", "p")
            },
            signup_req("", "p", "p"),
            signup_req("a@x.com", "", "p"),
            signup_req("a@x.com", "p", ""),
        ];
        for req in cases {
            let err = svc.signup(req).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidInput(_)), "got {err:?}");
        }
    }

    #[tokio::test]
    async fn signup_rejects_mismatched_confirmation() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let svc = service_with(store.clone());
        let err = svc
            .signup(signup_req("a@x.com", "secret1", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn second_signup_with_same_email_is_duplicate() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let svc = service_with(store.clone());
        svc.signup(signup_req("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let err = svc
            .signup(signup_req("a@x.com", "other", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn email_uniqueness_is_case_sensitive() {
        let svc = service_with(Arc::new(InMemoryCredentialStore::new()));
        svc.signup(signup_req("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();
        svc.signup(signup_req("A@x.com", "secret1", "secret1"))
            .await
            .expect("differently-cased email is a separate account");
    }

    #[tokio::test]
    async fn signin_issues_token_for_email() {
        let svc = service_with(Arc::new(InMemoryCredentialStore::new()));
        svc.signup(signup_req("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let res = svc.signin(signin_req("a@x.com", "secret1")).await.unwrap();
        assert_eq!(res.name, "A");
        let claims = keys().verify(&res.token).expect("token verifies");
        assert_eq!(claims.sub, "a@x.com");
    }

    #[tokio::test]
    async fn signin_unknown_email_and_wrong_password_look_the_same() {
        let svc = service_with(Arc::new(InMemoryCredentialStore::new()));
        svc.signup(signup_req("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let unknown = svc.signin(signin_req("b@x.com", "secret1")).await.unwrap_err();
        let wrong = svc.signin(signin_req("a@x.com", "wrong")).await.unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn unknown_email_pays_the_hashing_cost() {
        let svc = service_with(Arc::new(InMemoryCredentialStore::new()));
        svc.signup(signup_req("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();

        let started = std::time::Instant::now();
        svc.signin(signin_req("a@x.com", "wrong")).await.unwrap_err();
        let known = started.elapsed();

        let started = std::time::Instant::now();
        svc.signin(signin_req("b@x.com", "wrong")).await.unwrap_err();
        let unknown = started.elapsed();

        assert!(
            unknown * 4 >= known,
            "unknown email answered in {unknown:?}, known in {known:?}"
        );
    }

    #[tokio::test]
    async fn signin_rejects_empty_fields() {
        let svc = service_with(Arc::new(InMemoryCredentialStore::new()));
        let err = svc.signin(signin_req("", "x")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
        let err = svc.signin(signin_req("a@x.com", "")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn malformed_stored_digest_is_invalid_credentials() {
        let store = Arc::new(InMemoryCredentialStore::new());
        store
            .create(NewUser {
                name: "A".into(),
                email: "a@x.com".into(),
                password_hash: "not-a-phc-string".into(),
            })
            .await
            .unwrap();
        let svc = service_with(store);

        let err = svc.signin(signin_req("a@x.com", "secret1")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    struct SlowStore;

    #[async_trait]
    impl CredentialStore for SlowStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn create(&self, _user: NewUser) -> Result<User, StoreError> {
            Err(StoreError::Storage(anyhow::anyhow!("unreachable")))
        }
    }

    #[tokio::test]
    async fn slow_store_is_cut_off_by_timeout() {
        let svc = AuthService::new(Arc::new(SlowStore), keys(), Duration::from_millis(20));
        let err = svc.signin(signin_req("a@x.com", "secret1")).await.unwrap_err();
        assert!(matches!(err, AuthError::Store(StoreError::Timeout)));
    }

    /// Lookup always misses, so the insert-time constraint is the only guard.
    struct RacyStore(InMemoryCredentialStore);

    #[async_trait]
    impl CredentialStore for RacyStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Ok(None)
        }

        async fn create(&self, user: NewUser) -> Result<User, StoreError> {
            self.0.create(user).await
        }
    }

    #[tokio::test]
    async fn store_level_duplicate_maps_to_duplicate_email() {
        let svc = service_with(Arc::new(RacyStore(InMemoryCredentialStore::new())));
        svc.signup(signup_req("a@x.com", "secret1", "secret1"))
            .await
            .unwrap();
        let err = svc
            .signup(signup_req("a@x.com", "secret1", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
    }
}
