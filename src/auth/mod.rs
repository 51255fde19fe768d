//! Authentication: credential verification, token issuance and request identity.

pub mod password;
pub mod token;

use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{AuthResponse, DbPool, Role};
use crate::services::users::find_by_username;
use crate::services::ServiceError;
use password::{verify_password, CredentialHasher};
use token::{IssuedToken, TokenError, TokenIssuer};

/// Identity attached to a request once its token has been validated
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Checks a username/password pair against the credential store.
pub struct CredentialVerifier {
    db: DbPool,
    hasher: Arc<dyn CredentialHasher>,
    /// Verified against when the username is unknown so both failures cost the same
    decoy_hash: String,
}

impl CredentialVerifier {
    pub fn new(db: DbPool, hasher: Arc<dyn CredentialHasher>) -> Result<Self, ServiceError> {
        let decoy_hash = hasher.hash("decoy-password-never-matches")?;
        Ok(Self {
            db,
            hasher,
            decoy_hash,
        })
    }

    pub async fn verify(&self, username: &str, password: &str) -> Result<(), ServiceError> {
        let user = find_by_username(&self.db, username).await?;
        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.decoy_hash.clone(),
        };

        let matches = verify_password(self.hasher.clone(), password.to_string(), hash).await?;
        if user.is_some() && matches {
            Ok(())
        } else {
            Err(ServiceError::InvalidCredentials)
        }
    }
}

/// Result of a successful login: the public body plus the token for the cookie
#[derive(Debug)]
pub struct LoginOutcome {
    pub response: AuthResponse,
    pub token: IssuedToken,
}

pub struct AuthService {
    db: DbPool,
    verifier: CredentialVerifier,
    tokens: Arc<dyn TokenIssuer>,
}

impl AuthService {
    pub fn new(db: DbPool, verifier: CredentialVerifier, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self {
            db,
            verifier,
            tokens,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, ServiceError> {
        if let Err(e) = self.verifier.verify(username, password).await {
            if matches!(e, ServiceError::InvalidCredentials) {
                warn!(username = %username, "Failed login attempt");
            }
            return Err(e);
        }

        let user = find_by_username(&self.db, username)
            .await?
            .ok_or_else(|| {
                ServiceError::InconsistentState(format!(
                    "user {} verified but no longer present",
                    username
                ))
            })?;

        let token = self.tokens.issue(&user.username, user.role())?;
        info!(username = %user.username, expires_at = token.expires_at, "User logged in");

        Ok(LoginOutcome {
            response: AuthResponse::from(&user),
            token,
        })
    }

    /// Resolve a presented token to the identity it carries
    pub fn authenticate(&self, token: &str) -> Result<AuthUser, ServiceError> {
        let claims = self.tokens.validate(token).map_err(|e| match e {
            TokenError::Expired => ServiceError::Unauthenticated("token expired".to_string()),
            other => ServiceError::Unauthenticated(other.to_string()),
        })?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(ServiceError::Unauthenticated)?;

        Ok(AuthUser {
            username: claims.sub,
            role,
        })
    }

    /// Fresh profile for the token's subject. A deleted user no longer counts as logged in.
    pub async fn current_user(&self, user: &AuthUser) -> Result<AuthResponse, ServiceError> {
        find_by_username(&self.db, &user.username)
            .await?
            .map(|u| AuthResponse::from(&u))
            .ok_or_else(|| ServiceError::Unauthenticated("user no longer exists".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_pool, CreateUserRequest};
    use crate::services::UserService;
    use password::test_hasher;
    use token::JwtIssuer;

    async fn setup() -> (AuthService, UserService) {
        let db = memory_pool().await;
        let hasher = test_hasher();
        let users = UserService::new(db.clone(), hasher.clone());
        users
            .create(CreateUserRequest {
                username: "ana".to_string(),
                password: "password123".to_string(),
                full_name: "Ana Souza".to_string(),
                role: Some(Role::Admin),
            })
            .await
            .unwrap();

        let verifier = CredentialVerifier::new(db.clone(), hasher).unwrap();
        let tokens = Arc::new(JwtIssuer::new("test-secret", 86_400_000, 0).unwrap());
        (AuthService::new(db, verifier, tokens), users)
    }

    #[tokio::test]
    async fn test_login_issues_token_for_username() {
        let (auth, _) = setup().await;
        let outcome = auth.login("ana", "password123").await.unwrap();

        assert_eq!(outcome.response.username, "ana");
        assert_eq!(outcome.response.full_name, "Ana Souza");
        assert_eq!(outcome.response.role, Role::Admin);
        assert_eq!(outcome.token.expires_at - outcome.token.issued_at, 86_400);

        let user = auth.authenticate(&outcome.token.token).unwrap();
        assert_eq!(user.username, "ana");
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let (auth, _) = setup().await;
        let wrong = auth.login("ana", "nope").await.unwrap_err();
        let unknown = auth.login("ghost", "password123").await.unwrap_err();

        assert!(matches!(wrong, ServiceError::InvalidCredentials));
        assert!(matches!(unknown, ServiceError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage() {
        let (auth, _) = setup().await;
        assert!(matches!(
            auth.authenticate("not-a-token"),
            Err(ServiceError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn test_current_user_after_delete() {
        let (auth, users) = setup().await;
        let outcome = auth.login("ana", "password123").await.unwrap();
        let identity = auth.authenticate(&outcome.token.token).unwrap();

        let me = auth.current_user(&identity).await.unwrap();
        assert_eq!(me.user_id, outcome.response.user_id);

        users.delete(&me.user_id).await.unwrap();
        assert!(matches!(
            auth.current_user(&identity).await,
            Err(ServiceError::Unauthenticated(_))
        ));
    }
}
