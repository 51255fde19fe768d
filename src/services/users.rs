//! Office users. Passwords are hashed before they reach the database.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::guard::{self, guarded_delete};
use super::ServiceError;
use crate::auth::password::{hash_password, CredentialHasher};
use crate::db::{CreateUserRequest, DbPool, Role, UpdateUserRequest, User, UserResponse};

#[derive(Clone)]
pub struct UserService {
    db: DbPool,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserService {
    pub fn new(db: DbPool, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { db, hasher }
    }

    pub async fn list(&self) -> Result<Vec<UserResponse>, ServiceError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at, username")
            .fetch_all(&self.db)
            .await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<UserResponse, ServiceError> {
        self.find(id).await.map(UserResponse::from)
    }

    pub async fn create(&self, req: CreateUserRequest) -> Result<UserResponse, ServiceError> {
        if req.password.is_empty() {
            return Err(ServiceError::validation("password", "Password is required"));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let role = req.role.unwrap_or_default();
        let password_hash = hash_password(self.hasher.clone(), req.password).await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, full_name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&req.username)
        .bind(&password_hash)
        .bind(&req.full_name)
        .bind(role.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(user_id = %id, username = %req.username, role = %role, "User created");
        self.get(&id).await
    }

    /// Overwrites username and full name. The stored hash changes only when a
    /// non-empty password is supplied, and the role only when one is given.
    pub async fn update(
        &self,
        id: &str,
        req: UpdateUserRequest,
    ) -> Result<UserResponse, ServiceError> {
        let existing = self.find(id).await?;

        let role = req.role.unwrap_or_else(|| existing.role());
        let password_hash = match req.password.filter(|p| !p.is_empty()) {
            Some(password) => hash_password(self.hasher.clone(), password).await?,
            None => existing.password_hash,
        };
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE users SET
                username = ?,
                full_name = ?,
                password_hash = ?,
                role = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.username)
        .bind(&req.full_name)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(&now)
        .bind(id)
        .execute(&self.db)
        .await?;

        info!(user_id = %id, "User updated");
        self.get(id).await
    }

    /// Refused while the user is the lawyer on any appointment
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        guarded_delete(&self.db, &guard::USER, id).await
    }

    pub async fn exists(&self, id: &str) -> Result<bool, ServiceError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn count(&self) -> Result<i64, ServiceError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    async fn find(&self, id: &str) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }
}

/// Credential-store lookup shared by the login flow
pub async fn find_by_username(db: &DbPool, username: &str) -> Result<Option<User>, ServiceError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

/// Create the administrator account on an empty database.
pub async fn ensure_admin_user(
    users: &UserService,
    username: &str,
    password: &str,
) -> Result<(), ServiceError> {
    if users.count().await? > 0 {
        return Ok(());
    }

    users
        .create(CreateUserRequest {
            username: username.to_string(),
            password: password.to_string(),
            full_name: "Administrator".to_string(),
            role: Some(Role::Admin),
        })
        .await?;

    info!(username = %username, "Created initial administrator");
    Ok(())
}
