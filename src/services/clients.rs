//! Client records.

use tracing::info;
use uuid::Uuid;

use super::guard::{self, guarded_delete};
use super::ServiceError;
use crate::db::{Client, ClientRequest, DbPool};

#[derive(Clone)]
pub struct ClientService {
    db: DbPool,
}

impl ClientService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Client>, ServiceError> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at, name")
            .fetch_all(&self.db)
            .await?;
        Ok(clients)
    }

    pub async fn get(&self, id: &str) -> Result<Client, ServiceError> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("client", id))
    }

    pub async fn create(&self, req: ClientRequest) -> Result<Client, ServiceError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO clients (id, name, cpf_cnpj, email, phone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.cpf_cnpj)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(client_id = %id, "Client created");
        self.get(&id).await
    }

    pub async fn update(&self, id: &str, req: ClientRequest) -> Result<Client, ServiceError> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE clients SET
                name = ?,
                cpf_cnpj = ?,
                email = ?,
                phone = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(&req.cpf_cnpj)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&now)
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("client", id));
        }

        info!(client_id = %id, "Client updated");
        self.get(id).await
    }

    /// Refused while any process or appointment references the client
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        guarded_delete(&self.db, &guard::CLIENT, id).await
    }

    pub async fn exists(&self, id: &str) -> Result<bool, ServiceError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE id = ?")
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    fn request(name: &str, cpf_cnpj: &str) -> ClientRequest {
        ClientRequest {
            name: name.to_string(),
            cpf_cnpj: cpf_cnpj.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_echoes_fields() {
        let service = ClientService::new(memory_pool().await);
        let created = service.create(request("Maria", "12345678909")).await.unwrap();
        let fetched = service.get(&created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Maria");
        assert_eq!(fetched.cpf_cnpj, "12345678909");
        assert_eq!(fetched.email.as_deref(), Some("maria@example.com"));
        assert_eq!(fetched.phone, None);
        assert!(Uuid::parse_str(&fetched.id).is_ok());
    }

    #[tokio::test]
    async fn test_update_overwrites_fields_and_keeps_id() {
        let service = ClientService::new(memory_pool().await);
        let created = service.create(request("Maria", "12345678909")).await.unwrap();

        let updated = service
            .update(
                &created.id,
                ClientRequest {
                    name: "Maria Silva".to_string(),
                    cpf_cnpj: "12345678909".to_string(),
                    email: None,
                    phone: Some("+55 11 99999-0000".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Maria Silva");
        assert_eq!(updated.email, None);
        assert_eq!(updated.phone.as_deref(), Some("+55 11 99999-0000"));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let service = ClientService::new(memory_pool().await);
        let id = Uuid::new_v4().to_string();

        assert!(matches!(service.get(&id).await, Err(ServiceError::NotFound { .. })));
        assert!(matches!(
            service.update(&id, request("X", "12345678909")).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(service.delete(&id).await, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_tax_id_rejected() {
        let service = ClientService::new(memory_pool().await);
        service.create(request("Maria", "12345678909")).await.unwrap();
        let err = service.create(request("Joana", "12345678909")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Database(_)));
    }

    #[tokio::test]
    async fn test_delete_without_dependents() {
        let service = ClientService::new(memory_pool().await);
        let created = service.create(request("Maria", "12345678909")).await.unwrap();

        service.delete(&created.id).await.unwrap();
        assert!(matches!(
            service.get(&created.id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(service.list().await.unwrap().is_empty());
    }
}
