//! Legal processes (court cases) owned by clients.

use tracing::{info, warn};
use uuid::Uuid;

use super::clients::ClientService;
use super::guard::{self, guarded_delete};
use super::ServiceError;
use crate::db::{begin_write, DbPool, Process, ProcessRequest};

#[derive(Clone)]
pub struct ProcessService {
    db: DbPool,
    clients: ClientService,
}

impl ProcessService {
    pub fn new(db: DbPool, clients: ClientService) -> Self {
        Self { db, clients }
    }

    pub async fn list(&self) -> Result<Vec<Process>, ServiceError> {
        let processes =
            sqlx::query_as::<_, Process>("SELECT * FROM processes ORDER BY created_at, number")
                .fetch_all(&self.db)
                .await?;
        Ok(processes)
    }

    pub async fn get(&self, id: &str) -> Result<Process, ServiceError> {
        sqlx::query_as::<_, Process>("SELECT * FROM processes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("process", id))
    }

    pub async fn create(&self, req: ProcessRequest) -> Result<Process, ServiceError> {
        self.ensure_client(&req.client_id).await?;

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO processes (id, number, client_id, description, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&req.number)
        .bind(&req.client_id)
        .bind(&req.description)
        .bind(&req.status)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(process_id = %id, client_id = %req.client_id, "Process created");
        self.get(&id).await
    }

    /// Moving a process to another client is refused while appointments of
    /// the current client reference it.
    pub async fn update(&self, id: &str, req: ProcessRequest) -> Result<Process, ServiceError> {
        // Report the missing process before a missing client
        self.get(id).await?;
        self.ensure_client(&req.client_id).await?;

        let mut tx = begin_write(&self.db).await?;

        let mismatched: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments WHERE process_id = ? AND client_id != ?",
        )
        .bind(id)
        .bind(&req.client_id)
        .fetch_one(&mut *tx)
        .await?;
        if mismatched > 0 {
            warn!(
                process_id = %id,
                client_id = %req.client_id,
                appointments = mismatched,
                "Process client change blocked by appointments"
            );
            return Err(ServiceError::validation(
                "clientId",
                format!(
                    "Cannot move this process to another client: {} appointment(s) still reference it",
                    mismatched
                ),
            ));
        }

        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE processes SET
                number = ?,
                client_id = ?,
                description = ?,
                status = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.number)
        .bind(&req.client_id)
        .bind(&req.description)
        .bind(&req.status)
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(process_id = %id, "Process updated");
        self.get(id).await
    }

    /// Refused while any appointment references the process
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        guarded_delete(&self.db, &guard::PROCESS, id).await
    }

    async fn ensure_client(&self, client_id: &str) -> Result<(), ServiceError> {
        if self.clients.exists(client_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("client", client_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_pool, ClientRequest};

    async fn setup() -> (ProcessService, String) {
        let db = memory_pool().await;
        let clients = ClientService::new(db.clone());
        let client = clients
            .create(ClientRequest {
                name: "ACME Ltda".to_string(),
                cpf_cnpj: "11222333000181".to_string(),
                email: None,
                phone: None,
            })
            .await
            .unwrap();
        (ProcessService::new(db, clients), client.id)
    }

    fn request(number: &str, client_id: &str) -> ProcessRequest {
        ProcessRequest {
            number: number.to_string(),
            client_id: client_id.to_string(),
            description: Some("Labour claim".to_string()),
            status: "OPEN".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_echoes_fields() {
        let (service, client_id) = setup().await;
        let created = service
            .create(request("0001234-56.2024.8.26.0100", &client_id))
            .await
            .unwrap();
        let fetched = service.get(&created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.number, "0001234-56.2024.8.26.0100");
        assert_eq!(fetched.client_id, client_id);
        assert_eq!(fetched.description.as_deref(), Some("Labour claim"));
        assert_eq!(fetched.status, "OPEN");
    }

    #[tokio::test]
    async fn test_create_requires_existing_client() {
        let (service, _) = setup().await;
        let err = service.create(request("0001", "missing")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "client", .. }));
    }

    #[tokio::test]
    async fn test_update_overwrites_and_keeps_id() {
        let (service, client_id) = setup().await;
        let created = service.create(request("0001", &client_id)).await.unwrap();

        let mut req = request("0001", &client_id);
        req.status = "CLOSED".to_string();
        req.description = None;
        let updated = service.update(&created.id, req).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.status, "CLOSED");
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn test_update_unknown_process() {
        let (service, client_id) = setup().await;
        let err = service
            .update("missing", request("0001", &client_id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "process", .. }));
    }

    #[tokio::test]
    async fn test_delete_then_not_found() {
        let (service, client_id) = setup().await;
        let created = service.create(request("0001", &client_id)).await.unwrap();

        service.delete(&created.id).await.unwrap();
        assert!(matches!(
            service.get(&created.id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete(&created.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }
}
