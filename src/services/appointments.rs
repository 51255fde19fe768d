//! Appointments between a lawyer and a client, optionally about a process.

use chrono::NaiveDateTime;
use tracing::info;
use uuid::Uuid;

use super::clients::ClientService;
use super::guard::{self, guarded_delete};
use super::processes::ProcessService;
use super::users::UserService;
use super::ServiceError;
use crate::db::{Appointment, AppointmentRequest, DbPool, MIN_DURATION_MINUTES};

#[derive(Clone)]
pub struct AppointmentService {
    db: DbPool,
    users: UserService,
    clients: ClientService,
    processes: ProcessService,
}

impl AppointmentService {
    pub fn new(
        db: DbPool,
        users: UserService,
        clients: ClientService,
        processes: ProcessService,
    ) -> Self {
        Self {
            db,
            users,
            clients,
            processes,
        }
    }

    pub async fn list(&self) -> Result<Vec<Appointment>, ServiceError> {
        let appointments =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments ORDER BY date_time")
                .fetch_all(&self.db)
                .await?;
        Ok(appointments)
    }

    /// A lawyer's agenda, earliest first
    pub async fn list_by_lawyer(&self, lawyer_id: &str) -> Result<Vec<Appointment>, ServiceError> {
        if !self.users.exists(lawyer_id).await? {
            return Err(ServiceError::not_found("user", lawyer_id));
        }

        let appointments = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE lawyer_id = ? ORDER BY date_time",
        )
        .bind(lawyer_id)
        .fetch_all(&self.db)
        .await?;
        Ok(appointments)
    }

    pub async fn get(&self, id: &str) -> Result<Appointment, ServiceError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("appointment", id))
    }

    pub async fn create(&self, req: AppointmentRequest) -> Result<Appointment, ServiceError> {
        let date_time = self.check(&req).await?;

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO appointments (
                id, date_time, duration_minutes, lawyer_id, client_id, process_id,
                description, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&date_time)
        .bind(req.duration_minutes)
        .bind(&req.lawyer_id)
        .bind(&req.client_id)
        .bind(&req.process_id)
        .bind(&req.description)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(
            appointment_id = %id,
            lawyer_id = %req.lawyer_id,
            date_time = %date_time,
            "Appointment created"
        );
        self.get(&id).await
    }

    pub async fn update(
        &self,
        id: &str,
        req: AppointmentRequest,
    ) -> Result<Appointment, ServiceError> {
        self.get(id).await?;
        let date_time = self.check(&req).await?;

        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE appointments SET
                date_time = ?,
                duration_minutes = ?,
                lawyer_id = ?,
                client_id = ?,
                process_id = ?,
                description = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&date_time)
        .bind(req.duration_minutes)
        .bind(&req.lawyer_id)
        .bind(&req.client_id)
        .bind(&req.process_id)
        .bind(&req.description)
        .bind(&now)
        .bind(id)
        .execute(&self.db)
        .await?;

        info!(appointment_id = %id, "Appointment updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        guarded_delete(&self.db, &guard::APPOINTMENT, id).await
    }

    /// Field rules plus existence of every referenced record. Returns the
    /// date-time in its stored form.
    async fn check(&self, req: &AppointmentRequest) -> Result<String, ServiceError> {
        let date_time = parse_date_time(&req.date_time).ok_or_else(|| {
            ServiceError::validation(
                "dateTime",
                "Date and time must be an ISO 8601 local date-time, e.g. 2024-05-02T14:30:00",
            )
        })?;
        if req.duration_minutes < MIN_DURATION_MINUTES {
            return Err(ServiceError::validation(
                "durationMinutes",
                format!("Duration must be at least {} minutes", MIN_DURATION_MINUTES),
            ));
        }

        if !self.users.exists(&req.lawyer_id).await? {
            return Err(ServiceError::not_found("user", &req.lawyer_id));
        }
        if !self.clients.exists(&req.client_id).await? {
            return Err(ServiceError::not_found("client", &req.client_id));
        }
        if let Some(process_id) = &req.process_id {
            let process = self.processes.get(process_id).await?;
            if process.client_id != req.client_id {
                return Err(ServiceError::validation(
                    "processId",
                    "Process does not belong to the given client",
                ));
            }
        }
        Ok(date_time.format(STORED_DATE_TIME).to_string())
    }
}

/// Stored form of `date_time`; lexical order is chronological order
const STORED_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S";

/// Local date-time with or without seconds. Offsets are refused: the office
/// agenda has no time zone.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
}

pub fn is_valid_date_time(value: &str) -> bool {
    parse_date_time(value).is_some()
}
