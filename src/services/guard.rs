//! Referential-integrity guard for deletes.
//!
//! A record may only be deleted while nothing references it. Dependents are
//! checked in declaration order and the first non-zero count aborts the
//! delete, so callers always see the same relation named when several exist.
//! The checks and the delete share one write transaction, taken before the
//! first read. The `ON DELETE RESTRICT` foreign keys in the schema reject
//! anything written by other tools outside it.

use tracing::{info, warn};

use super::ServiceError;
use crate::db::{begin_write, DbPool};

/// A relation whose rows block deletion of the parent record
#[derive(Debug, Clone, Copy)]
pub struct Dependent {
    pub entity: &'static str,
    /// `SELECT COUNT(*) ...` bound to the parent id
    pub count_sql: &'static str,
}

/// How to delete one entity type safely
#[derive(Debug, Clone, Copy)]
pub struct DeletePolicy {
    pub entity: &'static str,
    pub exists_sql: &'static str,
    pub delete_sql: &'static str,
    pub dependents: &'static [Dependent],
}

pub const CLIENT: DeletePolicy = DeletePolicy {
    entity: "client",
    exists_sql: "SELECT COUNT(*) FROM clients WHERE id = ?",
    delete_sql: "DELETE FROM clients WHERE id = ?",
    dependents: &[
        Dependent {
            entity: "process",
            count_sql: "SELECT COUNT(*) FROM processes WHERE client_id = ?",
        },
        Dependent {
            entity: "appointment",
            count_sql: "SELECT COUNT(*) FROM appointments WHERE client_id = ?",
        },
    ],
};

pub const PROCESS: DeletePolicy = DeletePolicy {
    entity: "process",
    exists_sql: "SELECT COUNT(*) FROM processes WHERE id = ?",
    delete_sql: "DELETE FROM processes WHERE id = ?",
    dependents: &[Dependent {
        entity: "appointment",
        count_sql: "SELECT COUNT(*) FROM appointments WHERE process_id = ?",
    }],
};

pub const USER: DeletePolicy = DeletePolicy {
    entity: "user",
    exists_sql: "SELECT COUNT(*) FROM users WHERE id = ?",
    delete_sql: "DELETE FROM users WHERE id = ?",
    dependents: &[Dependent {
        entity: "appointment",
        count_sql: "SELECT COUNT(*) FROM appointments WHERE lawyer_id = ?",
    }],
};

pub const APPOINTMENT: DeletePolicy = DeletePolicy {
    entity: "appointment",
    exists_sql: "SELECT COUNT(*) FROM appointments WHERE id = ?",
    delete_sql: "DELETE FROM appointments WHERE id = ?",
    dependents: &[],
};

/// Delete `id` under `policy`, failing instead of cascading.
pub async fn guarded_delete(
    db: &DbPool,
    policy: &DeletePolicy,
    id: &str,
) -> Result<(), ServiceError> {
    let mut tx = begin_write(db).await?;

    let exists: i64 = sqlx::query_scalar(policy.exists_sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if exists == 0 {
        return Err(ServiceError::not_found(policy.entity, id));
    }

    for dependent in policy.dependents {
        let count: i64 = sqlx::query_scalar(dependent.count_sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            warn!(
                entity = policy.entity,
                id = %id,
                dependent = dependent.entity,
                count,
                "Delete blocked by dependent records"
            );
            return Err(ServiceError::DataIntegrityViolation {
                entity: policy.entity,
                dependent: dependent.entity,
                count,
            });
        }
    }

    sqlx::query(policy.delete_sql)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(entity = policy.entity, id = %id, "Record deleted");
    Ok(())
}
