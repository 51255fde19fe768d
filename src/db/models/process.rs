//! Legal process (court case) models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: String,
    /// Case number as registered with the court
    pub number: String,
    pub client_id: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub number: String,
    pub client_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
}
