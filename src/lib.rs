pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod services;

pub use db::DbPool;

use config::Config;
use std::sync::Arc;

use crate::auth::password::CredentialHasher;
use crate::auth::token::TokenIssuer;
use crate::auth::{AuthService, CredentialVerifier};
use crate::services::{
    AppointmentService, ClientService, ProcessService, ServiceError, UserService,
};

pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub clients: ClientService,
    pub processes: ProcessService,
    pub users: UserService,
    pub appointments: AppointmentService,
}

impl AppState {
    /// Wire every service against one pool, hasher and token issuer
    pub fn new(
        config: Config,
        db: DbPool,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Result<Self, ServiceError> {
        let verifier = CredentialVerifier::new(db.clone(), hasher.clone())?;
        let auth = AuthService::new(db.clone(), verifier, tokens);

        let clients = ClientService::new(db.clone());
        let processes = ProcessService::new(db.clone(), clients.clone());
        let users = UserService::new(db.clone(), hasher);
        let appointments =
            AppointmentService::new(db, users.clone(), clients.clone(), processes.clone());

        Ok(Self {
            config,
            auth,
            clients,
            processes,
            users,
            appointments,
        })
    }
}
