//! Domain services. Each owns a pool handle and enforces the rules for one entity.

pub mod appointments;
pub mod clients;
mod error;
pub mod guard;
pub mod processes;
pub mod users;

pub use appointments::AppointmentService;
pub use clients::ClientService;
pub use error::ServiceError;
pub use processes::ProcessService;
pub use users::UserService;
