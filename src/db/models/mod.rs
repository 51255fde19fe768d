//! Database models split into domain-specific modules.

pub mod appointment;
pub mod client;
pub mod process;
pub mod user;

pub use appointment::*;
pub use client::*;
pub use process::*;
pub use user::*;
