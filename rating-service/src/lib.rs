//! # Rating Service
//! HTTP front of the forum voting core. Wires configuration, the PostgreSQL
//! repository and the vote engine together and exposes them as JSON routes.
pub mod config;
pub mod errors;
pub mod server;

pub use config::{Config, Dependencies, LogFormat};
pub use errors::ServiceError;
