//! Maskwise Core — entity types, errors, configuration.

pub mod config;
pub mod entity;
pub mod error;

pub use config::ServiceConfig;
pub use entity::EntityType;
pub use error::{Error, Result};
