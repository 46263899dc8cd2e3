//! Maskwise HTTP service.
//!
//! Wires a detector and a generator around the substitution engine:
//! every request gets its own anonymization and mapping, the generator only
//! sees placeholders, and its reply is restored before it is returned.

pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
