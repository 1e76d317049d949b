// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - This layer sits ABOVE the services
// - It provides the boundary between the CLI and the Services
// - It translates between DTOs and service requests
// - It owns the process-wide wiring (AppState)

pub mod commands;
pub mod dto;
pub mod error_handling;
pub mod state;

#[cfg(test)]
mod test_support;

pub use commands::*;
pub use dto::*;
pub use error_handling::{ErrorResponse, ErrorType, ToErrorResponse};
pub use state::AppState;
