// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between the CLI and Services
// - Commands accept DTOs, return DTOs
// - Commands handle error conversion to ErrorResponse
// - Commands NEVER contain business logic

pub mod generate_commands;
pub mod list_commands;
pub mod mechanics_commands;

pub use generate_commands::*;
pub use list_commands::*;
pub use mechanics_commands::*;
