// Library root
// -----------
// The binary (`main.rs`) only wires these modules together.
//
// Module responsibilities:
// - `api`: blocking HTTP calls to the GitHub REST API and the records
//   they decode into.
// - `config`: where the client points and how long a fork may take.
// - `session`: the in-memory token for the current process.
// - `commands`: the command registry and every built-in handler.
// - `ui`: the prompt loop that reads lines and dispatches them.
// - `error`: the error type the other modules report.
pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod session;
pub mod ui;

pub use error::{CliError, Result};
