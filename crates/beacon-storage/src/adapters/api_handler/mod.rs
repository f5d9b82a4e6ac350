//! # API Handler
//!
//! Glue between the HTTP layer and the storage facade.
//!
//! ## Modules
//!
//! - `handler`: BeaconApiHandler and response-message assembly
//! - `types`: ApiResponse, Credentials and the ErrorCode table

mod handler;
mod types;

pub use handler::{error_response, format_unix_date, BeaconApiHandler, UNIX_DATE_FORMAT};
pub use types::{error_code_for, ApiResponse, Credentials, ErrorCode};
