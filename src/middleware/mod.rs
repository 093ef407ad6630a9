//! Request middleware: request logger, JSON error bodies and panic recovery.

mod error_body;
mod logger;
mod recover;

pub use error_body::json_error_body;
pub use logger::{log_request, LogFields, RequestLogger};
pub use recover::panic_response;
