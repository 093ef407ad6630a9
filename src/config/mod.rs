pub mod loader;
pub mod status;
pub mod types;

pub use loader::*;
pub use status::StatusTable;
pub use types::*;
