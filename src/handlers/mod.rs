//! HTTP handlers: the generic resource handler and its axum entry points.

pub mod generic;

pub use generic::{GenericHandler, Params};
