//! Entity model: the `Model` trait, descriptors, write outcomes, and the User entity.

mod descriptor;
mod outcome;
mod patch;
mod user;

pub use descriptor::{EntityDescriptor, FieldDescriptor, Format, SqlType, ValidationRule};
pub use outcome::{OutcomeKind, WriteOutcome};
pub use patch::Field;
pub use user::{User, UserFilter, UserPatch};

use crate::error::{AppError, ConfigError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// An entity served by the generic handler. JSON field names must match the descriptor's `json` names.
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Sparse representation used by PATCH; serializes to the present fields only.
    type Patch: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn descriptor() -> Result<EntityDescriptor, ConfigError>;

    fn key(&self) -> &str;

    fn set_key(&mut self, key: String);

    /// Key carried by a patch payload, if the client sent a non-empty one.
    fn patch_key(patch: &Self::Patch) -> Option<&str>;

    fn set_patch_key(patch: &mut Self::Patch, key: String);
}

/// Serialize a model or patch into a JSON object keyed by JSON field names.
pub fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(m) => Ok(m),
        other => Err(AppError::BadRequest(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
