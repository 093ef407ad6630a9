//! Service layer: one method per use case, plus request validation.

mod user;
mod validation;
pub use user::UserService;
pub use validation::Validator;

use crate::error::AppError;
use crate::model::{Model, WriteOutcome};
use async_trait::async_trait;

/// Use cases the generic handler drives. Results are returned to the handler uninterpreted.
#[async_trait]
pub trait CrudService<M: Model>: Send + Sync {
    async fn all(&self) -> Result<Vec<M>, AppError>;
    async fn load(&self, id: &str) -> Result<Option<M>, AppError>;
    async fn create(&self, model: &M) -> Result<WriteOutcome, AppError>;
    async fn update(&self, model: &M) -> Result<WriteOutcome, AppError>;
    async fn patch(&self, patch: &M::Patch) -> Result<WriteOutcome, AppError>;
    async fn delete(&self, id: &str) -> Result<WriteOutcome, AppError>;
}
