//! Persistence: the repository contract and its PostgreSQL implementation.

mod postgres;

pub use postgres::SqlRepository;

use crate::error::AppError;
use crate::model::{Model, WriteOutcome};
use async_trait::async_trait;

/// CRUD against the backing store for one entity type.
#[async_trait]
pub trait Repository<M: Model>: Send + Sync {
    async fn all(&self) -> Result<Vec<M>, AppError>;
    async fn load(&self, id: &str) -> Result<Option<M>, AppError>;
    async fn create(&self, model: &M) -> Result<WriteOutcome, AppError>;
    async fn update(&self, model: &M) -> Result<WriteOutcome, AppError>;
    /// Write only the fields present in `patch`; its key selects the row.
    async fn patch(&self, patch: &M::Patch) -> Result<WriteOutcome, AppError>;
    async fn delete(&self, id: &str) -> Result<WriteOutcome, AppError>;
}
