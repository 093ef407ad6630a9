//! Generic repository over PostgreSQL, driven by an entity descriptor.

use super::Repository;
use crate::error::AppError;
use crate::model::{to_object, EntityDescriptor, Model, WriteOutcome};
use crate::sql::{self, exec, QueryBuf};
use async_trait::async_trait;
use sqlx::PgPool;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct SqlRepository<M> {
    pool: PgPool,
    descriptor: Arc<EntityDescriptor>,
    _model: PhantomData<fn() -> M>,
}

impl<M> SqlRepository<M> {
    pub fn new(pool: PgPool, descriptor: Arc<EntityDescriptor>) -> Self {
        SqlRepository {
            pool,
            descriptor,
            _model: PhantomData,
        }
    }

    /// Execute a write; unique violations become `Conflict`, zero rows `NotFound`.
    async fn write(&self, q: &QueryBuf) -> Result<WriteOutcome, AppError> {
        match exec::execute(&self.pool, q).await {
            Ok(rows) => Ok(WriteOutcome::from_rows(rows)),
            Err(e) if exec::is_unique_violation(&e) => {
                tracing::debug!(table = %self.descriptor.table, error = %e, "unique violation");
                Ok(WriteOutcome::Conflict)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl<M: Model> Repository<M> for SqlRepository<M> {
    async fn all(&self) -> Result<Vec<M>, AppError> {
        let rows = exec::fetch_all(&self.pool, &sql::select_all(&self.descriptor)).await?;
        rows.iter()
            .map(|r| exec::decode_row(r, &self.descriptor))
            .collect()
    }

    async fn load(&self, id: &str) -> Result<Option<M>, AppError> {
        let row = exec::fetch_optional(&self.pool, &sql::select_by_key(&self.descriptor, id)).await?;
        row.map(|r| exec::decode_row(&r, &self.descriptor)).transpose()
    }

    async fn create(&self, model: &M) -> Result<WriteOutcome, AppError> {
        let values = to_object(model)?;
        self.write(&sql::insert(&self.descriptor, &values)).await
    }

    async fn update(&self, model: &M) -> Result<WriteOutcome, AppError> {
        let values = to_object(model)?;
        self.write(&sql::update(&self.descriptor, model.key(), &values)).await
    }

    async fn patch(&self, patch: &M::Patch) -> Result<WriteOutcome, AppError> {
        let key = M::patch_key(patch)
            .ok_or_else(|| AppError::BadRequest(format!("{} is required", self.descriptor.key().json)))?;
        let values = to_object(patch)?;
        self.write(&sql::patch(&self.descriptor, key, &values)).await
    }

    async fn delete(&self, id: &str) -> Result<WriteOutcome, AppError> {
        self.write(&sql::delete(&self.descriptor, id)).await
    }
}
