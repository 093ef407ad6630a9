//! User use cases. Each method forwards to the repository; business rules go here.

use super::CrudService;
use crate::error::AppError;
use crate::model::{User, UserPatch, WriteOutcome};
use crate::repository::Repository;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn Repository<User>>,
}

impl UserService {
    pub fn new(repository: Arc<dyn Repository<User>>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CrudService<User> for UserService {
    async fn all(&self) -> Result<Vec<User>, AppError> {
        self.repository.all().await
    }

    async fn load(&self, id: &str) -> Result<Option<User>, AppError> {
        self.repository.load(id).await
    }

    async fn create(&self, user: &User) -> Result<WriteOutcome, AppError> {
        self.repository.create(user).await
    }

    async fn update(&self, user: &User) -> Result<WriteOutcome, AppError> {
        self.repository.update(user).await
    }

    async fn patch(&self, patch: &UserPatch) -> Result<WriteOutcome, AppError> {
        self.repository.patch(patch).await
    }

    async fn delete(&self, id: &str) -> Result<WriteOutcome, AppError> {
        self.repository.delete(id).await
    }
}
