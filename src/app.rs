//! Application wiring: pool, migration, repository, service, search, handlers.

use crate::config::AppConfig;
use crate::error::{AppError, ConfigError};
use crate::handlers::{GenericHandler, Params};
use crate::health::{HealthChecker, HealthHandler, SqlHealthChecker};
use crate::migration::auto_migrate;
use crate::model::{EntityDescriptor, Model, User, UserFilter};
use crate::repository::{Repository, SqlRepository};
use crate::search::{SearchBuilder, Searcher};
use crate::service::{CrudService, UserService, Validator};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

/// Resource name used for status overrides (`resources.user`) and audit lines.
pub const USER_RESOURCE: &str = "user";

pub struct ApplicationContext {
    pub health: Arc<HealthHandler>,
    pub user: Arc<GenericHandler<User, UserFilter>>,
}

impl ApplicationContext {
    /// Connects, migrates, and builds every component. Any failure aborts startup.
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.sql.max_connections)
            .connect(&config.sql.data_source_name)
            .await?;
        let descriptor = Arc::new(User::descriptor()?);
        auto_migrate(&pool, &descriptor).await?;

        let repository: Arc<dyn Repository<User>> = Arc::new(SqlRepository::new(pool.clone(), descriptor.clone()));
        let searcher: Arc<dyn Searcher<User, UserFilter>> =
            Arc::new(SearchBuilder::new(pool.clone(), descriptor.clone(), config.search.clone()));
        let checkers: Vec<Arc<dyn HealthChecker>> = vec![Arc::new(SqlHealthChecker::new(
            pool,
            Duration::from_secs(config.sql.health_timeout_secs),
        ))];

        let context = Self::from_parts(
            config,
            descriptor,
            Arc::new(UserService::new(repository)),
            searcher,
            checkers,
        )?;
        tracing::info!(resource = USER_RESOURCE, "application context ready");
        Ok(context)
    }

    /// Builds handlers over already-constructed components.
    pub fn from_parts(
        config: &AppConfig,
        descriptor: Arc<EntityDescriptor>,
        service: Arc<dyn CrudService<User>>,
        searcher: Arc<dyn Searcher<User, UserFilter>>,
        checkers: Vec<Arc<dyn HealthChecker>>,
    ) -> Result<Self, ConfigError> {
        let params = Params::new(USER_RESOURCE, config, Validator::new(descriptor))?;
        Ok(ApplicationContext {
            health: Arc::new(HealthHandler::new(checkers)),
            user: Arc::new(GenericHandler::new(service, searcher, params)),
        })
    }
}
