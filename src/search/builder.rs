//! SQL-backed search bound to one table and descriptor.

use super::{PageRequest, SearchFilter, SearchResult, Searcher};
use crate::config::SearchConfig;
use crate::error::AppError;
use crate::model::{EntityDescriptor, Model};
use crate::sql::{self, exec};
use async_trait::async_trait;
use sqlx::PgPool;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct SearchBuilder<M> {
    pool: PgPool,
    descriptor: Arc<EntityDescriptor>,
    config: SearchConfig,
    _model: PhantomData<fn() -> M>,
}

impl<M> SearchBuilder<M> {
    pub fn new(pool: PgPool, descriptor: Arc<EntityDescriptor>, config: SearchConfig) -> Self {
        SearchBuilder {
            pool,
            descriptor,
            config,
            _model: PhantomData,
        }
    }
}

#[async_trait]
impl<M: Model, F: SearchFilter> Searcher<M, F> for SearchBuilder<M> {
    /// Runs the count query, then the page query with the same criteria.
    async fn search(&self, filter: &F) -> Result<SearchResult<M>, AppError> {
        let paging = filter.paging();
        let page = PageRequest::new(&paging, &self.config);
        let order = sql::order_clause(&self.descriptor, paging.sort.as_deref())?;
        let criteria = filter.criteria();

        let total = exec::fetch_count(&self.pool, &sql::count(&self.descriptor, &criteria)).await?;
        let q = sql::select_page(&self.descriptor, &criteria, &order, page.limit, page.offset());
        let rows = exec::fetch_all(&self.pool, &q).await?;
        let items = rows
            .iter()
            .map(|r| exec::decode_row(r, &self.descriptor))
            .collect::<Result<Vec<M>, _>>()?;
        let next_page = page.next_page(items.len(), total);
        Ok(SearchResult {
            items,
            total,
            next_page,
        })
    }
}
