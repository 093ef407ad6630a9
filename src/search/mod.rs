//! Generic search: filter criteria, paging, and the SQL-backed search builder.

mod builder;

pub use builder::SearchBuilder;

use crate::config::SearchConfig;
use crate::error::AppError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// One predicate. Field names are JSON names resolved through the entity descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum Criterion {
    Eq(&'static str, Value),
    /// Case-insensitive prefix match on a text column.
    Prefix(&'static str, String),
    Gte(&'static str, Value),
    Lte(&'static str, Value),
    /// Case-insensitive substring match across every searchable column.
    Keyword(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paging {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    /// Comma-separated JSON field names, `-` prefix for descending.
    pub sort: Option<String>,
}

/// A filter shape decoded from query parameters or a JSON body.
pub trait SearchFilter: DeserializeOwned + Default + Send + Sync + 'static {
    fn paging(&self) -> Paging;
    fn criteria(&self) -> Vec<Criterion>;
}

/// Resolved page window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    /// 1-based.
    pub page: u32,
}

impl PageRequest {
    /// A missing or zero limit uses the default page size; limits above the maximum are clamped.
    pub fn new(paging: &Paging, config: &SearchConfig) -> Self {
        let limit = match paging.limit {
            None | Some(0) => config.default_page_size,
            Some(n) => n.min(config.max_page_size),
        };
        PageRequest {
            limit: limit.max(1),
            page: paging.page.unwrap_or(1).max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Token of the following page when records remain past this one.
    pub fn next_page(&self, returned: usize, total: u64) -> Option<String> {
        let seen = self.offset() + returned as u64;
        if returned > 0 && seen < total {
            Some((self.page + 1).to_string())
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<M> {
    pub items: Vec<M>,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
}

#[async_trait]
pub trait Searcher<M, F>: Send + Sync {
    async fn search(&self, filter: &F) -> Result<SearchResult<M>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SearchConfig {
        SearchConfig {
            default_page_size: 10,
            max_page_size: 100,
        }
    }

    #[test]
    fn zero_limit_uses_default_page_size() {
        let p = PageRequest::new(
            &Paging {
                limit: Some(0),
                ..Default::default()
            },
            &config(),
        );
        assert_eq!(p, PageRequest { limit: 10, page: 1 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn limit_is_clamped_and_page_floored() {
        let p = PageRequest::new(
            &Paging {
                limit: Some(5000),
                page: Some(0),
                sort: None,
            },
            &config(),
        );
        assert_eq!(p, PageRequest { limit: 100, page: 1 });
    }

    #[test]
    fn next_page_reflects_remaining_records() {
        let first = PageRequest { limit: 10, page: 1 };
        assert_eq!(first.next_page(10, 25), Some("2".into()));
        let second = PageRequest { limit: 10, page: 2 };
        assert_eq!(second.offset(), 10);
        assert_eq!(second.next_page(10, 25), Some("3".into()));
        let last = PageRequest { limit: 10, page: 3 };
        assert_eq!(last.next_page(5, 25), None);
    }

    #[test]
    fn no_next_page_past_the_end() {
        let p = PageRequest { limit: 10, page: 9 };
        assert_eq!(p.next_page(0, 25), None);
    }
}
