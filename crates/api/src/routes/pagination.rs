//! `skip`/`limit` query parameters shared by list endpoints.

use serde::Deserialize;

use inventory_core::Page;

use crate::config::PaginationConfig;
use crate::error::AppError;

/// Query string window for list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    /// Resolve against configured defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if `limit` exceeds the configured maximum.
    pub fn resolve(self, config: PaginationConfig) -> Result<Page, AppError> {
        let limit = self.limit.unwrap_or(config.default_limit);
        if limit > config.max_limit {
            return Err(AppError::BadRequest(format!(
                "Limit cannot exceed {} items.",
                config.max_limit
            )));
        }
        Ok(Page::new(self.skip.unwrap_or(0), limit))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageQuery::default()
            .resolve(PaginationConfig::default())
            .unwrap();
        assert_eq!(page, Page::new(0, 100));
    }

    #[test]
    fn test_limit_at_maximum_is_accepted() {
        let query = PageQuery {
            skip: Some(20),
            limit: Some(500),
        };
        assert_eq!(
            query.resolve(PaginationConfig::default()).unwrap(),
            Page::new(20, 500)
        );
    }

    #[test]
    fn test_limit_over_maximum_is_rejected() {
        let query = PageQuery {
            skip: None,
            limit: Some(501),
        };
        let err = query.resolve(PaginationConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Limit cannot exceed 500 items.");
    }
}
