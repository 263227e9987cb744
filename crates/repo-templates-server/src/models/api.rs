//! Common API types and utilities
use repo_templates::PageRequest;
use serde::Deserialize;

use crate::error::{ApiError, Result};

/// Optional pagination parameters of the template listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl PageQuery {
    /// `None` when the full listing is requested
    pub fn page_request(&self) -> Result<Option<PageRequest>> {
        match (self.page, self.page_size) {
            (None, None) => Ok(None),
            (Some(page), Some(page_size)) => PageRequest::new(page, page_size)
                .map(Some)
                .ok_or_else(|| ApiError::bad_request("pageSize must be at least 1")),
            _ => Err(ApiError::bad_request(
                "page and pageSize must be given together",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<usize>, page_size: Option<usize>) -> PageQuery {
        PageQuery { page, page_size }
    }

    #[test]
    fn test_page_request_from_query() {
        assert_eq!(query(None, None).page_request().unwrap(), None);
        assert_eq!(
            query(Some(2), Some(10)).page_request().unwrap(),
            PageRequest::new(2, 10)
        );
        assert!(query(Some(0), Some(0)).page_request().is_err());
        assert!(query(Some(1), None).page_request().is_err());
        assert!(query(None, Some(5)).page_request().is_err());
    }
}
