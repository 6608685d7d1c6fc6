//! Paginated list responses

use serde::{Deserialize, Serialize};

/// Default page size for admin lists
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Upper bound on page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page/limit query parameters (1-based page)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// SQL OFFSET for the requested page
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.per_page())
    }

    /// SQL LIMIT for the requested page
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, params: PageParams) -> Self {
        let per_page = params.per_page();
        let total_pages = total.div_ceil(u64::from(per_page)).max(1) as u32;
        Self {
            data,
            total,
            page: params.page(),
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults_and_clamp() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);

        let params = PageParams {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset() {
        let params = PageParams {
            page: Some(3),
            per_page: Some(25),
        };
        assert_eq!(params.offset(), 50);
        assert_eq!(params.limit(), 25);
    }

    #[test]
    fn test_total_pages() {
        let params = PageParams {
            page: Some(2),
            per_page: Some(10),
        };
        let resp = PaginatedResponse::new(vec![1, 2, 3], 101, params);
        assert_eq!(resp.total_pages, 11);
        assert_eq!(resp.page, 2);

        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], 0, params);
        assert_eq!(empty.total_pages, 1);
    }
}
