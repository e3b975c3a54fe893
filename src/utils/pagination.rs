use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `page_index` / `page_size` query parameters as sent by clients.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number
    pub page_index: Option<u32>,
    /// Items per page, 1-100
    pub page_size: Option<u32>,
}

/// Normalized paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index: page_index.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page_index as u64 - 1) * self.page_size as u64
    }

    pub fn limit(&self) -> u64 {
        self.page_size as u64
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        let size = self.page_size as i64;
        (total.max(0) + size - 1) / size
    }

    /// Applies the window to an already ordered in-memory collection.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .cloned()
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl From<PageQuery> for PageRequest {
    fn from(q: PageQuery) -> Self {
        PageRequest::new(
            q.page_index.unwrap_or(1),
            q.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let p = PageRequest::from(PageQuery::default());
        assert_eq!(p, PageRequest { page_index: 1, page_size: 10 });

        let p = PageRequest::from(PageQuery { page_index: Some(0), page_size: Some(1000) });
        assert_eq!(p, PageRequest { page_index: 1, page_size: 100 });

        let p = PageRequest::new(3, 0);
        assert_eq!(p.page_size, 1);
    }

    #[test]
    fn offset_and_total_pages() {
        let p = PageRequest::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(20), 1);
        assert_eq!(p.total_pages(41), 3);
    }

    #[test]
    fn slice_windows_the_collection() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(PageRequest::new(2, 2).slice(&items), vec![3, 4]);
        assert_eq!(PageRequest::new(3, 2).slice(&items), vec![5]);
        assert!(PageRequest::new(4, 2).slice(&items).is_empty());
    }
}
