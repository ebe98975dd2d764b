use serde::Serialize;

/// Page size used by every list endpoint.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// One page of a list response.
#[derive(Debug, Serialize, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    /// Number of pages available.
    pub pages: usize,
    /// Number of items across all pages.
    pub total: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total: usize, per_page: usize) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };
        let pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page)
        };

        Self {
            items,
            page: current_page,
            pages,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            pages: self.pages,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_round_up() {
        let page = Paginated::new(vec![1, 2], 2, 41, 20);
        assert_eq!(page.pages, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.total, 41);
    }

    #[test]
    fn page_zero_is_first_page() {
        let page: Paginated<u8> = Paginated::new(Vec::new(), 0, 0, 20);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, 0);
    }
}
