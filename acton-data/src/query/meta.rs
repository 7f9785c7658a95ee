//! Pagination metadata and the paginated result envelope

use serde::{Deserialize, Serialize};

use crate::condition::Paging;

/// Pagination metadata for one page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Page size, or the total when no paging was requested
    pub items_per_page: u64,
    /// Rows matching the condition
    pub total_items: u64,
    /// Requested page
    pub current_page: u64,
    /// Number of pages
    pub total_pages: u64,
}

/// One page of records with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination<T> {
    /// Records on this page
    pub data: Vec<T>,
    /// Pagination metadata
    pub meta: Meta,
}

/// Compute pagination metadata from a total row count
///
/// With no rows, no paging or a zero limit there is a single page whose size
/// is the total. Otherwise the page is reported as requested and the page
/// count is `ceil(total / limit)`.
pub fn get_meta_pagination(total: u64, paging: Option<&Paging>) -> Meta {
    match paging {
        Some(paging) if total != 0 && paging.limit != 0 => Meta {
            items_per_page: paging.limit,
            total_items: total,
            current_page: paging.page,
            total_pages: total.div_ceil(paging.limit),
        },
        _ => Meta {
            items_per_page: total,
            total_items: total,
            current_page: 1,
            total_pages: 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_zero_total() {
        for paging in [None, Some(Paging::new(10, 2)), Some(Paging::default())] {
            assert_eq!(
                get_meta_pagination(0, paging.as_ref()),
                Meta {
                    items_per_page: 0,
                    total_items: 0,
                    current_page: 1,
                    total_pages: 1
                }
            );
        }
    }

    #[test]
    fn test_meta_second_page() {
        assert_eq!(
            get_meta_pagination(25, Some(&Paging::new(10, 2))),
            Meta {
                items_per_page: 10,
                total_items: 25,
                current_page: 2,
                total_pages: 3
            }
        );
    }

    #[test]
    fn test_meta_without_paging_reports_total() {
        let meta = get_meta_pagination(7, None);
        assert_eq!(meta.items_per_page, 7);
        assert_eq!(meta.total_pages, 1);

        let meta = get_meta_pagination(7, Some(&Paging::new(0, 3)));
        assert_eq!(meta.current_page, 1);
    }

    #[test]
    fn test_meta_exact_multiple() {
        assert_eq!(
            get_meta_pagination(30, Some(&Paging::new(10, 1))).total_pages,
            3
        );
    }

    #[test]
    fn test_meta_serializes_snake_case() {
        let json = serde_json::to_value(get_meta_pagination(25, Some(&Paging::new(10, 2)))).unwrap();
        assert_eq!(json["items_per_page"], 10);
        assert_eq!(json["total_items"], 25);
        assert_eq!(json["current_page"], 2);
        assert_eq!(json["total_pages"], 3);
    }
}
