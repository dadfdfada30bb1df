//! Pagination of query results.

use crate::error::{CoreError, CoreResult};

/// One page of query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Records on this page.
    pub records: Vec<T>,
    /// Total number of pages; `0` when pagination was not requested.
    pub pages: usize,
    /// Number of matches across all pages.
    pub total: usize,
}

/// Slices `results` into the requested 1-based page.
///
/// `page == 0 && rows == 0` returns everything with `pages == 0`. A page
/// past the end is clamped to the last page.
pub fn paginate<T>(mut results: Vec<T>, page: usize, rows: usize) -> CoreResult<Page<T>> {
    let total = results.len();

    if page == 0 && rows == 0 {
        return Ok(Page {
            records: results,
            pages: 0,
            total,
        });
    }
    if rows == 0 {
        return Err(CoreError::invalid_argument(
            "rows must be greater than zero when a page is requested",
        ));
    }
    if page == 0 {
        return Err(CoreError::invalid_argument("pages are numbered from 1"));
    }

    let pages = total.div_ceil(rows);
    if pages == 0 {
        return Ok(Page {
            records: Vec::new(),
            pages,
            total,
        });
    }

    let page = page.min(pages);
    let from = (page - 1) * rows;
    let to = (page * rows).min(total);
    results.truncate(to);
    let records = results.split_off(from);

    Ok(Page {
        records,
        pages,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpaginated() {
        let page = paginate(vec![1, 2, 3], 0, 0).unwrap();
        assert_eq!(page.records, vec![1, 2, 3]);
        assert_eq!(page.pages, 0);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn first_and_last_page() {
        let first = paginate(vec![1, 2, 3, 4, 5], 1, 2).unwrap();
        assert_eq!(first.records, vec![1, 2]);
        assert_eq!(first.pages, 3);

        let last = paginate(vec![1, 2, 3, 4, 5], 3, 2).unwrap();
        assert_eq!(last.records, vec![5]);
    }

    #[test]
    fn page_past_end_is_clamped() {
        let page = paginate(vec![1, 2, 3], 9, 2).unwrap();
        assert_eq!(page.records, vec![3]);
        assert_eq!(page.pages, 2);
    }

    #[test]
    fn empty_results() {
        let page = paginate(Vec::<u8>::new(), 1, 10).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.pages, 0);
    }

    #[test]
    fn zero_rows_is_rejected() {
        let err = paginate(vec![1], 1, 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn zero_page_with_rows_is_rejected() {
        let err = paginate(vec![1], 0, 5).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument { .. }));
    }
}
