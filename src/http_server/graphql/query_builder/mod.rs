use async_graphql::InputObject;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{ColumnTrait, DatabaseBackend, QueryFilter, QuerySelect};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

// ============================================================================
// GraphQL Input Types
// ============================================================================

#[derive(InputObject, Clone, Debug, Default)]
pub struct PaginationInput {
    pub page: Option<i32>,
    pub page_size: Option<i32>,
}

// ============================================================================
// Page math
// ============================================================================

/// A normalized page request: `page >= 1`, `1 <= page_size <= MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page: Option<i32>, page_size: Option<i32>) -> Self {
        let page = page.unwrap_or(1).max(1) as u64;
        let page_size = page_size
            .map(|size| size.max(1) as u64)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);

        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    pub fn total_pages(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.page_size)
    }
}

impl From<Option<PaginationInput>> for PageRequest {
    fn from(input: Option<PaginationInput>) -> Self {
        let input = input.unwrap_or_default();
        Self::new(input.page, input.page_size)
    }
}

/// One page of results plus the metadata every paginated envelope carries.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_page: u64,
    pub current_page: u64,
    /// Rows actually returned for this page
    pub current_count: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Self {
            current_count: items.len() as u64,
            items,
            total_count,
            total_page: request.total_pages(total_count),
            current_page: request.page,
            page_size: request.page_size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            total_page: self.total_page,
            current_page: self.current_page,
            current_count: self.current_count,
            page_size: self.page_size,
        }
    }
}

// ============================================================================
// Query helpers
// ============================================================================

/// Apply offset/limit for the requested page. Pages past the end simply return no rows.
pub fn apply_pagination<Q: QuerySelect>(query: Q, request: PageRequest) -> Q {
    query.limit(request.page_size).offset(request.offset())
}

/// Case-insensitive substring matching strategy of the connected store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDialect {
    /// `LIKE`, case-insensitive for ASCII on SQLite and MySQL/MariaDB
    Like,
    /// Postgres `ILIKE`
    ILike,
}

impl SearchDialect {
    pub fn for_backend(backend: DatabaseBackend) -> Self {
        match backend {
            DatabaseBackend::Postgres => SearchDialect::ILike,
            _ => SearchDialect::Like,
        }
    }
}

/// Apply case-insensitive substring search to a single column.
pub fn apply_text_search<Q, C>(query: Q, column: C, search_term: &str, dialect: SearchDialect) -> Q
where
    Q: QueryFilter,
    C: ColumnTrait,
{
    if search_term.is_empty() {
        return query;
    }

    let pattern = format!("%{}%", search_term);
    match dialect {
        SearchDialect::Like => query.filter(column.like(pattern.as_str())),
        SearchDialect::ILike => {
            query.filter(Expr::col((column.entity_name(), column)).ilike(pattern.as_str()))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities;
    use sea_orm::{EntityTrait, QueryTrait};

    // ========================================================================
    // Pagination Tests
    // ========================================================================

    #[test]
    fn test_pagination_defaults() {
        let request = PageRequest::new(None, None);
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_pagination_page_bounds() {
        // Page 0 should become 1
        assert_eq!(PageRequest::new(Some(0), None).page, 1);
        // Negative page should become 1
        assert_eq!(PageRequest::new(Some(-5), None).page, 1);
    }

    #[test]
    fn test_pagination_page_size_bounds() {
        assert_eq!(PageRequest::new(None, Some(0)).page_size, 1);
        assert_eq!(PageRequest::new(None, Some(-3)).page_size, 1);
        assert_eq!(PageRequest::new(None, Some(500)).page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_pagination_from_input() {
        let request = PageRequest::from(Some(PaginationInput {
            page: Some(3),
            page_size: Some(20),
        }));
        assert_eq!(request, PageRequest { page: 3, page_size: 20 });
        assert_eq!(request.offset(), 40);

        assert_eq!(PageRequest::from(None), PageRequest::new(None, None));
    }

    #[test]
    fn test_total_pages() {
        let request = PageRequest::new(Some(1), Some(10));
        assert_eq!(request.total_pages(0), 0);
        assert_eq!(request.total_pages(1), 1);
        assert_eq!(request.total_pages(10), 1);
        assert_eq!(request.total_pages(11), 2);
        assert_eq!(request.total_pages(95), 10);
    }

    #[test]
    fn test_page_row_count_matches_remaining_rows() {
        for total in [0u64, 1, 9, 10, 11, 37] {
            for size in [1i32, 3, 10, 25] {
                for page in 1i32..=6 {
                    let request = PageRequest::new(Some(page), Some(size));
                    let rows: Vec<u64> = (0..total)
                        .skip(request.offset() as usize)
                        .take(request.page_size as usize)
                        .collect();
                    let result = Page::new(rows, total, request);

                    let expected = total
                        .saturating_sub(request.offset())
                        .min(request.page_size);
                    assert_eq!(result.current_count, expected);
                    assert_eq!(result.total_page, total.div_ceil(size as u64));
                    assert_eq!(result.current_page, page as u64);
                }
            }
        }
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], 12, PageRequest::new(Some(2), Some(5)));
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.items, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(mapped.total_count, 12);
        assert_eq!(mapped.total_page, 3);
        assert_eq!(mapped.current_count, 2);
        assert_eq!(mapped.page_size, 5);
    }

    #[test]
    fn test_apply_pagination_sql() {
        let query = apply_pagination(
            entities::podcast::Entity::find(),
            PageRequest::new(Some(3), Some(10)),
        );
        let sql = query.build(DatabaseBackend::Sqlite).to_string();
        assert!(str::contains(&sql, "LIMIT 10"), "{sql}");
        assert!(str::contains(&sql, "OFFSET 20"), "{sql}");
    }

    // ========================================================================
    // Text Search Tests
    // ========================================================================

    #[test]
    fn test_text_search_like() {
        let query = apply_text_search(
            entities::podcast::Entity::find(),
            entities::podcast::Column::Title,
            "rust",
            SearchDialect::Like,
        );
        let sql = query.build(DatabaseBackend::Sqlite).to_string();
        assert!(str::contains(&sql, "LIKE '%rust%'"), "{sql}");
        assert!(!str::contains(&sql, "ILIKE"), "{sql}");
    }

    #[test]
    fn test_text_search_ilike() {
        let query = apply_text_search(
            entities::podcast::Entity::find(),
            entities::podcast::Column::Title,
            "rust",
            SearchDialect::ILike,
        );
        let sql = query.build(DatabaseBackend::Postgres).to_string();
        assert!(str::contains(&sql, "ILIKE '%rust%'"), "{sql}");
    }

    #[test]
    fn test_text_search_empty_term_is_noop() {
        let query = apply_text_search(
            entities::podcast::Entity::find(),
            entities::podcast::Column::Title,
            "",
            SearchDialect::Like,
        );
        let sql = query.build(DatabaseBackend::Sqlite).to_string();
        assert!(!str::contains(&sql, "LIKE"), "{sql}");
    }

    #[test]
    fn test_dialect_for_backend() {
        assert_eq!(
            SearchDialect::for_backend(DatabaseBackend::Postgres),
            SearchDialect::ILike
        );
        assert_eq!(
            SearchDialect::for_backend(DatabaseBackend::Sqlite),
            SearchDialect::Like
        );
    }
}
