//! Pagination and sorting conventions shared by the admin listings.
//!
//! Query parameters: `page` (1-based), `perPage` (1..=100, default 20, or
//! the literal "all"), `sortBy`/`sortOrder` ("asc"/"desc", default desc).
//! Responses wrap rows in `{ items, pageInfo }`.

use serde::{Deserialize, Serialize};

/// Sort direction over `createdAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    /// MongoDB sort-stage value.
    pub fn bson_order(&self) -> i32 {
        match self {
            SortDir::Asc => 1,
            SortDir::Desc => -1,
        }
    }
}

/// How a listing is sliced: everything at once or one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    All,
    Page { page: u64, per_page: u64 },
}

/// Parsed pagination/sorting inputs.
#[derive(Debug, Clone, Copy)]
pub struct ListParams {
    pub mode: PageMode,
    pub sort: SortDir,
}

impl ListParams {
    /// Parse raw query values with the documented clamps. Unparseable
    /// numbers fall back to the defaults rather than erroring.
    pub fn parse(
        page: Option<&str>,
        per_page: Option<&str>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Self {
        let sort = match sort_by
            .or(sort_order)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("asc") => SortDir::Asc,
            _ => SortDir::Desc,
        };

        if per_page.is_some_and(|v| v.eq_ignore_ascii_case("all")) {
            return Self {
                mode: PageMode::All,
                sort,
            };
        }

        let page = page
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1) as u64;
        let per_page = per_page
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(20)
            .clamp(1, 100) as u64;

        Self {
            mode: PageMode::Page { page, per_page },
            sort,
        }
    }

    /// Documents to skip before the requested page.
    pub fn skip(&self) -> u64 {
        match self.mode {
            PageMode::All => 0,
            PageMode::Page { page, per_page } => (page - 1) * per_page,
        }
    }

    /// Page size as a MongoDB limit; `None` in "all" mode.
    pub fn limit(&self) -> Option<i64> {
        match self.mode {
            PageMode::All => None,
            PageMode::Page { per_page, .. } => Some(per_page as i64),
        }
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::parse(None, None, None, None)
    }
}

/// Raw pagination/sorting query parameters, for endpoints that take
/// nothing else.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl PageQuery {
    pub fn to_params(&self) -> ListParams {
        ListParams::parse(
            self.page.as_deref(),
            self.per_page.as_deref(),
            self.sort_by.as_deref(),
            self.sort_order.as_deref(),
        )
    }
}

/// Pagination metadata returned next to `items`. `perPage` is the literal
/// string "all" in all mode and a number otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub mode: String,
    pub page: u64,
    pub per_page: serde_json::Value,
    pub sort_by: String,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn build(params: &ListParams, total: u64) -> Self {
        match params.mode {
            PageMode::All => Self {
                mode: "all".into(),
                page: 1,
                per_page: serde_json::json!("all"),
                sort_by: params.sort.as_str().into(),
                total,
                total_pages: 1,
                has_next: false,
                has_prev: false,
            },
            PageMode::Page { page, per_page } => {
                let total_pages = total.div_ceil(per_page).max(1);
                Self {
                    mode: "page".into(),
                    page,
                    per_page: serde_json::json!(per_page),
                    sort_by: params.sort.as_str().into(),
                    total,
                    total_pages,
                    has_next: page < total_pages,
                    has_prev: page > 1,
                }
            }
        }
    }
}

/// Standard paginated response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}
