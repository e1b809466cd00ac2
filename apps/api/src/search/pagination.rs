use serde::Serialize;

/// How many page links to show on each side of the current page.
const WINDOW_RADIUS: i64 = 2;

/// `ceil(total / per_page)` in integer arithmetic.
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    let per_page = per_page.max(1);
    (total + per_page - 1) / per_page
}

/// Clamps a requested page into `1..=total_pages`. An empty result set keeps
/// any page ≥ 1 as requested.
pub fn clamp_page(requested: i64, total_pages: i64) -> i64 {
    if requested < 1 {
        1
    } else if total_pages > 0 && requested > total_pages {
        total_pages
    } else {
        requested
    }
}

/// Resolved pagination for one search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(requested_page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = total_pages(total, per_page);
        Self {
            page: clamp_page(requested_page, total_pages),
            per_page,
            total,
            total_pages,
        }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Index range of the current page within a fully materialized result.
    pub fn slice_range(&self, len: usize) -> std::ops::Range<usize> {
        let start = usize::try_from(self.offset()).unwrap_or(0).min(len);
        let end = start
            .saturating_add(usize::try_from(self.per_page).unwrap_or(0))
            .min(len);
        start..end
    }

    pub fn window(&self) -> PageWindow {
        let has_prev = self.page > 1;
        let has_next = self.page < self.total_pages;
        let first = self.page.saturating_sub(WINDOW_RADIUS).max(1);
        let last = self.page.saturating_add(WINDOW_RADIUS).min(self.total_pages);
        PageWindow {
            has_prev,
            has_next,
            prev_page: has_prev.then_some(self.page - 1),
            next_page: has_next.then_some(self.page + 1),
            pages: (first..=last).collect(),
        }
    }
}

/// Navigation metadata for listing views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_page: Option<i64>,
    pub next_page: Option<i64>,
    pub pages: Vec<i64>,
}
