use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// `{"success": true, "data": ...}`; failures are shaped by `Error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        let total_pages = ((total as f64) / (page.per_page as f64)).ceil() as i64;
        Self {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(20).clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

impl From<&PageQuery> for Page {
    fn from(q: &PageQuery) -> Self {
        Page::new(q.page, q.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_are_clamped() {
        let page = Page::new(Some(0), Some(1000));
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 100);
        assert_eq!(page.offset(), 0);

        let page = Page::new(Some(3), None);
        assert_eq!(page.per_page, 20);
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn total_pages_rounds_up() {
        let list = Paginated::new(vec![1, 2], 41, Page::new(Some(1), Some(20)));
        assert_eq!(list.total_pages, 3);
        let empty: Paginated<i32> = Paginated::new(vec![], 0, Page::new(None, None));
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn success_envelope_shape() {
        let body = serde_json::to_value(ok(vec!["a"]).0).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"][0], "a");
    }
}
