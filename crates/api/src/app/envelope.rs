//! The `{success, message, data, paginationInfo}` response shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use gatehouse_core::Locale;
use gatehouse_infra::Page;

use crate::app::i18n::Message;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_info: Option<PaginationInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total_docs: u64,
    pub limit: u32,
    pub total_pages: u64,
    pub page: u32,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl PaginationInfo {
    pub fn of<T>(page: &Page<T>) -> Self {
        let current = page.request.page;
        Self {
            total_docs: page.total,
            limit: page.request.limit,
            total_pages: page.total_pages(),
            page: current,
            has_prev_page: page.has_prev(),
            has_next_page: page.has_next(),
            prev_page: page.has_prev().then(|| current - 1),
            next_page: page.has_next().then(|| current + 1),
        }
    }
}

/// 200 with `success=true` and a payload.
pub fn ok<T: Serialize>(message: Message, locale: Locale, data: T) -> Response {
    respond(
        StatusCode::OK,
        Envelope {
            success: true,
            message: message.text(locale),
            data: Some(data),
            pagination_info: None,
        },
    )
}

/// 200 with `success=true`, a page of items and its pagination block.
pub fn page<T: Serialize>(message: Message, locale: Locale, page: Page<T>) -> Response {
    let pagination_info = PaginationInfo::of(&page);
    respond(
        StatusCode::OK,
        Envelope {
            success: true,
            message: message.text(locale),
            data: Some(page.items),
            pagination_info: Some(pagination_info),
        },
    )
}

/// `success=false` with no payload.
pub fn failure(status: StatusCode, message: Message, locale: Locale) -> Response {
    respond::<()>(
        status,
        Envelope {
            success: false,
            message: message.text(locale),
            data: None,
            pagination_info: None,
        },
    )
}

fn respond<T: Serialize>(status: StatusCode, body: Envelope<T>) -> Response {
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_infra::PageRequest;

    fn page_of(total: u64, page: u32, limit: u32) -> Page<u32> {
        Page {
            items: Vec::new(),
            total,
            request: PageRequest { page, limit },
        }
    }

    #[test]
    fn middle_page_links_both_ways() {
        let info = PaginationInfo::of(&page_of(25, 2, 10));
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.prev_page, Some(1));
        assert_eq!(info.next_page, Some(3));
        assert!(info.has_prev_page && info.has_next_page);
    }

    #[test]
    fn single_page_has_no_links() {
        let info = PaginationInfo::of(&page_of(4, 1, 10));
        assert_eq!(info.total_pages, 1);
        assert_eq!(info.prev_page, None);
        assert_eq!(info.next_page, None);
    }

    #[test]
    fn envelope_omits_absent_fields() {
        let body = Envelope::<()> {
            success: false,
            message: "No Data",
            data: None,
            pagination_info: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "message": "No Data" }));

        let info = serde_json::to_value(PaginationInfo::of(&page_of(0, 1, 10))).unwrap();
        assert_eq!(info["totalDocs"], 0);
        assert!(info["prevPage"].is_null());
    }
}
