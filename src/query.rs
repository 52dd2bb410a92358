//! Query service — filtered, paginated request listings for staff review.
//!
//! Read-only. Count and items come from a single transaction so `total` and
//! the returned page never disagree when a transition commits in between.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::repository::{count_requests, list_requests_page};
use crate::db::DatabaseError;
use crate::models::{RequestFilter, RequestListItem};

/// Fixed page size of the staff review listing.
pub const PAGE_SIZE: i64 = 10;

#[derive(Debug, Serialize)]
pub struct RequestPage {
    pub items: Vec<RequestListItem>,
    /// The page actually served (1-based; input below 1 is clamped).
    pub page: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Serve one page of requests matching the filter, newest first. A page past
/// the end returns an empty item list with correct totals, never an error.
pub fn list_requests(
    conn: &Connection,
    filter: &RequestFilter,
    page: i64,
) -> Result<RequestPage, DatabaseError> {
    let page = page.max(1);

    let tx = conn.unchecked_transaction()?;
    let total = count_requests(&tx, filter)?;
    let items = list_requests_page(&tx, filter, PAGE_SIZE, (page - 1) * PAGE_SIZE)?;
    tx.commit()?;

    let total_pages = (total + PAGE_SIZE - 1) / PAGE_SIZE;

    Ok(RequestPage { items, page, total, total_pages })
}
