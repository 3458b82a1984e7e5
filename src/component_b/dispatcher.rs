//! dispatcher.rs
//! Classifies one raw request into a route.
//!
//! Routing is a substring match on the decoded text, not request-line parsing:
//! any request containing `GET /data` anywhere is a data request, everything else
//! (including bytes that are not valid UTF-8) gets the page. Clients of the device
//! depend on that looseness, so it is kept as is.

use std::str;

pub const DATA_MARKER: &str = "GET /data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Data,
    Page,
}

pub fn classify(raw_request: &[u8]) -> Route {
    match str::from_utf8(raw_request) {
        Ok(text) if text.contains(DATA_MARKER) => Route::Data,
        _ => Route::Page,
    }
}
