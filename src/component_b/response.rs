//! response.rs
//! Renders the two responses the device knows: JSON readings and the chart page.
//! HTTP/1.0 framing, no Content-Length; the connection close delimits the body.

use log::error;
use serde::Serialize;

use crate::component_a::sensor::Reading;
use crate::component_b::dispatcher::Route;

pub const STATUS_OK: &str = "HTTP/1.0 200 OK";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html";

/// Chart page: polls `/data` every 5 s and redraws a four-bar chart.
pub const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status_line: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

/// Wire shape of `/data`.
#[derive(Debug, Serialize)]
struct DataPayload {
    temperature: f64,
    humidity: f64,
    light: f64,
    soil_moisture: f64,
}

impl From<&Reading> for DataPayload {
    fn from(r: &Reading) -> Self {
        Self {
            temperature: r.temperature_c,
            humidity: r.humidity_pct,
            light: r.light_pct,
            soil_moisture: r.soil_pct,
        }
    }
}

impl Response {
    pub fn ok(content_type: &str, body: String) -> Self {
        Self {
            status_line: STATUS_OK,
            headers: vec![("Content-Type", content_type.to_string())],
            body,
        }
    }

    pub fn data(reading: &Reading) -> Self {
        let body = match serde_json::to_string(&DataPayload::from(reading)) {
            Ok(body) => body,
            Err(e) => {
                error!("[Server] failed to encode reading {:?}: {}", reading, e);
                String::new()
            }
        };
        Self::ok(CONTENT_TYPE_JSON, body)
    }

    pub fn page() -> Self {
        Self::ok(CONTENT_TYPE_HTML, INDEX_HTML.to_string())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::with_capacity(self.body.len() + 64);
        out.push_str(self.status_line);
        out.push_str("\r\n");
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out.push_str(&self.body);
        out.into_bytes()
    }
}

/// Renders the response for `route`. `reading` is only consulted for `Route::Data`.
pub fn render(route: Route, reading: impl FnOnce() -> Reading) -> Response {
    match route {
        Route::Data => Response::data(&reading()),
        Route::Page => Response::page(),
    }
}
