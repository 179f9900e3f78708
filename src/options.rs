//! Per-call scrape options

use serde::{Deserialize, Serialize};

/// Options recognised by [`scrape`](crate::scrape).
///
/// Built fresh for every call; missing fields default to `false` when
/// deserialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeOptions {
    /// Run client-side scripts before querying. Accepted but not executed:
    /// documents are always queried as served.
    pub js: bool,
}

impl ScrapeOptions {
    pub fn with_js(mut self, js: bool) -> Self {
        self.js = js;
        self
    }
}
