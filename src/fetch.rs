//! Document acquisition over HTTP

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};

/// Fetch the body of `url` as text.
///
/// Network failures and non-success statuses are returned as errors; there
/// is no retry and no timeout beyond what `client` is configured with.
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<String> {
    debug!(url, "fetching document");

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    debug!(url, status = status.as_u16(), bytes = body.len(), "fetched document");
    Ok(body)
}

/// Where a document came from. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Source identifier exactly as given
    pub href: String,
    pub host: Option<String>,
    pub path: Option<String>,
}

impl Location {
    pub fn new(href: &str) -> Self {
        match Url::parse(href) {
            Ok(url) => Self {
                href: href.to_string(),
                host: url.host_str().map(String::from),
                path: Some(url.path().to_string()),
            },
            Err(_) => Self {
                href: href.to_string(),
                host: None,
                path: None,
            },
        }
    }
}
