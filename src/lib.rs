//! Declarative HTML extraction
//!
//! Describe the data you want as a [`Schema`] and get back a JSON object with
//! the same keys:
//! - selector strings give the first match's text (or `null`)
//! - `[item, "context"]` pairs give lists, either of texts or of objects
//! - nested schemas give nested objects
//! - computed fields run a function against the current context
//!
//! [`scrape`] fetches a page and interprets a schema against it. The parsing
//! and interpretation steps are also available on their own through
//! [`Document`] and [`interpret`].

pub mod document;
pub mod error;
pub mod fetch;
pub mod interpreter;
pub mod options;
pub mod schema;

pub use document::{text_of, Context, Document};
pub use error::{BoxError, Result, ScrapeError, SchemaError};
pub use fetch::{fetch, Location};
pub use interpreter::{interpret, interpret_in};
pub use options::ScrapeOptions;
pub use schema::{ComputedFn, ComputedResult, Schema, SchemaNode};

use serde_json::Value;
use tracing::{info_span, warn, Instrument};

/// A fetched and parsed page
#[derive(Debug)]
pub struct Page {
    pub location: Location,
    pub document: Document,
}

impl Page {
    pub async fn load(client: &reqwest::Client, url: &str) -> Result<Self> {
        let body = fetch(client, url).await?;
        Ok(Self {
            location: Location::new(url),
            document: Document::parse(&body),
        })
    }

    pub fn extract(&self, schema: &Schema) -> Result<Value> {
        interpret(schema, &self.document)
    }
}

/// Fetch `url` and extract `schema` from it with a default HTTP client
pub async fn scrape(url: &str, schema: &Schema, options: ScrapeOptions) -> Result<Value> {
    scrape_with_client(&reqwest::Client::new(), url, schema, options).await
}

/// Fetch `url` with `client` and extract `schema` from it
pub async fn scrape_with_client(
    client: &reqwest::Client,
    url: &str,
    schema: &Schema,
    options: ScrapeOptions,
) -> Result<Value> {
    async move {
        if options.js {
            warn!("client-side script execution is not supported, querying the served document");
        }
        let page = Page::load(client, url).await?;
        page.extract(schema)
    }
    .instrument(info_span!("scrape", href = url))
    .await
}
