//! Parsed HTML documents and CSS selector queries
//!
//! Uses the scraper crate (html5ever) for parsing, so entities are decoded
//! as part of tree construction.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Where selectors are evaluated: the whole document or below one element
#[derive(Debug, Clone, Copy)]
pub enum Context<'a> {
    Document,
    Node(ElementRef<'a>),
}

/// A parsed document that can be queried with CSS selectors
#[derive(Debug)]
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// All elements matching `selector` within `context`, in document order.
    ///
    /// A node context matches descendants only, never the node itself.
    /// Selectors that fail to parse match nothing.
    pub fn query<'a>(&'a self, selector: &str, context: Context<'a>) -> Vec<ElementRef<'a>> {
        let selector = match Selector::parse(selector) {
            Ok(s) => s,
            Err(err) => {
                debug!(selector, error = %err, "selector did not parse, treating as no match");
                return vec![];
            }
        };

        match context {
            Context::Document => self.html.select(&selector).collect(),
            Context::Node(element) => element.select(&selector).collect(),
        }
    }

    /// Trimmed text of the first match, if any
    pub fn first_text(&self, selector: &str, context: Context<'_>) -> Option<String> {
        self.query(selector, context).into_iter().next().map(text_of)
    }

    /// Trimmed text of every `selector` match lying inside an element
    /// matched by `scope`. Both selectors are evaluated within `context`.
    ///
    /// Each element is reported once, in document order, even when scopes
    /// nest.
    pub fn texts_within(&self, selector: &str, scope: &str, context: Context<'_>) -> Vec<String> {
        let scopes: HashSet<_> = self
            .query(scope, context)
            .into_iter()
            .map(|el| el.id())
            .collect();

        if scopes.is_empty() {
            return vec![];
        }

        self.query(selector, context)
            .into_iter()
            .filter(|el| el.ancestors().any(|ancestor| scopes.contains(&ancestor.id())))
            .map(text_of)
            .collect()
    }
}

/// Text content of an element and its descendants, whitespace-trimmed
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
