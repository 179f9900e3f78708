//! Extraction schemas
//!
//! A schema maps output keys to [`SchemaNode`]s. The node kind is fixed when
//! the schema is built, either through the builder methods or by
//! [`Schema::from_json`], which is the only place JSON shapes are inspected.
//!
//! JSON form:
//! - `"h1"`: text of the first match, `null` when nothing matches
//! - `["li", "ul.tags"]`: text of every `li` inside a `ul.tags`
//! - `[{"name": "span"}, "div.item"]`: one object per `div.item`
//! - `{"title": "h1"}`: nested object evaluated in the same context

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::document::{Context, Document};
use crate::error::{BoxError, SchemaError};

pub type ComputedResult = std::result::Result<Value, BoxError>;

/// User-supplied function deriving a value from the current context
pub type ComputedFn =
    Arc<dyn for<'a> Fn(&'a Document, Context<'a>) -> ComputedResult + Send + Sync>;

#[derive(Clone)]
pub enum SchemaNode {
    /// Text of the first match
    Selector(String),
    /// Text of every `selector` match inside the elements matched by
    /// `context`, or anywhere in the current context when there is none
    TextList {
        selector: String,
        context: Option<String>,
    },
    /// One output object per `context` match, evaluated with that element
    /// as context. Without a context selector the list is empty.
    List {
        item: Schema,
        context: Option<String>,
    },
    /// Value returned verbatim from a function
    Computed(ComputedFn),
    /// Nested object evaluated in the enclosing context
    Nested(Schema),
}

impl SchemaNode {
    pub fn selector(selector: impl Into<String>) -> Self {
        SchemaNode::Selector(selector.into())
    }

    pub fn text_list(selector: impl Into<String>, context: impl Into<String>) -> Self {
        SchemaNode::TextList {
            selector: selector.into(),
            context: Some(context.into()),
        }
    }

    pub fn list(item: Schema, context: impl Into<String>) -> Self {
        SchemaNode::List {
            item,
            context: Some(context.into()),
        }
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a Document, Context<'a>) -> ComputedResult + Send + Sync + 'static,
    {
        SchemaNode::Computed(Arc::new(f))
    }

    fn from_json_at(value: &Value, path: &str) -> Result<Self, SchemaError> {
        match value {
            Value::String(selector) => Ok(SchemaNode::Selector(selector.clone())),
            Value::Array(elements) => list_from_json(elements, path),
            Value::Object(_) => Ok(SchemaNode::Nested(Schema::from_object_at(value, path)?)),
            other => Ok(SchemaNode::Nested(empty_schema(other, path))),
        }
    }
}

/// Schema used for values that are neither selector, list nor object.
/// Scalars have no entries to recurse into.
fn empty_schema(value: &Value, path: &str) -> Schema {
    warn!(
        path,
        value = %value,
        "schema value is not a selector, list or object; yielding an empty object"
    );
    Schema::new()
}

/// `[item, context]`. Elements past the second are ignored.
fn list_from_json(elements: &[Value], path: &str) -> Result<SchemaNode, SchemaError> {
    let context = match elements.get(1) {
        Some(Value::String(context)) => Some(context.clone()),
        Some(other) => {
            warn!(path, value = %other, "list context is not a selector string, ignoring it");
            None
        }
        None => None,
    };

    let item_path = format!("{path}[]");
    let item = match elements.first() {
        Some(Value::String(selector)) => {
            return Ok(SchemaNode::TextList {
                selector: selector.clone(),
                context,
            })
        }
        Some(item @ Value::Object(_)) => Schema::from_object_at(item, &item_path)?,
        Some(other) => empty_schema(other, &item_path),
        None => Schema::new(),
    };

    Ok(SchemaNode::List { item, context })
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Selector(s) => f.debug_tuple("Selector").field(s).finish(),
            SchemaNode::TextList { selector, context } => f
                .debug_struct("TextList")
                .field("selector", selector)
                .field("context", context)
                .finish(),
            SchemaNode::List { item, context } => f
                .debug_struct("List")
                .field("item", item)
                .field("context", context)
                .finish(),
            SchemaNode::Computed(_) => f.write_str("Computed(<fn>)"),
            SchemaNode::Nested(schema) => f.debug_tuple("Nested").field(schema).finish(),
        }
    }
}

impl From<&str> for SchemaNode {
    fn from(selector: &str) -> Self {
        SchemaNode::selector(selector)
    }
}

impl From<String> for SchemaNode {
    fn from(selector: String) -> Self {
        SchemaNode::Selector(selector)
    }
}

impl From<Schema> for SchemaNode {
    fn from(schema: Schema) -> Self {
        SchemaNode::Nested(schema)
    }
}

/// Ordered mapping from output key to [`SchemaNode`]
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, SchemaNode)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Redefining a key replaces its node but keeps its position.
    pub fn field(mut self, key: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        let key = key.into();
        let node = node.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = node,
            None => self.fields.push((key, node)),
        }
        self
    }

    pub fn computed<F>(self, key: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a Document, Context<'a>) -> ComputedResult + Send + Sync + 'static,
    {
        self.field(key, SchemaNode::computed(f))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a schema from its JSON description.
    ///
    /// The top level must be an object. Anything below it is accepted: values
    /// that are not selectors, lists or objects become empty objects, and
    /// lists are read from their first two elements.
    pub fn from_json(value: &Value) -> Result<Self, SchemaError> {
        Self::from_object_at(value, "")
    }

    fn from_object_at(value: &Value, path: &str) -> Result<Self, SchemaError> {
        let Value::Object(entries) = value else {
            return Err(SchemaError::NotAnObject {
                found: json_kind(value),
            });
        };

        let mut fields = Vec::with_capacity(entries.len());
        for (key, node) in entries {
            let child_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            fields.push((key.clone(), SchemaNode::from_json_at(node, &child_path)?));
        }
        Ok(Self { fields })
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_json(&value)
    }
}

impl TryFrom<&Value> for Schema {
    type Error = SchemaError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
