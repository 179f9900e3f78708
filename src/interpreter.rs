//! Schema interpretation
//!
//! Walks a [`Schema`] against a [`Document`] and builds a JSON object with
//! exactly the schema's keys, in the schema's order.

use serde_json::{Map, Value};
use tracing::trace;

use crate::document::{text_of, Context, Document};
use crate::error::{Result, ScrapeError};
use crate::schema::{Schema, SchemaNode};

/// Interpret `schema` against the whole document
pub fn interpret(schema: &Schema, document: &Document) -> Result<Value> {
    interpret_in(schema, document, Context::Document)
}

/// Interpret `schema` with selectors evaluated inside `context`.
///
/// Fails only when a computed field fails; no partial object is returned.
pub fn interpret_in<'a>(
    schema: &Schema,
    document: &'a Document,
    context: Context<'a>,
) -> Result<Value> {
    let mut output = Map::with_capacity(schema.len());

    for (key, node) in schema.fields() {
        trace!(key, "interpreting field");
        let value = interpret_node(key, node, document, context)?;
        output.insert(key.to_string(), value);
    }

    Ok(Value::Object(output))
}

fn interpret_node<'a>(
    key: &str,
    node: &SchemaNode,
    document: &'a Document,
    context: Context<'a>,
) -> Result<Value> {
    let value = match node {
        // Empty text is reported as null, same as no match
        SchemaNode::Selector(selector) => document
            .first_text(selector, context)
            .filter(|text| !text.is_empty())
            .map_or(Value::Null, Value::String),

        SchemaNode::TextList { selector, context: scope } => {
            let texts = match scope {
                Some(scope) => document.texts_within(selector, scope, context),
                None => document.query(selector, context).into_iter().map(text_of).collect(),
            };
            Value::Array(texts.into_iter().map(Value::String).collect())
        }

        SchemaNode::List { item, context: scope } => {
            let elements = match scope {
                Some(scope) => document.query(scope, context),
                None => vec![],
            };
            Value::Array(
                elements
                    .into_iter()
                    .map(|element| interpret_in(item, document, Context::Node(element)))
                    .collect::<Result<Vec<_>>>()?,
            )
        }

        SchemaNode::Computed(f) => {
            f(document, context).map_err(|source| ScrapeError::Computed {
                key: key.to_string(),
                source,
            })?
        }

        SchemaNode::Nested(inner) => interpret_in(inner, document, context)?,
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn schema(value: Value) -> Schema {
        Schema::from_json(&value).unwrap()
    }

    #[test]
    fn test_selector_and_text_list() {
        let html = r#"
        <h1>Hello</h1>
        <ul class="tags"><li class="tag">a</li><li class="tag">b</li></ul>
        "#;
        let doc = Document::parse(html);

        let s = schema(json!({"title": "h1", "tags": ["li.tag", "ul.tags"]}));
        let result = interpret(&s, &doc).unwrap();
        assert_eq!(result, json!({"title": "Hello", "tags": ["a", "b"]}));
    }

    #[test]
    fn test_list_of_objects() {
        let html = r#"
        <div class="item"><span class="name">X</span></div>
        <div class="item"><span class="name">Y</span></div>
        "#;
        let doc = Document::parse(html);

        let s = schema(json!({"items": [{"name": "span.name"}, "div.item"]}));
        let result = interpret(&s, &doc).unwrap();
        assert_eq!(result, json!({"items": [{"name": "X"}, {"name": "Y"}]}));
    }

    #[test]
    fn test_missing_values_keep_shape() {
        let doc = Document::parse("<p>nothing here</p>");
        let s = schema(json!({
            "missing": ".nope",
            "tags": ["li", "ul"],
            "items": [{"name": "span"}, "div.item"],
            "nested": {"inner": "h1", "deeper": {"x": "h2"}}
        }));

        let result = interpret(&s, &doc).unwrap();
        assert_eq!(
            result,
            json!({
                "missing": null,
                "tags": [],
                "items": [],
                "nested": {"inner": null, "deeper": {"x": null}}
            })
        );
    }

    #[test]
    fn test_output_key_order_follows_schema() {
        let doc = Document::parse("<h1>t</h1>");
        let s = schema(json!({"z": "h1", "a": "h1", "m": {"y": "h1", "b": "h1"}}));

        let result = interpret(&s, &doc).unwrap();
        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        let inner: Vec<&String> = result["m"].as_object().unwrap().keys().collect();
        assert_eq!(inner, vec!["y", "b"]);
    }

    #[test]
    fn test_empty_text_is_null() {
        let doc =
            Document::parse(r#"<span class="blank">   </span><span class="empty"></span>"#);
        let s = schema(json!({"blank": ".blank", "empty": ".empty"}));
        let result = interpret(&s, &doc).unwrap();
        assert_eq!(result, json!({"blank": null, "empty": null}));
    }

    #[test]
    fn test_text_list_keeps_empty_strings_and_all_matches() {
        let doc = Document::parse(r#"<ul><li>a</li><li> </li><li>c</li></ul>"#);
        let result = interpret(&schema(json!({"all": ["li", "ul"]})), &doc).unwrap();
        assert_eq!(result, json!({"all": ["a", "", "c"]}));
    }

    #[test]
    fn test_selector_takes_first_match() {
        let doc = Document::parse(r#"<p class="x">first</p><p class="x">second</p>"#);
        let result = interpret(&schema(json!({"x": "p.x"})), &doc).unwrap();
        assert_eq!(result, json!({"x": "first"}));
    }

    #[test]
    fn test_nested_matches_direct() {
        let html = r#"<div><b>bold</b></div>"#;
        let doc = Document::parse(html);

        let nested = interpret(&schema(json!({"a": {"b": "b"}})), &doc).unwrap();
        let direct = interpret(&schema(json!({"b": "b"})), &doc).unwrap();
        assert_eq!(nested["a"]["b"], direct["b"]);
        assert_eq!(direct["b"], "bold");
    }

    #[test]
    fn test_list_items_scoped_to_each_match() {
        let html = r#"
        <article><h2>One</h2><ul><li>1a</li><li>1b</li></ul></article>
        <article><h2>Two</h2></article>
        <article><h2>Three</h2><ul><li>3a</li></ul></article>
        "#;
        let doc = Document::parse(html);
        let s = schema(json!({
            "posts": [{"title": "h2", "tags": ["li", "ul"], "meta": {"heading": "h2"}}, "article"]
        }));

        let result = interpret(&s, &doc).unwrap();
        assert_eq!(
            result,
            json!({"posts": [
                {"title": "One", "tags": ["1a", "1b"], "meta": {"heading": "One"}},
                {"title": "Two", "tags": [], "meta": {"heading": "Two"}},
                {"title": "Three", "tags": ["3a"], "meta": {"heading": "Three"}}
            ]})
        );
    }

    #[test]
    fn test_scalar_schema_values_yield_empty_objects() {
        let doc = Document::parse("<h1>t</h1>");
        let s = schema(json!({"n": 42, "flag": false, "title": "h1"}));
        let result = interpret(&s, &doc).unwrap();
        assert_eq!(result, json!({"n": {}, "flag": {}, "title": "t"}));
    }

    #[test]
    fn test_list_with_scalar_item_yields_empty_object_per_match() {
        let doc = Document::parse(r#"<div>a</div><div>b</div>"#);
        let s = schema(json!({"rows": [5, "div"], "nulls": [null, "div"]}));

        let result = interpret(&s, &doc).unwrap();
        assert_eq!(result, json!({"rows": [{}, {}], "nulls": [{}, {}]}));
    }

    #[test]
    fn test_text_list_without_context_takes_every_match() {
        let doc = Document::parse(r#"<ul><li>a</li></ul><ol><li>b</li></ol>"#);
        let s = schema(json!({"all": ["li"], "bad_context": ["li", 3]}));

        let result = interpret(&s, &doc).unwrap();
        assert_eq!(result, json!({"all": ["a", "b"], "bad_context": ["a", "b"]}));
    }

    #[test]
    fn test_object_list_without_context_is_empty() {
        let doc = Document::parse(r#"<div><b>x</b></div>"#);
        let s = schema(json!({"rows": [{"b": "b"}], "none": []}));

        let result = interpret(&s, &doc).unwrap();
        assert_eq!(result, json!({"rows": [], "none": []}));
    }

    #[test]
    fn test_list_extra_elements_ignored() {
        let doc = Document::parse(r#"<ul><li>a</li></ul><ol><li>b</li></ol>"#);
        let s = schema(json!({"tags": ["li", "ul", "ol"], "rows": [{"t": "li"}, "ol", 1]}));

        let result = interpret(&s, &doc).unwrap();
        assert_eq!(result, json!({"tags": ["a"], "rows": [{"t": "b"}]}));
    }

    #[test]
    fn test_computed_value_stored_verbatim() {
        let doc = Document::parse("<a>1</a><a>2</a>");
        let s = Schema::new()
            .computed("count", |doc, ctx| Ok(json!(doc.query("a", ctx).len())))
            .computed("flag", |_, _| Ok(json!(true)))
            .computed("nothing", |_, _| Ok(Value::Null))
            .computed("list", |_, _| Ok(json!([1, "two", {"three": 3}])));

        let result = interpret(&s, &doc).unwrap();
        assert_eq!(
            result,
            json!({"count": 2, "flag": true, "nothing": null, "list": [1, "two", {"three": 3}]})
        );
    }

    #[test]
    fn test_computed_receives_node_context() {
        let html = r#"
        <div class="row" data-id="7"><i>x</i><i>y</i></div>
        <div class="row" data-id="8"></div>
        "#;
        let doc = Document::parse(html);
        let item = Schema::new().computed("id", |_, ctx| match ctx {
            Context::Node(el) => Ok(json!(el.value().attr("data-id"))),
            Context::Document => Err("expected a node context".into()),
        });
        let item = item.computed("icons", |doc, ctx| Ok(json!(doc.query("i", ctx).len())));
        let s = Schema::new().field("rows", SchemaNode::list(item, "div.row"));

        let result = interpret(&s, &doc).unwrap();
        assert_eq!(
            result,
            json!({"rows": [{"id": "7", "icons": 2}, {"id": "8", "icons": 0}]})
        );
    }

    #[test]
    fn test_computed_error_propagates_with_key() {
        let doc = Document::parse("<h1>t</h1>");
        let s = Schema::new()
            .field("title", "h1")
            .field("inner", Schema::new().computed("boom", |_, _| Err("exploded".into())));

        let err = interpret(&s, &doc).unwrap_err();
        match err {
            ScrapeError::Computed { key, source } => {
                assert_eq!(key, "boom");
                assert_eq!(source.to_string(), "exploded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_computed_called_once_per_context() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let item = Schema::new().computed("n", move |_, _| {
            Ok(json!(counter.fetch_add(1, Ordering::SeqCst)))
        });
        let s = Schema::new().field("rows", SchemaNode::list(item, "li"));

        let doc = Document::parse("<ul><li></li><li></li><li></li></ul>");
        let result = interpret(&s, &doc).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result, json!({"rows": [{"n": 0}, {"n": 1}, {"n": 2}]}));
    }
}
