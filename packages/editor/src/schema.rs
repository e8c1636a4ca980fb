//! # The editor's document schema
//!
//! The shared schema every part of the editor builds documents
//! against: the usual rich-text blocks and inline marks, plus a table
//! family whose body insists on at least three rows. That `{3,}`
//! floor is what the broken-table command trips over; a document made
//! with unchecked constructors can carry fewer rows and nothing stops
//! it until someone checks.

use serde_json::Value;

use vellum_markup::{MarkupNode, OutputSpec};
use vellum_model::{
    attrs, Attrs, MarkSpec, Node, NodeSpec, ParseRule, Schema, SchemaError, SchemaSpec,
};

/// Attribute truthiness, the way the rendering rules use it: null,
/// false, zero and the empty string all read as unset.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn attr_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn string_or_null(value: Option<&str>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

// font-weight values that mean bold: the keywords, or a numeric
// weight of 500 and up (three digits or more).
fn bold_weight(value: &str) -> bool {
    if value == "bold" || value == "bolder" {
        return true;
    }
    let bytes = value.as_bytes();
    bytes.len() >= 3
        && (b'5'..=b'9').contains(&bytes[0])
        && bytes.iter().all(|byte| byte.is_ascii_digit())
}

fn span_attr(element: &MarkupNode, name: &str) -> i64 {
    element
        .attr(name)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(1)
}

// Shared by the td and th rules; the tag itself becomes the celltype
// attribute.
fn cell_attrs(element: &MarkupNode) -> Option<Attrs> {
    Some(attrs([
        ("celltype", Value::from(element.tag().unwrap_or("td"))),
        ("colspan", Value::from(span_attr(element, "colspan"))),
        ("rowspan", Value::from(span_attr(element, "rowspan"))),
    ]))
}

fn highlighted_block(tag: &'static str, node: &Node) -> OutputSpec {
    OutputSpec::new(tag)
        .with_optional_attr(
            "style",
            truthy(node.attrs.get("highlight")).then_some("background: red;"),
        )
        .with_hole()
}

/// Builds the schema used across the editor.
pub fn editor_schema() -> Result<Schema, SchemaError> {
    let mut heading = NodeSpec::new()
        .with_attr("level", Value::from(1))
        .with_content("inline*")
        .with_group("block")
        .defining();
    for level in 1..=6i64 {
        heading = heading.with_parse_rule(
            ParseRule::tag(format!("h{level}")).with_attrs(attrs([("level", Value::from(level))])),
        );
    }
    heading = heading.with_to_markup(|node| {
        let level = node.attrs.get("level").and_then(Value::as_i64).unwrap_or(1);
        OutputSpec::new(format!("h{level}")).with_hole()
    });

    let spec = SchemaSpec::new()
        .with_node("doc", NodeSpec::new().with_content("block+"))
        .with_node(
            "paragraph",
            NodeSpec::new()
                // Demo attribute: a truthy value paints the block red.
                .with_attr("highlight", Value::Null)
                .with_content("inline*")
                .with_group("block")
                .with_parse_tag("p")
                .with_to_markup(|node| highlighted_block("p", node)),
        )
        .with_node(
            "blockquote",
            NodeSpec::new()
                .with_attr("highlight", Value::Null)
                .with_content("block+")
                .with_group("block")
                .defining()
                .with_parse_tag("blockquote")
                .with_to_markup(|node| highlighted_block("blockquote", node)),
        )
        .with_node(
            "horizontal_rule",
            NodeSpec::new()
                .with_group("block")
                .with_parse_tag("hr")
                .with_to_markup(|_| OutputSpec::new("hr")),
        )
        .with_node("heading", heading)
        .with_node(
            "code_block",
            NodeSpec::new()
                .with_content("text*")
                .with_marks("")
                .with_group("block")
                .defining()
                .with_parse_tag("pre")
                .with_to_markup(|_| {
                    OutputSpec::new("pre").wrapping(OutputSpec::new("code").with_hole())
                }),
        )
        .with_node("text", NodeSpec::new().with_group("inline"))
        .with_node(
            "image",
            NodeSpec::new()
                .inline()
                .with_required_attr("src")
                .with_attr("alt", Value::Null)
                .with_attr("title", Value::Null)
                .with_group("inline")
                .with_parse_rule(ParseRule::tag("img[src]").with_extract(|element| {
                    Some(attrs([
                        ("src", string_or_null(element.attr("src"))),
                        ("title", string_or_null(element.attr("title"))),
                        ("alt", string_or_null(element.attr("alt"))),
                    ]))
                }))
                .with_to_markup(|node| {
                    OutputSpec::new("img")
                        .with_optional_attr("src", node.attrs.get("src").and_then(Value::as_str))
                        .with_optional_attr("alt", node.attrs.get("alt").and_then(Value::as_str))
                        .with_optional_attr(
                            "title",
                            node.attrs.get("title").and_then(Value::as_str),
                        )
                }),
        )
        .with_node(
            "hard_break",
            NodeSpec::new()
                .inline()
                .with_group("inline")
                .with_parse_tag("br")
                .with_to_markup(|_| OutputSpec::new("br")),
        )
        .with_node(
            "table",
            NodeSpec::new()
                .with_content("table_colgroup? table_body")
                .isolating()
                .with_group("block")
                .with_parse_tag("table")
                .with_to_markup(|_| OutputSpec::new("table").with_hole()),
        )
        .with_node(
            "table_body",
            NodeSpec::new()
                .with_content("table_row{3,}")
                .with_group("block")
                .with_parse_tag("tbody")
                .with_to_markup(|_| OutputSpec::new("tbody").with_hole()),
        )
        .with_node(
            "table_colgroup",
            NodeSpec::new()
                .with_content("table_col+")
                .with_group("block")
                .with_parse_tag("colgroup")
                .with_to_markup(|_| OutputSpec::new("colgroup").with_hole()),
        )
        .with_node(
            "table_row",
            NodeSpec::new()
                .with_content("table_cell+")
                .with_parse_rule(ParseRule::tag("tr").with_priority(80))
                .with_to_markup(|_| OutputSpec::new("tr").with_hole()),
        )
        .with_node(
            "table_cell",
            NodeSpec::new()
                .with_content("inline*")
                .with_attr("celltype", Value::from("td"))
                .with_attr("colspan", Value::from(1))
                .with_attr("rowspan", Value::from(1))
                .isolating()
                .with_parse_rule(ParseRule::tag("td").with_extract(cell_attrs))
                .with_parse_rule(ParseRule::tag("th").with_extract(cell_attrs))
                .with_to_markup(|node| {
                    let tag = node
                        .attrs
                        .get("celltype")
                        .and_then(Value::as_str)
                        .unwrap_or("td");
                    let mut spec = OutputSpec::new(tag);
                    for name in ["colspan", "rowspan"] {
                        let value = node.attrs.get(name);
                        if truthy(value) && value.and_then(Value::as_i64) != Some(1) {
                            if let Some(value) = value {
                                spec = spec.with_attr(name, attr_string(value));
                            }
                        }
                    }
                    spec.with_hole()
                }),
        )
        .with_node(
            "table_col",
            NodeSpec::new()
                .with_attr("width", Value::from(""))
                .with_group("block")
                .with_parse_rule(ParseRule::tag("col").with_extract(|element| {
                    Some(attrs([(
                        "width",
                        Value::from(element.attr("width").unwrap_or("")),
                    )]))
                }))
                .with_to_markup(|node| {
                    let mut spec = OutputSpec::new("col");
                    if let Some(width) = node.attrs.get("width").filter(|value| truthy(Some(value)))
                    {
                        spec = spec.with_attr("width", attr_string(width));
                    }
                    spec
                }),
        )
        .with_mark(
            "link",
            MarkSpec::new()
                .with_required_attr("href")
                .with_attr("title", Value::Null)
                .with_inclusive(false)
                .with_parse_rule(ParseRule::tag("a[href]").with_extract(|element| {
                    Some(attrs([
                        ("href", string_or_null(element.attr("href"))),
                        ("title", string_or_null(element.attr("title"))),
                    ]))
                }))
                .with_to_markup(|mark| {
                    OutputSpec::new("a")
                        .with_optional_attr("href", mark.attrs.get("href").and_then(Value::as_str))
                        .with_optional_attr(
                            "title",
                            mark.attrs.get("title").and_then(Value::as_str),
                        )
                        .with_hole()
                }),
        )
        .with_mark(
            "italic",
            MarkSpec::new()
                .with_parse_tag("i")
                .with_parse_tag("em")
                .with_parse_rule(ParseRule::style("font-style", "italic"))
                .with_to_markup(|_| OutputSpec::new("em").with_hole()),
        )
        .with_mark(
            "bold",
            MarkSpec::new()
                .with_parse_tag("strong")
                // Accept <b> unless it carries font-weight normal,
                // which is how Google Docs wraps pasted content that
                // is not actually bold.
                .with_parse_rule(ParseRule::tag("b").with_extract(|element| {
                    match element.style_value("font-weight") {
                        Some("normal") => None,
                        _ => Some(Attrs::new()),
                    }
                }))
                .with_parse_rule(ParseRule::style_checked("font-weight", |value| {
                    bold_weight(value).then(Attrs::new)
                }))
                .with_to_markup(|_| OutputSpec::new("strong").with_hole()),
        )
        .with_mark(
            "code",
            MarkSpec::new()
                .with_parse_tag("code")
                .with_to_markup(|_| OutputSpec::new("code").with_hole()),
        )
        .with_mark(
            "strikethrough",
            MarkSpec::new()
                .with_parse_tag("s")
                .with_parse_tag("strike")
                .with_parse_rule(ParseRule::style("text-decoration", "line-through"))
                .with_parse_rule(ParseRule::style("text-decoration-line", "line-through"))
                .with_to_markup(|_| OutputSpec::new("s").with_hole()),
        );

    Schema::compile(spec)
}
