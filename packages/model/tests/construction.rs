//! Construction-path behavior: the unchecked constructor preserves
//! whatever it is given, the filling constructor guarantees validity
//! or refuses, and the two visibly diverge on the same inputs.

use serde_json::json;
use vellum_model::{
    attrs, Attrs, MarkSpec, Node, NodeSpec, Schema, SchemaError, SchemaSpec,
};

fn table_schema() -> Schema {
    Schema::compile(
        SchemaSpec::new()
            .with_node("doc", NodeSpec::new().with_content("block+"))
            .with_node(
                "paragraph",
                NodeSpec::new().with_content("inline*").with_group("block"),
            )
            .with_node(
                "table",
                NodeSpec::new()
                    .with_content("table_colgroup? table_body")
                    .with_group("block")
                    .isolating(),
            )
            .with_node("table_body", NodeSpec::new().with_content("table_row{3,}"))
            .with_node("table_colgroup", NodeSpec::new().with_content("table_col+"))
            .with_node("table_col", NodeSpec::new().with_attr("width", json!("")))
            .with_node("table_row", NodeSpec::new().with_content("table_cell+"))
            .with_node(
                "table_cell",
                NodeSpec::new()
                    .with_content("inline*")
                    .with_attr("celltype", json!("td"))
                    .with_attr("colspan", json!(1))
                    .with_attr("rowspan", json!(1))
                    .isolating(),
            )
            .with_node(
                "gallery",
                NodeSpec::new().with_content("image+").with_group("block"),
            )
            .with_node(
                "image",
                NodeSpec::new()
                    .inline()
                    .with_group("inline")
                    .with_required_attr("src"),
            )
            .with_node("text", NodeSpec::new().with_group("inline")),
    )
    .unwrap()
}

fn bare_cell(schema: &Schema) -> Node {
    schema
        .node("table_cell", Attrs::new(), vec![], vec![])
        .unwrap()
}

fn row_with_cells(schema: &Schema, cells: usize) -> Node {
    let content = (0..cells).map(|_| bare_cell(schema)).collect();
    schema.node("table_row", Attrs::new(), content, vec![]).unwrap()
}

#[test]
fn fill_generates_minimal_valid_content() {
    let schema = table_schema();
    let table = schema.node_and_fill("table", Attrs::new(), vec![]).unwrap();

    // The optional colgroup is skipped, the body is generated with
    // exactly the three rows its count demands, one cell each.
    assert_eq!(table.content.len(), 1);
    let body = &table.content[0];
    assert_eq!(body.name, "table_body");
    assert_eq!(body.content.len(), 3);
    for row in &body.content {
        assert_eq!(row.name, "table_row");
        assert_eq!(row.content.len(), 1);
        assert_eq!(row.content[0].name, "table_cell");
    }
    assert!(table.check(&schema).is_ok());
}

#[test]
fn fill_applies_attribute_defaults_to_generated_nodes() {
    let schema = table_schema();
    let table = schema.node_and_fill("table", Attrs::new(), vec![]).unwrap();
    let cell = &table.content[0].content[0].content[0];
    assert_eq!(cell.attrs.get("celltype"), Some(&json!("td")));
    assert_eq!(cell.attrs.get("colspan"), Some(&json!(1)));
    assert_eq!(cell.attrs.get("rowspan"), Some(&json!(1)));
}

#[test]
fn fill_keeps_the_given_prefix_in_order_and_in_full() {
    let schema = table_schema();
    let wide = row_with_cells(&schema, 4);
    let body = schema
        .node_and_fill("table_body", Attrs::new(), vec![wide.clone()])
        .unwrap();
    assert_eq!(body.content.len(), 3);
    assert_eq!(body.content[0], wide);

    let five: Vec<Node> = (0..5).map(|_| row_with_cells(&schema, 1)).collect();
    let body = schema
        .node_and_fill("table_body", Attrs::new(), five.clone())
        .unwrap();
    assert_eq!(body.content, five);
}

#[test]
fn fill_tops_up_later_terms_after_the_prefix() {
    let schema = table_schema();
    let colgroup = schema
        .node_and_fill("table_colgroup", Attrs::new(), vec![])
        .unwrap();
    assert_eq!(colgroup.content.len(), 1);
    assert_eq!(colgroup.content[0].name, "table_col");

    let table = schema
        .node_and_fill("table", Attrs::new(), vec![colgroup.clone()])
        .unwrap();
    assert_eq!(table.content.len(), 2);
    assert_eq!(table.content[0], colgroup);
    assert_eq!(table.content[1].name, "table_body");
}

#[test]
fn fill_refuses_when_no_completion_exists() {
    let schema = table_schema();

    // A gallery needs images and images need a src, which has no
    // default, so nothing can be generated.
    let err = schema
        .node_and_fill("gallery", Attrs::new(), vec![])
        .unwrap_err();
    assert!(matches!(err, SchemaError::NoValidFill { ref name, .. } if name == "gallery"));

    // A block child can never belong to inline content.
    let paragraph = schema
        .node("paragraph", Attrs::new(), vec![], vec![])
        .unwrap();
    let err = schema
        .node_and_fill("paragraph", Attrs::new(), vec![paragraph])
        .unwrap_err();
    assert!(matches!(err, SchemaError::NoValidFill { .. }));
}

#[test]
fn fill_survives_self_recursive_content() {
    let schema = Schema::compile(
        SchemaSpec::new()
            .with_node("doc", NodeSpec::new().with_content("loop+"))
            .with_node("loop", NodeSpec::new().with_content("loop+"))
            .with_node("text", NodeSpec::new()),
    )
    .unwrap();
    // Generating a `loop` needs another `loop` inside it, without end.
    // The cycle guard turns that into a refusal instead of a hang.
    let err = schema.node_and_fill("doc", Attrs::new(), vec![]).unwrap_err();
    assert!(matches!(err, SchemaError::NoValidFill { .. }));
}

#[test]
fn fill_on_a_leaf_rejects_children() {
    let schema = table_schema();
    let err = schema
        .node_and_fill("table_col", Attrs::new(), vec![bare_cell(&schema)])
        .unwrap_err();
    assert!(matches!(err, SchemaError::LeafWithChildren(ref name) if name == "table_col"));

    let col = schema
        .node_and_fill("table_col", Attrs::new(), vec![])
        .unwrap();
    assert!(col.content.is_empty());
}

#[test]
fn unchecked_construction_preserves_invalid_children_verbatim() {
    let schema = table_schema();

    // One row where the body demands three.
    let row = row_with_cells(&schema, 2);
    let body = schema
        .node("table_body", Attrs::new(), vec![row.clone()], vec![])
        .unwrap();
    assert_eq!(body.content, vec![row]);

    // Rows directly inside the table, no body at all.
    let rows: Vec<Node> = (0..4).map(|_| row_with_cells(&schema, 2)).collect();
    let table = schema
        .node("table", Attrs::new(), rows.clone(), vec![])
        .unwrap();
    assert_eq!(table.content, rows);
}

#[test]
fn violations_report_what_unchecked_construction_let_through() {
    let schema = table_schema();
    let rows: Vec<Node> = (0..4).map(|_| row_with_cells(&schema, 2)).collect();
    let table = schema.node("table", Attrs::new(), rows, vec![]).unwrap();

    let violations = table.violations(&schema);
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.contains("table_colgroup? table_body"));
    assert!(table.check(&schema).is_err());
}

#[test]
fn construction_paths_diverge_on_the_same_input() {
    let schema = table_schema();
    let prefix = vec![row_with_cells(&schema, 2)];

    let unchecked = schema
        .node("table_body", Attrs::new(), prefix.clone(), vec![])
        .unwrap();
    let filled = schema
        .node_and_fill("table_body", Attrs::new(), prefix)
        .unwrap();

    assert_eq!(unchecked.content.len(), 1);
    assert_eq!(filled.content.len(), 3);
    assert!(unchecked.check(&schema).is_err());
    assert!(filled.check(&schema).is_ok());
}

#[test]
fn attribute_defaults_and_unknown_keys() {
    let schema = table_schema();
    let cell = schema
        .node(
            "table_cell",
            attrs([("colspan", json!(3)), ("bogus", json!(true))]),
            vec![],
            vec![],
        )
        .unwrap();
    assert_eq!(cell.attrs.get("colspan"), Some(&json!(3)));
    assert_eq!(cell.attrs.get("celltype"), Some(&json!("td")));
    assert_eq!(cell.attrs.get("rowspan"), Some(&json!(1)));
    assert_eq!(cell.attrs.get("bogus"), None);
}

#[test]
fn missing_required_attributes_fail_on_both_paths() {
    let schema = table_schema();
    let unchecked = schema.node("image", Attrs::new(), vec![], vec![]);
    assert!(matches!(
        unchecked.unwrap_err(),
        SchemaError::MissingAttr { ref name, ref attr } if name == "image" && attr == "src"
    ));
    let filled = schema.node_and_fill("image", Attrs::new(), vec![]);
    assert!(matches!(filled.unwrap_err(), SchemaError::MissingAttr { .. }));

    let image = schema
        .node("image", attrs([("src", json!("pic.png"))]), vec![], vec![])
        .unwrap();
    assert_eq!(image.attrs.get("src"), Some(&json!("pic.png")));
}

#[test]
fn unknown_types_fail_on_both_paths() {
    let schema = table_schema();
    assert!(matches!(
        schema.node("flex", Attrs::new(), vec![], vec![]).unwrap_err(),
        SchemaError::UnknownNodeType(ref name) if name == "flex"
    ));
    assert!(schema.node_and_fill("flex", Attrs::new(), vec![]).is_err());
}

#[test]
fn compiled_types_expose_their_declared_metadata() {
    let schema = Schema::compile(
        SchemaSpec::new()
            .with_node("doc", NodeSpec::new().with_content("block+"))
            .with_node(
                "heading",
                NodeSpec::new()
                    .with_content("inline*")
                    .with_group("block")
                    .defining(),
            )
            .with_node("text", NodeSpec::new().with_group("inline"))
            .with_mark("link", MarkSpec::new().with_inclusive(false))
            .with_mark("bold", MarkSpec::new()),
    )
    .unwrap();

    let doc = schema.node_type("doc").unwrap();
    let heading = schema.node_type("heading").unwrap();
    assert_eq!(doc.index(), 0);
    assert_eq!(heading.index(), 1);
    assert!(heading.is_defining());
    assert!(!doc.is_defining());
    assert_eq!(heading.groups(), ["block"]);

    // Marks rank in declaration order, inclusivity defaults to true.
    let link = schema.mark_type("link").unwrap();
    let bold = schema.mark_type("bold").unwrap();
    assert!(link.rank() < bold.rank());
    assert!(!link.is_inclusive());
    assert!(bold.is_inclusive());
}

#[test]
fn valid_content_is_observational() {
    let schema = table_schema();
    let body = schema
        .node_and_fill("table_body", Attrs::new(), vec![])
        .unwrap();
    let colgroup = schema
        .node_and_fill("table_colgroup", Attrs::new(), vec![])
        .unwrap();

    assert!(schema.valid_content("table", &[body.clone()]).unwrap());
    assert!(schema
        .valid_content("table", &[colgroup.clone(), body.clone()])
        .unwrap());
    assert!(!schema.valid_content("table", &[colgroup.clone()]).unwrap());
    assert!(!schema
        .valid_content("table", &[body.clone(), body.clone()]).unwrap());
    assert!(!schema
        .valid_content("table", &[row_with_cells(&schema, 1)]).unwrap());
}
