//! The demonstration end to end: one store, two sessions, the three
//! panel actions, and the check that finally notices what unchecked
//! construction let in.

use std::sync::Arc;

use serde_json::Value;

use vellum_editor::{
    clear_document, editor_schema, insert_broken_table, insert_filled_table, EditorState,
    MemoryStorage, Store, ViewProvider,
};
use vellum_model::{attrs, Attrs};

#[test]
fn the_broken_table_survives_a_full_session_cycle() {
    let schema = Arc::new(editor_schema().unwrap());

    // Session one: nothing stored, so the view starts on the filled
    // default document.
    let mut store = Store::new(MemoryStorage::new());
    assert!(store.load().unwrap().is_none());
    let mut view = ViewProvider::new(EditorState::new(schema.clone()).unwrap());
    store.attach(&mut view).unwrap();
    assert_eq!(view.state().doc.describe(), "doc(paragraph)");

    assert!(view.exec_command(insert_broken_table).unwrap());
    store.sync(&view).unwrap();

    // Session two: hydration brings the invalid structure back
    // exactly as it was dispatched.
    assert!(store.load().unwrap().is_some());
    let mut second = ViewProvider::new(EditorState::new(schema.clone()).unwrap());
    store.attach(&mut second).unwrap();

    let doc = &second.state().doc;
    assert_eq!(doc.content[0].name, "table");
    assert_eq!(doc.content[0].content.len(), 4);
    assert!(doc.content[0]
        .content
        .iter()
        .all(|child| child.name == "table_row"));

    // Only an explicit check notices the missing table_body.
    let violations = doc.violations(&schema);
    assert!(violations.iter().any(|violation| violation.at == "doc/table[0]"));

    // The filled variant drops a valid table next to the broken one.
    assert!(second.exec_command(insert_filled_table).unwrap());
    let doc = &second.state().doc;
    assert_eq!(doc.content[0].describe(), "table(table_body(table_row(table_cell), table_row(table_cell), table_row(table_cell)))");
    assert_eq!(doc.content[1].name, "table");
    let violations = second.state().doc.violations(&schema);
    assert!(!violations
        .iter()
        .any(|violation| violation.at.starts_with("doc/table[0]")));
    assert!(violations.iter().any(|violation| violation.at == "doc/table[1]"));

    // Reset empties the document entirely.
    assert!(second.exec_command(clear_document).unwrap());
    assert_eq!(second.state().doc.describe(), "doc");
    store.sync(&second).unwrap();
    let stored = store.load().unwrap().unwrap();
    assert!(stored.doc.get("content").is_none());
}

#[test]
fn body_construction_paths_diverge_on_the_same_input() {
    let schema = editor_schema().unwrap();
    let marked_cell = schema
        .node(
            "table_cell",
            Attrs::new(),
            vec![schema.text("X").unwrap()],
            vec![],
        )
        .unwrap();
    let supplied_row = schema
        .node("table_row", Attrs::new(), vec![marked_cell], vec![])
        .unwrap();

    // Fill with no prefix settles on the minimum the expression
    // allows: exactly three rows.
    let filled = schema
        .node_and_fill("table_body", Attrs::new(), vec![])
        .unwrap();
    assert_eq!(filled.content.len(), 3);
    assert!(filled.check(&schema).is_ok());

    // Fill keeps a supplied row first and tops up around it.
    let topped_up = schema
        .node_and_fill("table_body", Attrs::new(), vec![supplied_row.clone()])
        .unwrap();
    assert_eq!(topped_up.content.len(), 3);
    assert_eq!(topped_up.content[0], supplied_row);

    // Unchecked construction takes one row as-is and reports nothing.
    let unchecked = schema
        .node("table_body", Attrs::new(), vec![supplied_row.clone()], vec![])
        .unwrap();
    assert_eq!(unchecked.content.len(), 1);
    assert!(!schema
        .valid_content("table_body", &unchecked.content)
        .unwrap());
}

#[test]
fn hydration_rejects_what_no_schema_type_explains() {
    let schema = Arc::new(editor_schema().unwrap());
    let mut view = ViewProvider::new(EditorState::new(schema).unwrap());
    let before = view.state().doc.clone();

    let alien = vellum_editor::SerializedState {
        doc: serde_json::json!({
            "type": "doc",
            "content": [{ "type": "sidebar" }]
        }),
    };
    assert!(view.hydrate_state_from_json(&alien).is_err());

    // A failed hydration leaves the current state alone.
    assert_eq!(view.state().doc, before);
}

#[test]
fn attribute_defaults_flow_through_every_path() {
    let schema = editor_schema().unwrap();

    let built = schema
        .node("table_cell", Attrs::new(), vec![], vec![])
        .unwrap();
    assert_eq!(built.attrs.get("celltype"), Some(&Value::from("td")));
    assert_eq!(built.attrs.get("colspan"), Some(&Value::from(1)));

    let filled = schema
        .node_and_fill("table_col", attrs([("width", Value::from("80"))]), vec![])
        .unwrap();
    assert_eq!(filled.attrs.get("width"), Some(&Value::from("80")));

    let hydrated = schema
        .node_from_value(&serde_json::json!({ "type": "table_cell" }))
        .unwrap();
    assert_eq!(hydrated, built);
}
