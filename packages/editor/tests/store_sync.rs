//! Persistence round-trips and the debounced autosave.

use std::sync::Arc;
use std::time::{Duration, Instant};

use vellum_editor::{
    clear_document, editor_schema, insert_broken_table, insert_filled_table, EditorState,
    FileStorage, MemoryStorage, Storage, Store, StoreError, SyncDebouncer, ViewProvider,
    STORAGE_KEY,
};

fn fresh_view() -> ViewProvider {
    let schema = Arc::new(editor_schema().unwrap());
    ViewProvider::new(EditorState::new(schema).unwrap())
}

#[test]
fn sync_then_load_round_trips_the_state() {
    let mut store = Store::new(MemoryStorage::new());
    let mut view = fresh_view();
    view.exec_command(insert_broken_table).unwrap();
    store.sync(&view).unwrap();

    let expected = view.state_to_json().unwrap();
    assert_eq!(store.load().unwrap(), Some(&expected));

    let mut restored = fresh_view();
    store.attach(&mut restored).unwrap();
    assert_eq!(restored.state().doc, view.state().doc);

    // The invalid structure came back byte for byte; hydration does
    // not validate any more than construction did.
    let schema = restored.state().schema.clone();
    assert!(restored.state().doc.check(&schema).is_err());
}

#[test]
fn file_sessions_pick_up_where_the_last_left_off() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store");

    {
        let mut store = Store::new(FileStorage::new(&path).unwrap());
        assert!(store.load().unwrap().is_none());
        let mut view = fresh_view();
        store.attach(&mut view).unwrap();
        view.exec_command(insert_filled_table).unwrap();
        store.sync(&view).unwrap();
    }

    let mut store = Store::new(FileStorage::new(&path).unwrap());
    assert!(store.load().unwrap().is_some());
    let mut view = fresh_view();
    store.attach(&mut view).unwrap();
    assert_eq!(
        view.state().doc.describe(),
        "doc(table(table_body(table_row(table_cell), \
         table_row(table_cell), table_row(table_cell))), paragraph)"
    );
}

#[test]
fn corrupt_stored_state_is_a_load_error() {
    let mut storage = MemoryStorage::new();
    storage.write(STORAGE_KEY, "{\"doc\": [oops").unwrap();
    let mut store = Store::new(storage);
    assert!(matches!(store.load().unwrap_err(), StoreError::Corrupt(_)));
}

#[test]
fn edits_inside_the_window_collapse_into_one_write() {
    let mut store = Store::new(MemoryStorage::new());
    let mut view = fresh_view();
    let mut debouncer = SyncDebouncer::new(Duration::from_millis(500));
    let start = Instant::now();

    view.exec_command(insert_broken_table).unwrap();
    debouncer.schedule(start);
    view.exec_command(insert_filled_table).unwrap();
    debouncer.schedule(start + Duration::from_millis(200));
    view.exec_command(clear_document).unwrap();
    debouncer.schedule(start + Duration::from_millis(400));

    // Quiet since the third edit only; earlier deadlines are gone.
    assert!(!debouncer.poll(start + Duration::from_millis(850)));
    assert!(debouncer.poll(start + Duration::from_millis(900)));
    store.sync(&view).unwrap();

    assert_eq!(store.storage().write_count(), 1);

    // What got written is the final state, not an intermediate one.
    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.doc["type"], "doc");
    assert!(loaded.doc.get("content").is_none());
}

#[test]
fn edits_in_separate_windows_write_separately() {
    let mut store = Store::new(MemoryStorage::new());
    let mut view = fresh_view();
    let mut debouncer = SyncDebouncer::new(Duration::from_millis(500));
    let start = Instant::now();

    view.exec_command(insert_filled_table).unwrap();
    debouncer.schedule(start);
    assert!(debouncer.poll(start + Duration::from_millis(600)));
    store.sync(&view).unwrap();

    view.exec_command(clear_document).unwrap();
    debouncer.schedule(start + Duration::from_millis(1_000));
    assert!(debouncer.poll(start + Duration::from_millis(1_600)));
    store.sync(&view).unwrap();

    assert_eq!(store.storage().write_count(), 2);
}
