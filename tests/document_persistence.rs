use eframe_shapes::storage::FileStorage;
use eframe_shapes::{
    EditorConfig, EditorContext, EditorError, ElementKey, Geometry, KeyValueStorage,
    MemoryStorage, Shape, ShapeKind, StoreError,
};
use egui::{Pos2, pos2};

fn draw(editor: &mut EditorContext, kind: ShapeKind, from: Pos2, to: Pos2) {
    editor.choose_shape(kind).unwrap();
    editor.pointer_down(from).unwrap();
    editor.pointer_move(to).unwrap();
    editor.pointer_up(to).unwrap();
}

/// Editor with three shapes, one of them restyled and moved
fn populated(storage: &MemoryStorage) -> EditorContext {
    let mut editor = EditorContext::new(EditorConfig::default(), Box::new(storage.clone()));
    draw(&mut editor, ShapeKind::Rectangle, pos2(10.0, 10.0), pos2(110.0, 60.0));
    draw(&mut editor, ShapeKind::Polygon, pos2(200.0, 200.0), pos2(260.0, 240.0));
    draw(&mut editor, ShapeKind::Path, pos2(300.0, 10.0), pos2(340.0, 50.0));

    editor.pointer_down(pos2(20.0, 20.0)).unwrap();
    editor.pointer_move(pos2(30.0, 25.0)).unwrap();
    editor.pointer_up(pos2(30.0, 25.0)).unwrap();
    editor.set_fill("#ff0000").unwrap();
    editor
}

fn stored(storage: &MemoryStorage) -> Vec<Shape> {
    serde_json::from_str(&storage.get("shapes").unwrap()).unwrap()
}

#[test]
fn test_round_trip_preserves_records_and_rendering() {
    let storage = MemoryStorage::new();
    let editor = populated(&storage);

    let reloaded = EditorContext::new(EditorConfig::default(), Box::new(storage.clone()));

    assert_eq!(reloaded.store().shapes(), editor.store().shapes());
    let before: Vec<_> = editor.surface().shape_elements().cloned().collect();
    let after: Vec<_> = reloaded.surface().shape_elements().cloned().collect();
    assert_eq!(before, after);
    assert_eq!(
        reloaded.store().get(1).unwrap().transform.as_deref(),
        Some("translate(10, 5)")
    );
}

#[test]
fn test_restyle_touches_one_record_and_its_element() {
    let storage = MemoryStorage::new();
    let mut editor = populated(&storage);
    let before = stored(&storage);

    editor.select(2).unwrap();
    editor.set_stroke("#00ff00").unwrap();
    editor.set_stroke_width(4.0).unwrap();

    let after = stored(&storage);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(after[1].style.stroke, "#00ff00");
    assert_eq!(after[1].style.stroke_width, 4.0);
    assert_eq!(after[1].geometry, before[1].geometry);

    let element = editor.surface().element(ElementKey::Shape(2)).unwrap();
    assert_eq!(element.attributes.text("stroke"), Some("#00ff00"));
    assert_eq!(element.attributes.number("stroke-width"), Some(4.0));
    let untouched = editor.surface().element(ElementKey::Shape(3)).unwrap();
    assert_eq!(untouched.attributes.text("stroke"), Some("black"));
}

#[test]
fn test_undo_is_idempotent_and_rerenders_the_rest() {
    let storage = MemoryStorage::new();
    let mut editor = populated(&storage);
    let remaining: Vec<_> = editor
        .surface()
        .shape_elements()
        .filter(|e| e.key != ElementKey::Shape(3))
        .cloned()
        .collect();

    assert_eq!(editor.undo().unwrap(), Some(3));
    let rendered: Vec<_> = editor.surface().shape_elements().cloned().collect();
    assert_eq!(rendered, remaining);
    assert_eq!(stored(&storage).len(), 2);

    editor.undo().unwrap();
    editor.undo().unwrap();
    assert_eq!(editor.undo().unwrap(), None);
    assert_eq!(editor.undo().unwrap(), None);
    assert!(editor.store().is_empty());
}

#[test]
fn test_clear_then_reload_is_empty() {
    let storage = MemoryStorage::new();
    let mut editor = populated(&storage);

    editor.clear().unwrap();

    assert!(editor.surface().elements().is_empty());
    assert!(!storage.contains("shapes"));
    let reloaded = EditorContext::new(EditorConfig::default(), Box::new(storage));
    assert!(reloaded.store().is_empty());
    assert!(reloaded.surface().elements().is_empty());
}

#[test]
fn test_delete_of_a_vanished_shape_fails_loudly() {
    let storage = MemoryStorage::new();
    let mut editor = populated(&storage);
    editor.select(2).unwrap();

    // Another writer removed the record behind the editor's back
    let mut other = storage.clone();
    let remaining: Vec<Shape> = stored(&storage).into_iter().filter(|s| s.id != 2).collect();
    other.set("shapes", &serde_json::to_string(&remaining).unwrap()).unwrap();
    editor.reload(Box::new(storage.clone()));

    assert!(editor.select(2).is_err());
    assert!(editor.delete_selected().is_err());
}

#[test]
fn test_records_from_older_sessions_load() {
    let mut storage = MemoryStorage::new();
    storage
        .set(
            "shapes",
            r#"[{"type":"circle","id":"1","cx":"50","cy":"50","r":"20","fill":"blue","display":"inline-block"},
                {"type":"text","id":2,"x":5,"y":30,"text":"hello"}]"#,
        )
        .unwrap();

    let mut editor = EditorContext::new(EditorConfig::default(), Box::new(storage));

    assert_eq!(editor.store().len(), 2);
    assert_eq!(editor.store().get(1).unwrap().style.fill, "blue");
    assert!(editor.surface().contains(ElementKey::Shape(2)));
    // Text can be selected and restyled like any other shape
    editor.select(2).unwrap();
    editor.set_fill("red").unwrap();
    draw(&mut editor, ShapeKind::Line, pos2(0.0, 0.0), pos2(10.0, 10.0));
    assert_eq!(editor.store().shapes().last().unwrap().id, 3);
}

#[test]
fn test_drag_objects_in_start_coordinates_read_as_origin() {
    let mut storage = MemoryStorage::new();
    let drag = r#"{"width":100,"height":50,"startPosition":{"x":10,"y":10},"endPosition":{"x":110,"y":60}}"#;
    storage
        .set(
            "shapes",
            &format!(
                r#"[{{"type":"circle","id":1,"cx":"40","cy":"40","r":"12","fill":"black"}},
                    {{"type":"rectangle","id":2,"x":{drag},"width":"100","height":"50"}},
                    {{"type":"line","id":3,"x1":{drag},"x2":"110","y2":"60"}},
                    {{"type":"line","id":4,"x2":"10"}}]"#
            ),
        )
        .unwrap();

    let editor = EditorContext::new(EditorConfig::default(), Box::new(storage));

    // The readable circle survives alongside the old-style records
    let ids: Vec<_> = editor.store().iter().map(|shape| shape.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(
        editor.store().get(2).unwrap().geometry,
        Geometry::Rectangle { x: 0.0, y: 0.0, width: 100.0, height: 50.0 }
    );
    assert_eq!(
        editor.store().get(3).unwrap().geometry,
        Geometry::Line { x1: 0.0, y1: 0.0, x2: 110.0, y2: 60.0 }
    );
    assert_eq!(editor.store().get(3).unwrap().style.stroke, "black");
    assert!(editor.surface().contains(ElementKey::Shape(3)));
}

#[test]
fn test_exhausted_ids_fail_the_draw_without_panicking() {
    let mut storage = MemoryStorage::new();
    storage
        .set("shapes", r#"[{"type":"circle","id":18446744073709551615,"cx":5,"cy":5,"r":2}]"#)
        .unwrap();
    let mut editor = EditorContext::new(EditorConfig::default(), Box::new(storage.clone()));
    assert_eq!(editor.store().get(u64::MAX).map(|s| s.id), Some(u64::MAX));

    editor.choose_shape(ShapeKind::Rectangle).unwrap();
    editor.pointer_down(pos2(100.0, 100.0)).unwrap();
    editor.pointer_move(pos2(150.0, 150.0)).unwrap();
    let result = editor.pointer_up(pos2(150.0, 150.0));

    assert!(matches!(
        result,
        Err(EditorError::Store(StoreError::IdsExhausted(u64::MAX)))
    ));
    assert_eq!(editor.store().len(), 1);
    assert!(!editor.surface().contains(ElementKey::Preview));
    assert_eq!(stored(&storage).len(), 1);
}

#[test]
fn test_file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let storage = FileStorage::new(dir.path()).unwrap();
        let mut editor = EditorContext::new(EditorConfig::default(), Box::new(storage));
        draw(&mut editor, ShapeKind::Rectangle, pos2(0.0, 0.0), pos2(10.0, 10.0));
        draw(&mut editor, ShapeKind::Line, pos2(0.0, 0.0), pos2(10.0, 10.0));
        editor.undo().unwrap();
    }

    let storage = FileStorage::new(dir.path()).unwrap();
    let editor = EditorContext::new(EditorConfig::default(), Box::new(storage));
    assert_eq!(editor.store().len(), 1);
    assert_eq!(editor.store().get(1).unwrap().kind(), ShapeKind::Rectangle);
}
