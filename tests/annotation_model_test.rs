/*!
 * Annotation Model Integration Tests
 *
 * Reconciler/UI style concurrency against a shared annotation model
 */

use annotation_map::{
    Annotation, AnnotationKey, AnnotationMap, AnnotationModel, LockDomain, MapConfig, ModelError,
    Position, StoreError, Synchronizable,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn diagnostics(count: usize, kind: &str) -> Vec<(AnnotationKey, Position)> {
    (0..count)
        .map(|i| {
            let key = Annotation::new(kind).with_text(&format!("problem {}", i)).into_key();
            (key, Position::new(i * 10, 5))
        })
        .collect()
}

#[test]
fn test_annotation_map_identity_semantics() {
    let map = AnnotationMap::new(10);
    let a = Annotation::new("error").with_text("same").into_key();
    let b = Annotation::new("error").with_text("same").into_key();

    map.insert(a.clone(), Position::new(0, 1));
    map.insert(b.clone(), Position::new(5, 1));
    map.insert(a.clone(), Position::new(2, 1));

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&a), Some(Position::new(2, 1)));
    assert_eq!(map.get(&b), Some(Position::new(5, 1)));
    assert!(map.contains_value(&Position::new(5, 1)));

    let kinds: Vec<_> = map.key_snapshot().map(|k| k.kind().to_string()).collect();
    assert_eq!(kinds, vec!["error", "error"]);
}

#[test]
fn test_reconciler_replacements_are_atomic_for_readers() {
    const ROUNDS: usize = 200;
    const PER_ROUND: usize = 20;

    let model = Arc::new(AnnotationModel::with_config(
        1_000,
        &MapConfig::reconciler(),
    ));
    model.replace_annotations(&[], diagnostics(PER_ROUND, "error")).unwrap();

    let done = Arc::new(AtomicBool::new(false));

    let reconciler = {
        let model = Arc::clone(&model);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for round in 0..ROUNDS {
                let stale: Vec<_> = model.annotations().into_iter().map(|(k, _)| k).collect();
                let kind = if round % 2 == 0 { "warning" } else { "error" };
                model
                    .replace_annotations(&stale, diagnostics(PER_ROUND, kind))
                    .unwrap();
            }
            done.store(true, Ordering::Release);
        })
    };

    // The UI side must always see one complete generation of diagnostics.
    while !done.load(Ordering::Acquire) {
        let snapshot = model.annotations();
        assert_eq!(snapshot.len(), PER_ROUND);

        let first_kind = snapshot[0].0.kind().to_string();
        assert!(snapshot.iter().all(|(k, _)| k.kind() == first_kind));

        let visible = model.annotations_in_range(0, 1_000, true, true);
        assert_eq!(visible.len(), PER_ROUND);
    }

    reconciler.join().unwrap();
    assert_eq!(model.len(), PER_ROUND);
    assert_eq!(model.annotations().len(), PER_ROUND);
    assert_eq!(model.stats().lock_timeouts, 0);
}

#[test]
fn test_external_domain_spans_document_and_model() {
    let domain = LockDomain::named("document");
    let model = Arc::new(AnnotationModel::new(100));
    model.set_lock_domain(Some(domain.clone()));

    let text = Arc::new(parking_lot::Mutex::new(String::from("x").repeat(100)));

    // Editing thread: truncate the text and the model as one step
    let editor = {
        let model = Arc::clone(&model);
        let text = Arc::clone(&text);
        let domain = domain.clone();
        thread::spawn(move || {
            for _ in 0..50 {
                let _held = domain.lock();
                let mut text = text.lock();
                let new_len = text.len() - 1;
                text.truncate(new_len);
                model.set_document_length(new_len);
            }
        })
    };

    for _ in 0..50 {
        let _held = domain.lock();
        assert_eq!(text.lock().len(), model.document_length());
    }

    editor.join().unwrap();
    assert_eq!(model.document_length(), 50);
}

#[test]
fn test_bad_location_converts_to_store_error() {
    let model = AnnotationModel::new(5);
    let result: Result<bool, StoreError> = model
        .add_annotation(Annotation::default().into_key(), Position::new(3, 3))
        .map_err(StoreError::from);

    match result {
        Err(StoreError::Model(ModelError::BadLocation { document_length, .. })) => {
            assert_eq!(document_length, 5)
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_concurrent_adds_from_many_threads() {
    let model = Arc::new(AnnotationModel::new(10_000));
    let mut handles = vec![];

    for t in 0..8 {
        let model = Arc::clone(&model);
        handles.push(thread::spawn(move || {
            let mut keys = vec![];
            for i in 0..100 {
                let key = Annotation::new("task").into_key();
                let offset = (t * 100 + i) * 10;
                assert_eq!(model.add_annotation(key.clone(), Position::new(offset, 3)), Ok(true));
                keys.push(key);
            }
            keys
        }));
    }

    let keys: Vec<AnnotationKey> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(model.len(), 800);
    let ordered = model.annotations();
    assert!(ordered
        .windows(2)
        .all(|pair| pair[0].1.offset <= pair[1].1.offset));

    for key in keys.iter().take(400) {
        assert!(model.remove_annotation(key).is_some());
    }
    assert_eq!(model.len(), 400);
    assert_eq!(model.annotations().len(), 400);
}
