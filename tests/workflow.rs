// Store, persistence and distance working together through the public API
use geomark::codec::{self, LoadPolicy};
use geomark::{distance, AddOutcome, DuplicatePolicy, Marker, MarkerStore, Resolution};

fn trip() -> Vec<Marker> {
    vec![
        Marker::new("Paris", 48.8566, 2.3522).unwrap(),
        Marker::new("London", 51.5074, -0.1278).unwrap(),
        Marker::new("Brussels", 50.8503, 4.3517).unwrap(),
    ]
}

#[test]
fn test_batch_edit_save_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trip.json");

    let mut store = MarkerStore::new();
    let outcome = store.add_batch(trip(), DuplicatePolicy::Skip);
    assert_eq!(outcome.added, 3);
    assert!(store.rename("Brussels", "BRU"));
    assert!(store.remove("London").is_some());

    codec::save_json(&path, store.markers()).unwrap();
    let reloaded = codec::load_json(&path, LoadPolicy::Strict).unwrap();
    assert_eq!(reloaded.markers, store.markers());

    let labels: Vec<_> = reloaded.markers.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["Paris", "BRU"]);
}

#[test]
fn test_undo_whole_batch_then_redo() {
    let mut store = MarkerStore::new();
    store.add(Marker::new("Home", 0.0, 0.0).unwrap(), DuplicatePolicy::Skip);
    store.add_batch(trip(), DuplicatePolicy::Skip);
    let before = distance::total_distance(store.markers()).unwrap();

    assert!(store.undo());
    assert_eq!(store.len(), 1);
    assert!(distance::total_distance(store.markers()).is_err());

    assert!(store.redo());
    assert_eq!(store.len(), 4);
    assert_eq!(distance::total_distance(store.markers()).unwrap(), before);
    assert!(!store.redo());
}

#[test]
fn test_deferred_duplicate_resolution() {
    let mut store = MarkerStore::from_markers(trip());
    let again = Marker::new("Paris", 48.85661, 2.35221).unwrap();

    let pending = match store.add(again, DuplicatePolicy::DeferToCaller) {
        AddOutcome::Pending(pending) => pending,
        other => panic!("expected a pending duplicate, got {:?}", other),
    };
    assert_eq!(store.len(), 3);

    assert_eq!(store.resolve(pending, Resolution::Overwrite), AddOutcome::Overwritten);
    assert_eq!(store.len(), 3);
    assert_eq!(store.find("Paris").unwrap().location.latitude, 48.85661);
}

#[test]
fn test_kml_export_follows_store_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trip.kml");
    let store = MarkerStore::from_markers(trip());

    codec::export_kml(&path, store.markers()).unwrap();
    let kml = std::fs::read_to_string(&path).unwrap();

    let paris = kml.find("<name>Paris</name>").unwrap();
    let london = kml.find("<name>London</name>").unwrap();
    let brussels = kml.find("<name>Brussels</name>").unwrap();
    assert!(paris < london && london < brussels);
}
