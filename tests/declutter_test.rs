use std::sync::Arc;
use torchmap::animation::clock::SteppedClock;
use torchmap::core::bounds::{Edge, ViewportPadding};
use torchmap::core::config::{DeclutterConfig, EngineConfig};
use torchmap::data::venue::load_venues;
use torchmap::layers::marker::Placement;
use torchmap::{
    CameraState, CanvasHandle, EngineBuilder, HeadlessCanvas, LatLng, LatLngBounds, MapEngine,
    MapEvent, MarkerRecord,
};

fn unpadded() -> EngineConfig {
    EngineConfig {
        declutter: DeclutterConfig {
            padding: ViewportPadding::none(),
            ..DeclutterConfig::default()
        },
        ..EngineConfig::default()
    }
}

fn square_view(zoom: f64) -> HeadlessCanvas {
    HeadlessCanvas::new(CameraState::new(LatLng::new(5.0, 5.0), zoom, 0.0, 0.0))
        .with_bounds(LatLngBounds::from_coords(0.0, 0.0, 10.0, 10.0))
}

fn build(headless: &HeadlessCanvas, config: EngineConfig, markers: Vec<MarkerRecord>) -> MapEngine {
    let mut builder = EngineBuilder::new(CanvasHandle::new(headless.clone()))
        .with_config(config)
        .with_clock(Arc::new(SteppedClock::new(16.0)));
    for marker in markers {
        builder = builder.with_marker(marker);
    }
    builder.build().unwrap()
}

#[test]
fn test_east_marker_projects_onto_east_edge() {
    let headless = square_view(8.0);
    let engine = build(
        &headless,
        unpadded(),
        vec![MarkerRecord::new("east", LatLng::new(5.0, 20.0))],
    );

    // placed when the engine is built
    assert_eq!(engine.evaluate_markers().unwrap(), 0);

    let marker = engine.marker("east").unwrap().unwrap();
    assert_eq!(marker.placement, Placement::Edge(Edge::East));
    assert!((marker.position.lng - 10.0).abs() < 1e-9);
    assert!(marker.position.lat > 0.0 && marker.position.lat < 10.0);
    assert!(marker.direction_hint.abs() < 2.0);

    let update = headless.snapshot().markers["east"].clone();
    assert!(update.visible);
    assert_eq!(update.position, marker.position);
}

#[test]
fn test_unchanged_view_evaluates_identically() {
    let headless = square_view(6.0);
    let engine = build(
        &headless,
        EngineConfig::default(),
        vec![
            MarkerRecord::new("north", LatLng::new(30.0, 4.0)),
            MarkerRecord::new("pacific", LatLng::new(-17.535, -149.569595)),
            MarkerRecord::new("inside", LatLng::new(4.0, 6.0)),
        ],
    );

    engine.evaluate_markers().unwrap();
    let first = engine.markers().unwrap();
    assert_eq!(engine.evaluate_markers().unwrap(), 0);
    assert_eq!(engine.markers().unwrap(), first);
}

#[test]
fn test_visible_markers_are_inside_view_above_threshold() {
    let headless = square_view(8.0);
    let config = EngineConfig::default();
    let padding = config.declutter.padding;
    let engine = build(
        &headless,
        config,
        vec![
            MarkerRecord::new("center", LatLng::new(5.0, 5.0)),
            MarkerRecord::new("margin", LatLng::new(9.5, 9.5)),
            MarkerRecord::new("west", LatLng::new(5.0, 0.5)),
            MarkerRecord::new("far", LatLng::new(40.0, 40.0)),
        ],
    );
    engine.evaluate_markers().unwrap();
    assert!(engine.marker("far").unwrap().unwrap().visible);

    // zoom gesture past the threshold, ending in a move-end
    headless.simulate_zoom(12.0);
    engine
        .handle_event(&MapEvent::MoveEnd {
            center: LatLng::new(5.0, 5.0),
            zoom: 12.0,
        })
        .unwrap();

    let viewport = torchmap::core::bounds::PaddedViewport::new(
        &LatLngBounds::from_coords(0.0, 0.0, 10.0, 10.0),
        &padding,
    );
    let markers = engine.markers().unwrap();
    assert!(markers.iter().any(|m| m.visible));
    for marker in markers.iter().filter(|m| m.visible) {
        assert!(viewport.contains(&marker.coordinate), "{} leaked", marker.id);
    }
    // the extra west padding pushes this one out
    assert!(!engine.marker("west").unwrap().unwrap().visible);
}

#[test]
fn test_venue_dataset_skips_bad_locations() {
    let venues = load_venues(
        r#"[
            { "slug": "velodrome", "name": "Marseille Stadium", "sports": ["football"], "location": { "longitude": 5.3959, "latitude": 43.2698 } },
            { "slug": "teahupoo", "name": "Teahupo'o", "sports": ["surfing"], "location": { "longitude": -149.2667, "latitude": -17.8667 } },
            { "slug": "broken", "name": "Broken", "location": { "longitude": 512.0, "latitude": 43.0 } },
            { "slug": "partial", "name": "Partial", "location": { "latitude": 43.0 } }
        ]"#,
    )
    .unwrap();

    let headless = HeadlessCanvas::new(CameraState::new(LatLng::new(46.6, 2.2), 5.0, 0.0, 0.0));
    let engine = EngineBuilder::new(CanvasHandle::new(headless))
        .with_clock(Arc::new(SteppedClock::new(16.0)))
        .with_venues(&venues)
        .build()
        .unwrap();

    let ids: Vec<String> = engine.markers().unwrap().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["velodrome", "teahupoo"]);

    engine.evaluate_markers().unwrap();
    let teahupoo = engine.marker("teahupoo").unwrap().unwrap();
    assert!(teahupoo.visible);
    assert!(matches!(teahupoo.placement, Placement::Edge(_)));
}
