//! Marker decluttering against a padded viewport.
//!
//! Markers inside the padded viewport are drawn where they are. At low zoom,
//! markers outside it are slid along the ray from the view center until they
//! hit a viewport edge and carry an arrow pointing toward the venue. Above the
//! zoom threshold they are hidden instead.

use crate::core::bounds::{Edge, PaddedViewport};
use crate::core::config::DeclutterConfig;
use crate::core::geo::{LatLng, LatLngBounds};
use crate::layers::marker::{MarkerRecord, MarkerRegistry, MarkerUpdate, Placement};
use crate::{Error, Result};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo_types::Line;

/// Markers south of the equator while the view is centered north of it.
///
/// Their compass bearing is tripled before becoming an arrow angle. This
/// compensates for the long north-south distortion of the southern overseas
/// territories in the venue dataset; it is not general geometry.
pub fn crosses_hemisphere(marker: &LatLng, center: &LatLng) -> bool {
    marker.lat < 0.0 && center.lat > 0.0
}

/// Converts a compass bearing (clockwise from north) to a screen angle
/// (counter-clockwise from east) in (-180, 180]
pub fn screen_angle(compass_bearing: f64) -> f64 {
    crate::animation::path::normalize_angle(90.0 - compass_bearing)
}

/// Owns the marker registry and recomputes placement on camera changes
#[derive(Debug, Clone)]
pub struct DeclutterEngine {
    registry: MarkerRegistry,
    config: DeclutterConfig,
}

impl DeclutterEngine {
    pub fn new(registry: MarkerRegistry, config: DeclutterConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &DeclutterConfig {
        &self.config
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    /// Pads raw canvas bounds with the configured per-edge fractions
    pub fn padded(&self, bounds: &LatLngBounds) -> PaddedViewport {
        PaddedViewport::new(bounds, &self.config.padding)
    }

    /// Recomputes every unpinned marker and returns updates for the ones that changed
    pub fn evaluate(
        &mut self,
        viewport: &PaddedViewport,
        zoom: f64,
        previous_zoom: f64,
    ) -> Vec<MarkerUpdate> {
        let threshold = self.config.zoom_threshold;
        let clamp_to_edges = zoom <= threshold;
        // Crossing the threshold needs no branch of its own: every pass
        // hides outside markers above it and edge-projects them below it.
        if clamp_to_edges != (previous_zoom <= threshold) {
            log::debug!(
                "zoom crossed declutter threshold {} ({} -> {})",
                threshold,
                previous_zoom,
                zoom
            );
        }

        let hemisphere_correction = self.config.hemisphere_correction;
        let fade_ms = self.config.fade_ms;
        let mut updates = Vec::new();

        for marker in self.registry.iter_mut().filter(|m| !m.pinned) {
            let before = marker.clone();

            if viewport.contains(&marker.coordinate) {
                marker.position = marker.coordinate;
                marker.visible = true;
                marker.direction_hint = 0.0;
                marker.placement = Placement::Exact;
            } else if clamp_to_edges {
                match project_to_edge(viewport, &marker.coordinate) {
                    Some((edge, position)) => {
                        let mut bearing = viewport.center.bearing_to(&marker.coordinate);
                        if hemisphere_correction
                            && crosses_hemisphere(&marker.coordinate, &viewport.center)
                        {
                            bearing *= 3.0;
                        }
                        marker.position = position;
                        marker.visible = true;
                        marker.direction_hint = screen_angle(bearing);
                        marker.placement = Placement::Edge(edge);
                    }
                    None => {
                        log::warn!(
                            "no viewport edge intersection for marker '{}' at {:?}, keeping last position",
                            marker.id,
                            marker.coordinate
                        );
                    }
                }
            } else {
                marker.visible = false;
            }

            if *marker != before {
                let fade = if marker.visible != before.visible {
                    fade_ms
                } else {
                    0
                };
                updates.push(marker.to_update(fade));
            }
        }

        updates
    }

    /// First placement: evaluates every unpinned marker and returns an
    /// update for each registered marker, changed or not
    pub fn place_all(&mut self, viewport: &PaddedViewport, zoom: f64) -> Vec<MarkerUpdate> {
        self.evaluate(viewport, zoom, zoom);
        self.registry.iter().map(|marker| marker.to_update(0)).collect()
    }

    pub fn pin(&mut self, id: &str) -> Result<()> {
        self.set_pinned(id, true)
    }

    pub fn unpin(&mut self, id: &str) -> Result<()> {
        self.set_pinned(id, false)
    }

    fn set_pinned(&mut self, id: &str, pinned: bool) -> Result<()> {
        let marker = self
            .registry
            .get_mut(id)
            .ok_or_else(|| Error::UnknownMarker(id.to_string()))?;
        marker.pinned = pinned;
        Ok(())
    }

    /// Freezes every marker, optionally hiding them
    pub fn pin_all(&mut self, hide: bool) -> Vec<MarkerUpdate> {
        let fade_ms = self.config.fade_ms;
        let mut updates = Vec::new();
        for marker in self.registry.iter_mut() {
            marker.pinned = true;
            if hide && marker.visible {
                marker.visible = false;
                updates.push(marker.to_update(fade_ms));
            }
        }
        updates
    }

    pub fn unpin_all(&mut self) {
        for marker in self.registry.iter_mut() {
            marker.pinned = false;
        }
    }

    /// Hides and freezes all markers while another section owns the screen
    pub fn suspend(&mut self) -> Vec<MarkerUpdate> {
        self.pin_all(true)
    }

    /// Unfreezes all markers and shows them again at their last placement
    pub fn resume(&mut self) -> Vec<MarkerUpdate> {
        let fade_ms = self.config.fade_ms;
        let mut updates = Vec::new();
        for marker in self.registry.iter_mut() {
            marker.pinned = false;
            if !marker.visible {
                marker.visible = true;
                updates.push(marker.to_update(fade_ms));
            }
        }
        updates
    }

    pub fn get(&self, id: &str) -> Option<&MarkerRecord> {
        self.registry.get(id)
    }

    pub fn snapshot(&self) -> Vec<MarkerRecord> {
        self.registry.iter().cloned().collect()
    }
}

/// First padded-viewport edge crossed by the segment from the view center to
/// `target`, in north, south, west, east order
fn project_to_edge(viewport: &PaddedViewport, target: &LatLng) -> Option<(Edge, LatLng)> {
    let ray = Line::new(viewport.center.to_coord(), target.to_coord());

    viewport.edges().find_map(|(edge, segment)| {
        let hit = match line_intersection(ray, segment)? {
            LineIntersection::SinglePoint { intersection, .. } => intersection,
            // ray runs along the edge; stop where it leaves the viewport
            LineIntersection::Collinear { intersection } => intersection.end,
        };
        Some((edge, LatLng::from(hit)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bounds::ViewportPadding;

    fn engine(markers: Vec<MarkerRecord>, padding: ViewportPadding) -> DeclutterEngine {
        let mut registry = MarkerRegistry::new();
        for marker in markers {
            registry.insert(marker);
        }
        DeclutterEngine::new(
            registry,
            DeclutterConfig {
                padding,
                ..DeclutterConfig::default()
            },
        )
    }

    fn square() -> LatLngBounds {
        LatLngBounds::from_coords(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn test_inside_marker_keeps_coordinate() {
        let coordinate = LatLng::new(4.0, 6.0);
        let mut engine = engine(
            vec![MarkerRecord::new("inside", coordinate)],
            ViewportPadding::none(),
        );
        let viewport = engine.padded(&square());

        engine.evaluate(&viewport, 8.0, 8.0);
        let marker = engine.get("inside").unwrap();
        assert_eq!(marker.position, coordinate);
        assert!(marker.visible);
        assert_eq!(marker.direction_hint, 0.0);
        assert_eq!(marker.placement, Placement::Exact);
    }

    #[test]
    fn test_east_marker_clamps_to_east_edge() {
        let mut engine = engine(
            vec![MarkerRecord::new("east", LatLng::new(5.0, 20.0))],
            ViewportPadding::none(),
        );
        let viewport = engine.padded(&square());

        let updates = engine.evaluate(&viewport, 8.0, 8.0);
        assert_eq!(updates.len(), 1);

        let marker = engine.get("east").unwrap();
        assert_eq!(marker.placement, Placement::Edge(Edge::East));
        assert!((marker.position.lng - 10.0).abs() < 1e-9);
        assert!((marker.position.lat - 5.0).abs() < 1e-9);
        assert!(marker.visible);
        assert!(marker.direction_hint.abs() < 2.0);
    }

    #[test]
    fn test_edge_order_prefers_north_on_corner() {
        // the ray leaves exactly through the north-east corner
        let mut engine = engine(
            vec![MarkerRecord::new("corner", LatLng::new(15.0, 15.0))],
            ViewportPadding::none(),
        );
        let viewport = engine.padded(&square());

        engine.evaluate(&viewport, 5.0, 5.0);
        let marker = engine.get("corner").unwrap();
        assert_eq!(marker.placement, Placement::Edge(Edge::North));
    }

    #[test]
    fn test_hidden_above_threshold() {
        let mut engine = engine(
            vec![
                MarkerRecord::new("inside", LatLng::new(5.0, 5.0)),
                MarkerRecord::new("outside", LatLng::new(5.0, 20.0)),
            ],
            ViewportPadding::default(),
        );
        let viewport = engine.padded(&square());

        engine.evaluate(&viewport, 8.0, 8.0);
        assert!(engine.get("outside").unwrap().visible);

        let updates = engine.evaluate(&viewport, 12.0, 8.0);
        assert_eq!(updates.len(), 1);
        assert!(!updates[0].visible);
        assert_eq!(updates[0].fade_ms, engine.config().fade_ms);

        for marker in engine.snapshot().iter().filter(|m| m.visible) {
            assert!(viewport.contains(&marker.coordinate));
        }

        // zooming back out reveals it on the edge again
        engine.evaluate(&viewport, 10.0, 12.0);
        assert!(engine.get("outside").unwrap().visible);
    }

    #[test]
    fn test_repeated_evaluation_is_stable() {
        let mut engine = engine(
            vec![
                MarkerRecord::new("a", LatLng::new(5.0, 20.0)),
                MarkerRecord::new("b", LatLng::new(-30.0, -40.0)),
                MarkerRecord::new("c", LatLng::new(3.0, 3.0)),
            ],
            ViewportPadding::default(),
        );
        let viewport = engine.padded(&square());

        engine.evaluate(&viewport, 6.0, 6.0);
        let first = engine.snapshot();
        let updates = engine.evaluate(&viewport, 6.0, 6.0);
        assert!(updates.is_empty());
        assert_eq!(engine.snapshot(), first);
    }

    #[test]
    fn test_hemisphere_predicate_triples_bearing() {
        let center = LatLng::new(5.0, 5.0);
        let south = LatLng::new(-40.0, 5.0);
        assert!(crosses_hemisphere(&south, &center));
        assert!(!crosses_hemisphere(&center, &south));

        let bounds = LatLngBounds::from_coords(0.0, 0.0, 10.0, 10.0);
        let mut corrected = engine(
            vec![MarkerRecord::new("s", LatLng::new(-40.0, 8.0))],
            ViewportPadding::none(),
        );
        let mut plain = corrected.clone();
        plain.config.hemisphere_correction = false;

        let viewport = corrected.padded(&bounds);
        corrected.evaluate(&viewport, 5.0, 5.0);
        plain.evaluate(&viewport, 5.0, 5.0);

        let bearing = viewport.center.bearing_to(&LatLng::new(-40.0, 8.0));
        let corrected_hint = corrected.get("s").unwrap().direction_hint;
        let plain_hint = plain.get("s").unwrap().direction_hint;
        assert!((plain_hint - screen_angle(bearing)).abs() < 1e-9);
        assert!((corrected_hint - screen_angle(bearing * 3.0)).abs() < 1e-9);
        assert_eq!(
            corrected.get("s").unwrap().placement,
            Placement::Edge(Edge::South)
        );
    }

    #[test]
    fn test_pinned_markers_are_frozen() {
        let mut engine = engine(
            vec![MarkerRecord::new("p", LatLng::new(5.0, 20.0))],
            ViewportPadding::none(),
        );
        let viewport = engine.padded(&square());

        engine.pin("p").unwrap();
        assert!(engine.evaluate(&viewport, 8.0, 8.0).is_empty());
        assert_eq!(engine.get("p").unwrap().placement, Placement::Exact);

        engine.unpin("p").unwrap();
        assert_eq!(engine.evaluate(&viewport, 8.0, 8.0).len(), 1);
        assert!(matches!(engine.pin("missing"), Err(Error::UnknownMarker(_))));
    }

    #[test]
    fn test_missing_intersection_keeps_last_position() {
        let mut engine = engine(
            vec![MarkerRecord::new("far", LatLng::new(50.0, 50.0))],
            ViewportPadding::none(),
        );
        // center placed outside the box so the ray never crosses an edge
        let viewport = engine
            .padded(&square())
            .with_center(LatLng::new(40.0, 40.0));

        let updates = engine.evaluate(&viewport, 5.0, 5.0);
        assert!(updates.is_empty());
        assert_eq!(engine.get("far").unwrap().position, LatLng::new(50.0, 50.0));
    }

    #[test]
    fn test_suspend_and_resume() {
        let mut engine = engine(
            vec![
                MarkerRecord::new("a", LatLng::new(5.0, 5.0)),
                MarkerRecord::new("b", LatLng::new(6.0, 6.0)),
            ],
            ViewportPadding::none(),
        );

        let hidden = engine.suspend();
        assert_eq!(hidden.len(), 2);
        assert!(engine.snapshot().iter().all(|m| m.pinned && !m.visible));

        let shown = engine.resume();
        assert_eq!(shown.len(), 2);
        assert!(engine.snapshot().iter().all(|m| !m.pinned && m.visible));
    }

    #[test]
    fn test_screen_angle_convention() {
        assert_eq!(screen_angle(90.0), 0.0);
        assert_eq!(screen_angle(0.0), 90.0);
        assert_eq!(screen_angle(180.0), -90.0);
        assert_eq!(screen_angle(-90.0), 180.0);
    }
}
