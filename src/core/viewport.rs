use crate::canvas::CanvasHandle;
use crate::core::config::ConstraintConfig;
use crate::core::geo::{LatLng, LatLngBounds};
use crate::Result;

/// Pan/zoom limits around a focal region and the zoom-to-pitch policy
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConstraints {
    config: ConstraintConfig,
}

impl ViewportConstraints {
    pub fn new(config: ConstraintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    /// Pan box of `center ± radius` degrees on each axis
    pub fn lock_bounds(&self, center: LatLng, radius: Option<f64>) -> LatLngBounds {
        LatLngBounds::around(center, radius.unwrap_or(self.config.lock_radius))
    }

    /// Applies the configured zoom range and a pan box around `center`
    pub fn lock_around(
        &self,
        canvas: &CanvasHandle,
        center: LatLng,
        radius: Option<f64>,
    ) -> Result<LatLngBounds> {
        let bounds = self.lock_bounds(center, radius);
        log::debug!("locking viewport around {:?} to {:?}", center, bounds);
        canvas.with(|c| {
            c.set_zoom_range(Some(self.config.min_zoom), Some(self.config.max_zoom));
            c.set_max_bounds(Some(bounds));
        })?;
        Ok(bounds)
    }

    /// Clears zoom and pan limits, e.g. before a long flight
    pub fn unlock(&self, canvas: &CanvasHandle) -> Result<()> {
        log::debug!("unlocking viewport");
        canvas.with(|c| {
            c.set_zoom_range(None, None);
            c.set_max_bounds(None);
        })
    }

    /// Maps zoom linearly onto pitch, clamped to the pitch range
    pub fn zoom_to_pitch(&self, zoom: f64) -> f64 {
        let (z0, z1) = self.config.pitch_zoom_domain;
        let (p0, p1) = self.config.pitch_range;
        let t = ((zoom - z0) / (z1 - z0)).clamp(0.0, 1.0);
        p0 + (p1 - p0) * t
    }

    /// Tilts the camera to match a zoom change; returns the applied pitch
    pub fn apply_zoom(&self, canvas: &CanvasHandle, zoom: f64) -> Result<f64> {
        let pitch = self.zoom_to_pitch(zoom);
        canvas.with(|c| c.set_pitch(pitch))?;
        Ok(pitch)
    }

    /// Hands the map over to steady-state interaction: locked around `center`
    /// with manual rotation disabled
    pub fn settle(&self, canvas: &CanvasHandle, center: LatLng) -> Result<LatLngBounds> {
        let bounds = self.lock_around(canvas, center, None)?;
        canvas.with(|c| c.set_rotation_enabled(false))?;
        Ok(bounds)
    }
}

impl Default for ViewportConstraints {
    fn default() -> Self {
        Self::new(ConstraintConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::HeadlessCanvas;

    #[test]
    fn test_zoom_to_pitch_mapping() {
        let constraints = ViewportConstraints::default();
        assert_eq!(constraints.zoom_to_pitch(10.0), 0.0);
        assert_eq!(constraints.zoom_to_pitch(16.0), 60.0);
        assert_eq!(constraints.zoom_to_pitch(13.0), 30.0);
        assert_eq!(constraints.zoom_to_pitch(4.0), 0.0);
        assert_eq!(constraints.zoom_to_pitch(20.0), 60.0);
    }

    #[test]
    fn test_lock_and_unlock() {
        let headless = HeadlessCanvas::default();
        let canvas = CanvasHandle::new(headless.clone());
        let constraints = ViewportConstraints::default();

        let paris = LatLng::new(48.858093, 2.294694);
        let bounds = constraints.lock_around(&canvas, paris, None).unwrap();
        assert_eq!(bounds, LatLngBounds::around(paris, 1.0));

        let state = headless.snapshot();
        assert_eq!(state.min_zoom, Some(10.0));
        assert_eq!(state.max_zoom, Some(16.0));
        assert_eq!(state.max_bounds, Some(bounds));

        constraints.unlock(&canvas).unwrap();
        let state = headless.snapshot();
        assert_eq!(state.min_zoom, None);
        assert_eq!(state.max_bounds, None);
    }

    #[test]
    fn test_settle_disables_rotation() {
        let headless = HeadlessCanvas::default();
        let canvas = CanvasHandle::new(headless.clone());
        ViewportConstraints::default()
            .settle(&canvas, LatLng::new(48.86, 2.29))
            .unwrap();

        let state = headless.snapshot();
        assert!(!state.rotation_enabled);
        assert!(state.max_bounds.is_some());
    }

    #[test]
    fn test_apply_zoom_sets_pitch() {
        let headless = HeadlessCanvas::default();
        let canvas = CanvasHandle::new(headless.clone());
        let pitch = ViewportConstraints::default()
            .apply_zoom(&canvas, 14.5)
            .unwrap();
        assert_eq!(pitch, 45.0);
        assert_eq!(headless.snapshot().camera.pitch, 45.0);
    }
}
