//! 2D camera: `screen = world * scale + translation`.
//!
//! The camera keeps a smoothed (rendered) scale/translation and a target
//! pair that input writes to. [`Camera::advance`] eases the rendered pair
//! toward the target once per frame.

use lifegrid_protocol::{Point, Rect, Viewport};

use crate::config::ViewportConfig;

/// Frame duration the blend fractions in [`ViewportConfig`] are quoted at.
const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;
const SNAP_EPSILON: f64 = 1e-4;
/// Smallest scale a camera accepts, whatever the config says.
const MIN_SCALE_FLOOR: f64 = 1e-3;

#[derive(Debug, Clone)]
pub struct Camera {
    scale: f64,
    translation: Point,
    target_scale: f64,
    target_translation: Point,
    viewport: Viewport,
    dragging: Option<Point>,
    config: ViewportConfig,
}

impl Camera {
    /// A degenerate scale range in `config` is repaired rather than
    /// rejected; see [`sanitize`].
    pub fn new(config: ViewportConfig) -> Self {
        let config = sanitize(config);
        let scale = 1.0_f64.clamp(config.min_scale, config.max_scale);
        Self {
            scale,
            translation: Point::ZERO,
            target_scale: scale,
            target_translation: Point::ZERO,
            viewport: Viewport::default(),
            dragging: None,
            config,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> Point {
        self.translation
    }

    pub fn target_scale(&self) -> f64 {
        self.target_scale
    }

    pub fn target_translation(&self) -> Point {
        self.target_translation
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.translation.x,
            world.y * self.scale + self.translation.y,
        )
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translation.x) / self.scale,
            (screen.y - self.translation.y) / self.scale,
        )
    }

    /// Like [`Camera::world_to_screen`], but for the camera once it settles.
    pub fn target_world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.target_scale + self.target_translation.x,
            world.y * self.target_scale + self.target_translation.y,
        )
    }

    pub fn target_screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.target_translation.x) / self.target_scale,
            (screen.y - self.target_translation.y) / self.target_scale,
        )
    }

    /// World-space rectangle currently on screen.
    pub fn visible_world_rect(&self) -> Rect {
        let min = self.screen_to_world(Point::new(self.viewport.x, self.viewport.y));
        Rect::new(
            min.x,
            min.y,
            self.viewport.width / self.scale,
            self.viewport.height / self.scale,
        )
    }

    /// One wheel notch: zoom in for negative `delta_y`, out for positive,
    /// keeping the world point under `cursor` fixed on screen.
    pub fn zoom_at(&mut self, delta_y: f64, cursor: Point) {
        if self.viewport.is_empty() || delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let factor = if delta_y < 0.0 {
            self.config.zoom_factor
        } else {
            1.0 / self.config.zoom_factor
        };
        self.zoom_to(self.target_scale * factor, cursor);
    }

    /// Set the target scale (clamped), anchored at `cursor`.
    pub fn zoom_to(&mut self, scale: f64, cursor: Point) {
        if self.viewport.is_empty() || !scale.is_finite() {
            return;
        }
        let anchor = self.target_screen_to_world(cursor);
        let new_scale = self.clamp_scale(scale);
        self.target_scale = new_scale;
        self.target_translation = Point::new(
            cursor.x - anchor.x * new_scale,
            cursor.y - anchor.y * new_scale,
        );
    }

    pub fn begin_drag(&mut self, screen: Point) {
        self.dragging = Some(screen);
    }

    /// Pan 1:1 with the pointer while a drag is active.
    pub fn drag_to(&mut self, screen: Point) {
        let Some(last) = self.dragging else {
            return;
        };
        self.pan_by(screen.x - last.x, screen.y - last.y);
        self.dragging = Some(screen);
    }

    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    /// Move the rendered translation immediately. The target moves by the
    /// same amount, so it matches the rendered translation once settled and
    /// a zoom still in flight keeps its cursor anchor.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.translation = self.translation.offset(dx, dy);
        self.target_translation = self.target_translation.offset(dx, dy);
    }

    /// Fit `bounds` into the viewport and jump there without easing.
    /// Returns `false` (and changes nothing) for a zero-sized viewport.
    pub fn center_on(&mut self, bounds: Rect, margin: f64) -> bool {
        if self.viewport.is_empty() {
            return false;
        }
        let avail_w = (self.viewport.width - 2.0 * margin).max(1.0);
        let avail_h = (self.viewport.height - 2.0 * margin).max(1.0);
        let fit = if bounds.w > 0.0 && bounds.h > 0.0 {
            (avail_w / bounds.w).min(avail_h / bounds.h)
        } else {
            1.0
        };
        let scale = self.clamp_scale(fit);
        let center = bounds.center();
        let translation = Point::new(
            self.viewport.x + self.viewport.width / 2.0 - center.x * scale,
            self.viewport.y + self.viewport.height / 2.0 - center.y * scale,
        );
        self.scale = scale;
        self.target_scale = scale;
        self.translation = translation;
        self.target_translation = translation;
        true
    }

    /// Ease toward the target.
    ///
    /// Uses `exp(-dt * rate)` with `rate` derived from the configured
    /// per-frame blend at 60 Hz, so easing speed does not depend on the
    /// display refresh rate.
    pub fn advance(&mut self, dt_ms: f64) {
        if self.viewport.is_empty() || dt_ms.is_nan() || dt_ms <= 0.0 {
            return;
        }
        let scale_keep = retain_factor(self.config.scale_blend, dt_ms);
        let pos_keep = retain_factor(self.config.position_blend, dt_ms);

        self.scale = approach(self.scale, self.target_scale, scale_keep);
        self.translation = Point::new(
            approach(self.translation.x, self.target_translation.x, pos_keep),
            approach(self.translation.y, self.target_translation.y, pos_keep),
        );
        self.scale = self.clamp_scale(self.scale);
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.config.min_scale, self.config.max_scale)
    }
}

/// Order the scale range and keep it strictly positive. A zoom factor that
/// would not zoom in falls back to the default.
fn sanitize(mut config: ViewportConfig) -> ViewportConfig {
    let floor = |v: f64| if v.is_finite() { v.max(MIN_SCALE_FLOOR) } else { 1.0 };
    let (a, b) = (floor(config.min_scale), floor(config.max_scale));
    config.min_scale = a.min(b);
    config.max_scale = a.max(b);
    if !(config.zoom_factor.is_finite() && config.zoom_factor > 1.0) {
        config.zoom_factor = ViewportConfig::default().zoom_factor;
    }
    config
}

/// Share of the remaining distance kept after `dt_ms`.
fn retain_factor(blend_per_frame: f64, dt_ms: f64) -> f64 {
    let blend = blend_per_frame.clamp(1e-6, 1.0 - 1e-6);
    let rate = -(1.0 - blend).ln() / REFERENCE_FRAME_MS;
    (-dt_ms * rate).exp()
}

fn approach(current: f64, target: f64, keep: f64) -> f64 {
    let next = target + (current - target) * keep;
    if (next - target).abs() < SNAP_EPSILON {
        target
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn camera() -> Camera {
        let mut cam = Camera::new(ViewportConfig::default());
        cam.resize(800.0, 600.0);
        cam
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn world_screen_roundtrip() {
        let mut cam = camera();
        cam.center_on(Rect::new(0.0, 0.0, 100.0, 50.0), 0.0);
        let p = Point::new(12.5, -3.0);
        assert!(close(cam.screen_to_world(cam.world_to_screen(p)), p));
    }

    #[test]
    fn wheel_up_zooms_in_geometrically() {
        let mut cam = camera();
        cam.zoom_at(-1.0, Point::new(400.0, 300.0));
        cam.zoom_at(-1.0, Point::new(400.0, 300.0));
        assert!((cam.target_scale() - 1.03 * 1.03).abs() < 1e-12);
        cam.zoom_at(120.0, Point::new(400.0, 300.0));
        assert!((cam.target_scale() - 1.03).abs() < 1e-12);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = camera();
        for _ in 0..500 {
            cam.zoom_at(-1.0, Point::new(10.0, 10.0));
        }
        assert_eq!(cam.target_scale(), ViewportConfig::default().max_scale);
        for _ in 0..1000 {
            cam.zoom_at(1.0, Point::new(10.0, 10.0));
        }
        assert_eq!(cam.target_scale(), ViewportConfig::default().min_scale);
    }

    #[test]
    fn advance_converges_to_target() {
        let mut cam = camera();
        cam.zoom_at(-1.0, Point::new(100.0, 100.0));
        for _ in 0..600 {
            cam.advance(16.0);
        }
        assert_eq!(cam.scale(), cam.target_scale());
        assert_eq!(cam.translation(), cam.target_translation());
    }

    #[test]
    fn easing_is_frame_rate_independent() {
        let mut fast = camera();
        let mut slow = camera();
        fast.zoom_to(4.0, Point::new(0.0, 0.0));
        slow.zoom_to(4.0, Point::new(0.0, 0.0));
        for _ in 0..4 {
            fast.advance(8.0);
        }
        slow.advance(32.0);
        assert!((fast.scale() - slow.scale()).abs() < 1e-9);
    }

    #[test]
    fn drag_pans_immediately() {
        let mut cam = camera();
        cam.begin_drag(Point::new(10.0, 10.0));
        assert!(cam.is_dragging());
        cam.drag_to(Point::new(30.0, 5.0));
        assert_eq!(cam.translation(), Point::new(20.0, -5.0));
        assert_eq!(cam.target_translation(), cam.translation());
        cam.end_drag();
        assert!(!cam.is_dragging());
        cam.drag_to(Point::new(100.0, 100.0));
        assert_eq!(cam.translation(), Point::new(20.0, -5.0));
    }

    #[test]
    fn zero_sized_viewport_is_inert() {
        let mut cam = Camera::new(ViewportConfig::default());
        cam.zoom_at(-1.0, Point::new(10.0, 10.0));
        cam.advance(16.0);
        assert!(!cam.center_on(Rect::new(0.0, 0.0, 10.0, 10.0), 4.0));
        assert_eq!(cam.target_scale(), 1.0);
        assert!(cam.scale().is_finite());
    }

    #[test]
    fn center_on_places_bounds_in_the_middle() {
        let mut cam = camera();
        assert!(cam.center_on(Rect::new(0.0, 0.0, 728.0, 1120.0), 48.0));
        let c = cam.world_to_screen(Point::new(364.0, 560.0));
        assert!(close(c, Point::new(400.0, 300.0)));
        assert!(cam.scale() >= ViewportConfig::default().min_scale);
    }

    #[test]
    fn zoom_while_button_held_keeps_cursor_anchor() {
        let mut cam = camera();
        let cursor = Point::new(700.0, 500.0);
        let anchor = cam.screen_to_world(cursor);
        cam.begin_drag(cursor);
        for _ in 0..10 {
            cam.zoom_at(-1.0, cursor);
        }
        for _ in 0..300 {
            cam.advance(16.0);
        }
        assert!(cam.scale() > 1.3);
        assert!(close(cam.world_to_screen(anchor), cursor));
    }

    #[test]
    fn drag_during_zoom_carries_the_anchor_along() {
        let mut cam = camera();
        let cursor = Point::new(200.0, 150.0);
        let anchor = cam.screen_to_world(cursor);
        for _ in 0..10 {
            cam.zoom_at(-1.0, cursor);
        }
        cam.advance(16.0);
        cam.begin_drag(cursor);
        cam.drag_to(cursor.offset(30.0, -20.0));
        cam.end_drag();
        for _ in 0..300 {
            cam.advance(16.0);
        }
        assert!(close(cam.world_to_screen(anchor), cursor.offset(30.0, -20.0)));
    }

    #[test]
    fn degenerate_scale_range_is_repaired() {
        let inverted = Camera::new(ViewportConfig {
            min_scale: 4.0,
            max_scale: 2.0,
            ..ViewportConfig::default()
        });
        assert_eq!(inverted.scale(), 2.0);

        let mut zero = Camera::new(ViewportConfig {
            min_scale: 0.0,
            max_scale: f64::NAN,
            zoom_factor: 0.5,
            ..ViewportConfig::default()
        });
        zero.resize(800.0, 600.0);
        for _ in 0..5000 {
            zero.zoom_at(1.0, Point::new(10.0, 10.0));
        }
        for _ in 0..600 {
            zero.advance(16.0);
        }
        assert!(zero.scale() >= MIN_SCALE_FLOOR);
        let p = zero.screen_to_world(Point::new(400.0, 300.0));
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    proptest! {
        #[test]
        fn zoom_keeps_cursor_anchor(
            cx in 0.0f64..800.0,
            cy in 0.0f64..600.0,
            delta in prop_oneof![Just(-1.0f64), Just(1.0f64)],
            pan_x in -500.0f64..500.0,
            pan_y in -500.0f64..500.0,
        ) {
            let mut cam = camera();
            cam.pan_by(pan_x, pan_y);
            let cursor = Point::new(cx, cy);
            let before = cam.target_screen_to_world(cursor);
            cam.zoom_at(delta, cursor);
            let after = cam.target_world_to_screen(before);
            prop_assert!((after.x - cursor.x).abs() < 1e-6);
            prop_assert!((after.y - cursor.y).abs() < 1e-6);
        }
    }
}
