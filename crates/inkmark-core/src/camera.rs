//! View zoom and pan over the annotated image.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom change per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Maps image pixels to view pixels.
///
/// Zoom 1.0 shows the image at 100%, one image pixel per screen pixel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Screen position of the image origin
    pub offset: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Size of the view the image is shown in
    pub viewport: Size,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            viewport: Size::new(800.0, 600.0),
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera at 100% with the given zoom range.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        let mut camera = Self::default();
        camera.set_limits(min_zoom, max_zoom);
        camera
    }

    /// Replace the zoom range and pull the current zoom into it.
    pub fn set_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        let min_zoom = min_zoom.max(f64::EPSILON);
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Image-to-screen transform.
    pub fn view_transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen-to-image transform, for pointer input.
    pub fn input_transform(&self) -> Affine {
        self.view_transform().inverse()
    }

    pub fn screen_to_image(&self, screen: Point) -> Point {
        self.input_transform() * screen
    }

    pub fn image_to_screen(&self, image: Point) -> Point {
        self.view_transform() * image
    }

    /// Shift the view by `delta` screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Current zoom (1.0 = 100%).
    pub fn zoom_value(&self) -> f64 {
        self.zoom
    }

    /// Set an absolute zoom, keeping the viewport center fixed.
    pub fn set_zoom_value(&mut self, value: f64) {
        if self.zoom <= 0.0 {
            return;
        }
        self.zoom(value / self.zoom);
    }

    /// Zoom by `factor` around the viewport center.
    pub fn zoom(&mut self, factor: f64) {
        self.zoom_to_point(factor, self.viewport_center());
    }

    /// Zoom by `factor` with the image pixel under `anchor` staying under it.
    pub fn zoom_to_point(&mut self, factor: f64, anchor: Point) {
        let zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let pinned = self.screen_to_image(anchor);
        self.zoom = zoom;
        self.offset += anchor - self.image_to_screen(pinned);
    }

    /// Zoom for a mouse wheel turn of `notches` (positive = in) under the cursor.
    pub fn wheel_zoom(&mut self, notches: f64, cursor: Point) {
        self.zoom_to_point(WHEEL_ZOOM_STEP.powf(notches), cursor);
    }

    /// Back to 100% with the image origin at the view origin.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    /// Scale and center so the whole image fits the viewport.
    pub fn fit_image(&mut self, image_rect: Rect) {
        if image_rect.is_zero_area() {
            self.reset();
            return;
        }
        let fit = (self.viewport.width.max(1.0) / image_rect.width())
            .min(self.viewport.height.max(1.0) / image_rect.height());
        self.zoom = fit.clamp(self.min_zoom, self.max_zoom);
        self.offset = self.viewport_center().to_vec2() - image_rect.center().to_vec2() * self.zoom;
    }

    /// A tolerance in screen pixels expressed in image pixels.
    pub fn image_tolerance(&self, screen_tolerance: f64) -> f64 {
        screen_tolerance / self.zoom
    }

    fn viewport_center(&self) -> Point {
        Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn test_starts_at_full_size() {
        let camera = Camera::new();
        assert!((camera.zoom_value() - 1.0).abs() < f64::EPSILON);
        assert!(close(camera.screen_to_image(Point::new(7.0, 9.0)), Point::new(7.0, 9.0)));
    }

    #[test]
    fn test_pointer_maps_into_image() {
        let mut camera = Camera::new();
        camera.pan(Vec2::new(40.0, 10.0));
        camera.zoom = 4.0;
        assert!(close(camera.screen_to_image(Point::new(80.0, 50.0)), Point::new(10.0, 10.0)));
        assert!(close(camera.image_to_screen(Point::new(10.0, 10.0)), Point::new(80.0, 50.0)));
        assert!((camera.image_tolerance(8.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_stays_in_range() {
        let mut camera = Camera::new();
        camera.zoom(0.001);
        assert!((camera.zoom_value() - 0.1).abs() < f64::EPSILON);

        camera.set_zoom_value(1000.0);
        assert!((camera.zoom_value() - 10.0).abs() < f64::EPSILON);

        camera.set_limits(0.5, 2.0);
        assert!((camera.zoom_value() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_zoom_pins_cursor() {
        let mut camera = Camera::new();
        let cursor = Point::new(200.0, 120.0);
        let pixel = camera.screen_to_image(cursor);

        camera.zoom_to_point(2.5, cursor);
        assert!(close(camera.image_to_screen(pixel), cursor));

        camera.wheel_zoom(-3.0, cursor);
        assert!(close(camera.image_to_screen(pixel), cursor));
        assert!((camera.zoom_value() - 2.5 / 1.1_f64.powi(3)).abs() < 1e-9);
    }

    #[test]
    fn test_fit_image_centers() {
        let mut camera = Camera::new();
        camera.viewport = Size::new(400.0, 400.0);
        camera.fit_image(Rect::new(0.0, 0.0, 800.0, 200.0));

        assert!((camera.zoom_value() - 0.5).abs() < f64::EPSILON);
        assert!(close(camera.image_to_screen(Point::new(400.0, 100.0)), Point::new(200.0, 200.0)));

        camera.fit_image(Rect::ZERO);
        assert!((camera.zoom_value() - 1.0).abs() < f64::EPSILON);
        assert_eq!(camera.offset, Vec2::ZERO);
    }

    #[test]
    fn test_custom_limits() {
        let mut camera = Camera::with_limits(0.5, 2.0);
        camera.zoom(10.0);
        assert!((camera.zoom_value() - 2.0).abs() < f64::EPSILON);
    }
}
