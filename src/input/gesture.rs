//! Pointer gestures for steering with a mouse or touchpad.
//!
//! Terminal mouse events arrive in cell coordinates. They are scaled to a
//! nominal pixel grid so the swipe threshold and joystick radii keep the
//! same feel as on a touch screen.

use crate::game::Direction;

/// Nominal width of one terminal cell in pixels.
pub const CELL_WIDTH_PX: f64 = 8.0;
/// Nominal height of one terminal cell in pixels.
pub const CELL_HEIGHT_PX: f64 = 16.0;

pub const SWIPE_THRESHOLD_PX: f64 = 22.0;
pub const JOYSTICK_RADIUS_PX: f64 = 34.0;
pub const JOYSTICK_DEAD_ZONE_PX: f64 = 14.0;

/// Converts a terminal cell coordinate into nominal pixels.
pub fn cell_to_px(column: u16, row: u16) -> (f64, f64) {
    (column as f64 * CELL_WIDTH_PX, row as f64 * CELL_HEIGHT_PX)
}

/// Tracks a press-drag-release gesture and reports a direction on release
/// when the displacement is large enough.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f64,
    origin: Option<(f64, f64)>,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::with_threshold(SWIPE_THRESHOLD_PX)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            origin: None,
        }
    }

    pub fn begin(&mut self, x: f64, y: f64) {
        self.origin = Some((x, y));
    }

    pub fn is_tracking(&self) -> bool {
        self.origin.is_some()
    }

    pub fn cancel(&mut self) {
        self.origin = None;
    }

    /// Ends the gesture. Both axes below the threshold means a tap, which
    /// yields no direction.
    pub fn end(&mut self, x: f64, y: f64) -> Option<Direction> {
        let (start_x, start_y) = self.origin.take()?;
        let dx = x - start_x;
        let dy = y - start_y;

        if dx.abs() < self.threshold && dy.abs() < self.threshold {
            return None;
        }
        Some(Direction::from_displacement(dx, dy))
    }
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickReading {
    /// Knob offset from the center, clamped to the joystick radius.
    pub knob: (f64, f64),
    pub direction: Option<Direction>,
}

/// On-screen steering wheel. The knob follows the pointer up to the rim and
/// steers once it leaves the dead zone.
#[derive(Debug, Clone)]
pub struct VirtualJoystick {
    radius: f64,
    dead_zone: f64,
    center: Option<(f64, f64)>,
    knob: (f64, f64),
}

impl VirtualJoystick {
    pub fn new() -> Self {
        Self {
            radius: JOYSTICK_RADIUS_PX,
            dead_zone: JOYSTICK_DEAD_ZONE_PX,
            center: None,
            knob: (0.0, 0.0),
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn knob(&self) -> (f64, f64) {
        self.knob
    }

    pub fn is_dragging(&self) -> bool {
        self.center.is_some()
    }

    /// Starts a drag anchored at `center` and applies the first pointer
    /// position.
    pub fn grab(&mut self, center: (f64, f64), x: f64, y: f64) -> JoystickReading {
        self.center = Some(center);
        self.drag(x, y)
    }

    /// Applies a pointer position. Outside a drag this is a no-op.
    pub fn drag(&mut self, x: f64, y: f64) -> JoystickReading {
        let Some((cx, cy)) = self.center else {
            return JoystickReading {
                knob: self.knob,
                direction: None,
            };
        };
        let reading = self.deflect(x - cx, y - cy);
        self.knob = reading.knob;
        reading
    }

    pub fn release(&mut self) {
        self.center = None;
        self.knob = (0.0, 0.0);
    }

    /// Reads a raw displacement from the center without touching drag state.
    pub fn deflect(&self, dx: f64, dy: f64) -> JoystickReading {
        let distance = dx.hypot(dy);
        let limited = distance.min(self.radius);
        let angle = dy.atan2(dx);
        let knob = (angle.cos() * limited, angle.sin() * limited);

        let direction = if distance < self.dead_zone {
            None
        } else {
            Some(Direction::from_displacement(dx, dy))
        };

        JoystickReading { knob, direction }
    }
}

impl Default for VirtualJoystick {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_swipe_is_ignored() {
        let mut swipe = SwipeTracker::new();
        swipe.begin(100.0, 100.0);
        assert_eq!(swipe.end(115.0, 110.0), None);
        assert!(!swipe.is_tracking());
    }

    #[test]
    fn test_swipe_dominant_axis() {
        let mut swipe = SwipeTracker::new();

        swipe.begin(0.0, 0.0);
        assert_eq!(swipe.end(40.0, 10.0), Some(Direction::Right));

        swipe.begin(0.0, 0.0);
        assert_eq!(swipe.end(-30.0, 5.0), Some(Direction::Left));

        swipe.begin(0.0, 0.0);
        assert_eq!(swipe.end(5.0, 25.0), Some(Direction::Down));

        swipe.begin(0.0, 0.0);
        assert_eq!(swipe.end(0.0, -23.0), Some(Direction::Up));
    }

    #[test]
    fn test_swipe_one_axis_over_threshold() {
        let mut swipe = SwipeTracker::new();
        swipe.begin(0.0, 0.0);
        // Horizontal alone clears the threshold.
        assert_eq!(swipe.end(22.0, 3.0), Some(Direction::Right));
    }

    #[test]
    fn test_swipe_end_without_begin() {
        let mut swipe = SwipeTracker::new();
        assert_eq!(swipe.end(50.0, 0.0), None);
    }

    #[test]
    fn test_swipe_in_terminal_cells() {
        let mut swipe = SwipeTracker::new();
        let (x0, y0) = cell_to_px(10, 5);
        let (x1, y1) = cell_to_px(10, 7);
        swipe.begin(x0, y0);
        // Two rows is 32 px.
        assert_eq!(swipe.end(x1, y1), Some(Direction::Down));

        // Two columns is only 16 px.
        let (x2, y2) = cell_to_px(12, 5);
        swipe.begin(x0, y0);
        assert_eq!(swipe.end(x2, y2), None);
    }

    #[test]
    fn test_joystick_dead_zone() {
        let stick = VirtualJoystick::new();
        let reading = stick.deflect(10.0, 5.0);
        assert_eq!(reading.direction, None);
        assert!((reading.knob.0 - 10.0).abs() < 1e-9);
        assert!((reading.knob.1 - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_joystick_knob_clamped_to_radius() {
        let stick = VirtualJoystick::new();
        let reading = stick.deflect(0.0, 100.0);
        assert_eq!(reading.direction, Some(Direction::Down));
        assert!(reading.knob.0.abs() < 1e-9);
        assert!((reading.knob.1 - JOYSTICK_RADIUS_PX).abs() < 1e-9);

        let diagonal = stick.deflect(-80.0, -60.0);
        let length = diagonal.knob.0.hypot(diagonal.knob.1);
        assert!((length - JOYSTICK_RADIUS_PX).abs() < 1e-9);
        assert_eq!(diagonal.direction, Some(Direction::Left));
    }

    #[test]
    fn test_joystick_drag_lifecycle() {
        let mut stick = VirtualJoystick::new();
        assert_eq!(stick.drag(50.0, 0.0).direction, None);

        let reading = stick.grab((100.0, 100.0), 130.0, 100.0);
        assert!(stick.is_dragging());
        assert_eq!(reading.direction, Some(Direction::Right));

        let reading = stick.drag(100.0, 60.0);
        assert_eq!(reading.direction, Some(Direction::Up));
        assert_eq!(stick.knob(), reading.knob);

        stick.release();
        assert!(!stick.is_dragging());
        assert_eq!(stick.knob(), (0.0, 0.0));
    }
}
