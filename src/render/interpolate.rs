//! Grid cells to smooth curves.
//!
//! Everything here works in a pixel-like space where one grid cell is
//! [`CELL_SIZE`] units wide and y grows downwards. The functions are pure;
//! the two small stateful filters ([`PointStabilizer`], [`HeadAngleFilter`])
//! belong to the renderer and never feed back into the simulation.

use crate::game::Position;

/// Nominal cell size of the curve space
pub const CELL_SIZE: f64 = 24.0;

const MAX_VISUAL_POINTS: usize = 180;
const MAX_DENSE_POINTS: usize = 360;
const MAX_BITE_PATH_POINTS: usize = 120;
const SMOOTHING_PASSES: usize = 2;
const FOLLOW: f64 = 0.52;
const HEAD_TURN_RATE: f64 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Center of a grid cell
pub fn cell_center(pos: Position) -> Point {
    Point::new(
        (f64::from(pos.x) + 0.5) * CELL_SIZE,
        (f64::from(pos.y) + 0.5) * CELL_SIZE,
    )
}

/// Per-segment interpolation between the previous and current body.
///
/// Segments with no previous counterpart (just grown) sit at their current
/// cell. Very long bodies are thinned to at most 180 points, tail kept.
pub fn snake_points(body: &[Position], previous: &[Position], alpha: f64) -> Vec<Point> {
    let raw: Vec<Point> = body
        .iter()
        .enumerate()
        .map(|(i, current)| {
            let prev = previous.get(i).copied().unwrap_or(*current);
            cell_center(prev).lerp(cell_center(*current), alpha)
        })
        .collect();

    if raw.len() <= MAX_VISUAL_POINTS {
        return raw;
    }

    let stride = raw.len().div_ceil(MAX_VISUAL_POINTS);
    let mut reduced: Vec<Point> = raw.iter().copied().step_by(stride).collect();
    if (raw.len() - 1) % stride != 0 {
        reduced.push(raw[raw.len() - 1]);
    }
    reduced
}

/// Insert up to three evenly spaced points into each gap
pub fn densify(points: &[Point]) -> Vec<Point> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut dense = Vec::with_capacity(points.len() * 3);
    'gaps: for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        dense.push(a);
        let subdivisions = ((a.distance(b) / (CELL_SIZE * 0.46)).floor() as usize).clamp(1, 3);
        for s in 1..=subdivisions {
            let t = s as f64 / (subdivisions + 1) as f64;
            dense.push(a.lerp(b, t));
            if dense.len() >= MAX_DENSE_POINTS - 1 {
                break 'gaps;
            }
        }
    }
    dense.push(points[points.len() - 1]);
    dense
}

/// Two passes of a 0.22 / 0.56 / 0.22 kernel; endpoints stay put
pub fn smooth(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut current = points.to_vec();
    for _ in 0..SMOOTHING_PASSES {
        let mut next = current.clone();
        for i in 1..current.len() - 1 {
            let (a, b, c) = (current[i - 1], current[i], current[i + 1]);
            next[i] = Point::new(
                a.x * 0.22 + b.x * 0.56 + c.x * 0.22,
                a.y * 0.22 + b.y * 0.56 + c.y * 0.22,
            );
        }
        current = next;
    }
    current
}

/// Evenly resample down to `max_points`, keeping both ends
pub fn limit_points(points: &[Point], max_points: usize) -> Vec<Point> {
    if points.len() <= max_points || max_points < 2 {
        return points.to_vec();
    }
    let stride = (points.len() - 1) as f64 / (max_points - 1) as f64;
    (0..max_points)
        .map(|i| points[(i as f64 * stride).round() as usize])
        .collect()
}

/// Full body curve for one frame
pub fn render_points(body: &[Position], previous: &[Position], alpha: f64) -> Vec<Point> {
    smooth(&densify(&snake_points(body, previous, alpha)))
}

/// Exponential follow of the body curve between frames.
///
/// When the point count changes the cache snaps to the new curve.
#[derive(Debug, Clone, Default)]
pub struct PointStabilizer {
    cache: Vec<Point>,
}

impl PointStabilizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stabilize(&mut self, target: &[Point]) -> &[Point] {
        if self.cache.len() != target.len() {
            self.cache = target.to_vec();
            return &self.cache;
        }
        for (cached, goal) in self.cache.iter_mut().zip(target) {
            cached.x += (goal.x - cached.x) * FOLLOW;
            cached.y += (goal.y - cached.y) * FOLLOW;
        }
        &self.cache
    }

    pub fn reset(&mut self) {
        self.cache.clear();
    }
}

/// Interpolate between two angles along the shorter arc
pub fn lerp_angle(from: f64, to: f64, factor: f64) -> f64 {
    let diff = (to - from).sin().atan2((to - from).cos());
    from + diff * factor
}

/// Slowly turning head heading, in radians
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadAngleFilter {
    angle: Option<f64>,
}

impl HeadAngleFilter {
    pub fn update(&mut self, target: f64) -> f64 {
        let angle = match self.angle {
            Some(current) => lerp_angle(current, target, HEAD_TURN_RATE),
            None => target,
        };
        self.angle = Some(angle);
        angle
    }

    pub fn current(&self) -> Option<f64> {
        self.angle
    }

    pub fn reset(&mut self) {
        self.angle = None;
    }
}

/// Heading of the head segment of a curve
pub fn head_angle(points: &[Point]) -> Option<f64> {
    let head = points.first()?;
    let neck = points.get(1)?;
    Some((head.y - neck.y).atan2(head.x - neck.x))
}

pub fn smooth_step(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Curve of the bitten-off piece, starting at the bite point
pub fn bite_path(cell: Position, removed: &[Position]) -> Vec<Point> {
    let mut path = vec![cell_center(cell)];
    for part in removed {
        let point = cell_center(*part);
        if path.last().is_none_or(|prev| prev.distance(point) > 0.25) {
            path.push(point);
        }
    }
    limit_points(&smooth(&densify(&path)), MAX_BITE_PATH_POINTS)
}

/// Pull the bitten-off piece into `anchor`. Segments near the bite go first,
/// the old tail follows; a small lateral wobble dies out with progress.
pub fn collapse_bite_path(path: &[Point], anchor: Point, progress: f64) -> Vec<Point> {
    let progress = smooth_step(progress.clamp(0.0, 1.0));
    let last = path.len().saturating_sub(1);

    path.iter()
        .enumerate()
        .map(|(i, p)| {
            let t = if last == 0 { 0.0 } else { i as f64 / last as f64 };
            let pull = smooth_step((progress * (0.52 + (1.0 - t) * 1.02)).min(1.0));

            let prev = path[i.saturating_sub(1)];
            let next = path[(i + 1).min(last)];
            let (tx, ty) = (next.x - prev.x, next.y - prev.y);
            let len = match tx.hypot(ty) {
                l if l > 0.0 => l,
                _ => 1.0,
            };
            let (nx, ny) = (-ty / len, tx / len);
            let wobble = ((1.0 - t) * std::f64::consts::PI * 2.4 + progress * 9.2).sin()
                * CELL_SIZE
                * 0.02
                * (1.0 - progress)
                * (1.0 - t);

            Point::new(
                p.x + (anchor.x - p.x) * pull + nx * wobble,
                p.y + (anchor.y - p.y) * pull + ny * wobble,
            )
        })
        .collect()
}
