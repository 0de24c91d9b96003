use crate::game::{BiteReport, Direction, Position};

/// An effect payload stamped with its lifetime, in milliseconds
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEffect<P> {
    pub start_ms: f64,
    pub end_ms: f64,
    pub payload: P,
}

impl<P> TimedEffect<P> {
    pub fn new(now_ms: f64, duration_ms: f64, payload: P) -> Self {
        Self {
            start_ms: now_ms,
            end_ms: now_ms + duration_ms,
            payload,
        }
    }

    pub fn is_active(&self, now_ms: f64) -> bool {
        now_ms < self.end_ms
    }

    /// Normalized age in `[0, 1]`
    pub fn progress(&self, now_ms: f64) -> f64 {
        let total = self.end_ms - self.start_ms;
        if total <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / total).clamp(0.0, 1.0)
    }

    /// Fraction of the lifetime still ahead, `1 - progress`
    pub fn remaining(&self, now_ms: f64) -> f64 {
        1.0 - self.progress(now_ms)
    }
}

/// Red border pulse when the head leaves the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFlash {
    /// Out-of-bounds cell the head tried to enter
    pub at: Position,
}

/// Cut-off body piece being swallowed back into the bite point
#[derive(Debug, Clone, PartialEq)]
pub struct SelfBite {
    pub cell: Position,
    pub heading: Direction,
    /// Body cells from the bitten segment to the old tail
    pub removed: Vec<Position>,
    /// Decorative only: the game ended on this bite
    pub fatal: bool,
}

impl From<&BiteReport> for SelfBite {
    fn from(report: &BiteReport) -> Self {
        Self {
            cell: report.cell,
            heading: report.heading,
            removed: report.removed_path.clone(),
            fatal: report.fatal,
        }
    }
}

/// Holds at most one effect of each kind; a new one replaces the old.
#[derive(Debug, Clone, Default)]
pub struct EffectTracker {
    wall_flash: Option<TimedEffect<WallFlash>>,
    self_bite: Option<TimedEffect<SelfBite>>,
}

impl EffectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flash_wall(&mut self, now_ms: f64, duration_ms: f64, flash: WallFlash) {
        self.wall_flash = Some(TimedEffect::new(now_ms, duration_ms, flash));
    }

    pub fn bite(&mut self, now_ms: f64, duration_ms: f64, bite: SelfBite) {
        self.self_bite = Some(TimedEffect::new(now_ms, duration_ms, bite));
    }

    /// Active wall flash, clearing the slot once it has expired
    pub fn wall_flash(&mut self, now_ms: f64) -> Option<&TimedEffect<WallFlash>> {
        expire(&mut self.wall_flash, now_ms);
        self.wall_flash.as_ref()
    }

    /// Active self-bite animation, clearing the slot once it has expired
    pub fn self_bite(&mut self, now_ms: f64) -> Option<&TimedEffect<SelfBite>> {
        expire(&mut self.self_bite, now_ms);
        self.self_bite.as_ref()
    }

    /// Expire both slots
    pub fn expire(&mut self, now_ms: f64) {
        expire(&mut self.wall_flash, now_ms);
        expire(&mut self.self_bite, now_ms);
    }

    /// Current slots as of the last expiry pass
    pub fn active(&self) -> ActiveEffects<'_> {
        ActiveEffects {
            wall_flash: self.wall_flash.as_ref(),
            self_bite: self.self_bite.as_ref(),
        }
    }

    pub fn clear(&mut self) {
        self.wall_flash = None;
        self.self_bite = None;
    }

    pub fn is_empty(&self) -> bool {
        self.wall_flash.is_none() && self.self_bite.is_none()
    }
}

/// Read-only view handed to the renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveEffects<'a> {
    pub wall_flash: Option<&'a TimedEffect<WallFlash>>,
    pub self_bite: Option<&'a TimedEffect<SelfBite>>,
}

fn expire<P>(slot: &mut Option<TimedEffect<P>>, now_ms: f64) {
    if slot.as_ref().is_some_and(|effect| !effect.is_active(now_ms)) {
        *slot = None;
    }
}
