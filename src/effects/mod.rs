//! Short-lived visual effects triggered by simulation events.
//!
//! Effects are plain time-stamped records. Nothing schedules their removal;
//! readers pass the current time and expired slots are cleared on access.

pub mod tracker;

pub use tracker::{ActiveEffects, EffectTracker, SelfBite, TimedEffect, WallFlash};
