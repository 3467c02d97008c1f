//! Radial layout — concentric rings, one per node kind.
//!
//! Pure positional arithmetic. Identical input yields identical coordinates.

use std::f64::consts::TAU;

use super::model::Position;

pub const SESSION_RADIUS: f64 = 120.0;
pub const TRADE_RADIUS: f64 = 280.0;
pub const ASSET_RADIUS: f64 = 420.0;
pub const DATE_RADIUS: f64 = 560.0;

/// Ring phase, as a fraction of one slot of the ring it applies to. The date
/// ring starts half a date slot off zero, where the trade ring starts. Other
/// date slots can still share an angle with a trade slot.
pub const TRADE_PHASE: f64 = 0.0;
pub const DATE_PHASE: f64 = 0.5;

/// `count` evenly spaced points on a circle of `radius` around the origin,
/// starting at angle `phase × slot`.
pub fn ring(count: usize, radius: f64, phase: f64) -> Vec<Position> {
    if count == 0 {
        return Vec::new();
    }
    let slot = TAU / count as f64;
    (0..count)
        .map(|i| {
            let angle = (i as f64 + phase) * slot;
            Position {
                x: radius * angle.cos(),
                y: radius * angle.sin(),
            }
        })
        .collect()
}
