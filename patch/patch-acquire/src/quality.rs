//! Quality gates and hold-last substitution.

// Point counts stay far below 2^52.
#![allow(clippy::cast_precision_loss)]

use nalgebra::Point3;
use patch_types::Plane;
use tracing::debug;

use crate::params::ContactParams;
use crate::result::{QualityFlags, QualityReason};
use crate::state::{ContactState, GoodFrame};

/// Population standard deviation.
pub(crate) fn std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(var.sqrt())
}

/// Standard deviation of the points' signed distances to `plane`.
pub(crate) fn vertical_spread(points: &[Point3<f64>], plane: &Plane) -> Option<f64> {
    let distances: Vec<f64> = points.iter().map(|p| plane.signed_distance(p)).collect();
    std_dev(&distances)
}

/// Flags the filtered set of this frame.
///
/// With the gates disabled the frame is never flagged. `plane_available` is
/// false only for callers without a plane; the pipeline always passes one.
pub(crate) fn assess(params: &ContactParams, count: usize, spread: Option<f64>, plane_available: bool) -> QualityFlags {
    let mut flags = QualityFlags::default();
    if !params.use_quality_gates {
        return flags;
    }

    if count == 0 {
        flags.rejected = true;
        flags.reasons.push(QualityReason::NoContacts);
        return flags;
    }
    if count < params.min_quality_contacts {
        flags.degraded = true;
        flags.reasons.push(QualityReason::TooFewContacts { count });
    }
    if params.use_vertical_spread_gate {
        match spread {
            Some(std_dev) if std_dev > params.max_vertical_spread => {
                flags.rejected = true;
                flags.reasons.push(QualityReason::VerticalSpread { std_dev });
            }
            Some(_) => {}
            None if !plane_available => flags.reasons.push(QualityReason::PlaneUnavailable),
            None => {}
        }
    }
    flags
}

/// Resolves which frame to report.
///
/// A rejected frame reuses the last good frame while the hold budget lasts.
/// Every frame that is not held and has points becomes the new last good
/// frame, even a rejected one, so a later empty frame can still be held. An
/// empty frame that is not held clears it.
pub(crate) fn resolve_hold(
    params: &ContactParams,
    state: &mut ContactState,
    flags: &mut QualityFlags,
    current: Option<GoodFrame>,
) -> Option<GoodFrame> {
    if !flags.rejected {
        state.held_frames = 0;
        if let Some(frame) = &current {
            state.last_good = Some(frame.clone());
        }
        return current;
    }

    if params.use_hold_last && state.held_frames < params.hold_frames {
        if let Some(good) = state.last_good.clone() {
            state.held_frames += 1;
            flags.rejected = false;
            flags.held = true;
            flags.reasons.push(QualityReason::HeldLastGood {
                frame: state.held_frames,
            });
            debug!(frame = state.held_frames, budget = params.hold_frames, "Holding last good contact frame");
            return Some(good);
        }
    }

    if state.last_good.is_some() {
        debug!(held = state.held_frames, "Hold budget exhausted, replacing last good frame");
    }
    state.held_frames = 0;
    state.last_good = current.clone().filter(|frame| !frame.points.is_empty());
    current
}
