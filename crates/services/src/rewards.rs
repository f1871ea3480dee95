//! Reward policy: a deterministic, pure mapping from completion data to
//! ledger credits. Summaries are always re-derived from the ledger, so
//! nothing here reads or increments a stored total.

use chrono::{DateTime, Utc};
use domains::{RewardEntry, RewardKind};
use uuid::Uuid;

/// Points credited per effective kilogram.
pub const BASE_POINTS: u64 = 50;
/// Currency units credited to the worker per effective kilogram.
pub const EARNINGS_PER_KG: u64 = 10;
/// Fraction of the worker's points credited to the original reporter.
pub const REPORTER_SHARE: f64 = 0.3;

/// The credits produced by one completion event. Weights below 1 kg earn the
/// 1 kg minimum so trivial pickups still pay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRewards {
    pub worker_points: u64,
    pub worker_earnings: u64,
    pub reporter_points: u64,
}

/// Computes the reward split for a collected weight.
pub fn completion_rewards(weight_kg: f64) -> CompletionRewards {
    let effective = weight_kg.max(1.0);
    let worker_points = (BASE_POINTS as f64 * effective).floor() as u64;
    let worker_earnings = (effective * EARNINGS_PER_KG as f64).floor() as u64;
    let reporter_points = (worker_points as f64 * REPORTER_SHARE).floor() as u64;

    CompletionRewards {
        worker_points,
        worker_earnings,
        reporter_points,
    }
}

/// Ledger entry crediting the worker who completed the cleanup.
pub fn worker_entry(
    worker_id: Uuid,
    report_id: Option<Uuid>,
    weight_kg: f64,
    rewards: CompletionRewards,
    at: DateTime<Utc>,
) -> RewardEntry {
    RewardEntry {
        id: Uuid::now_v7(),
        user_id: worker_id,
        report_id,
        points: rewards.worker_points,
        earnings: rewards.worker_earnings,
        weight: weight_kg,
        kind: RewardKind::CleanupCompletion,
        created_at: at,
    }
}

/// Ledger entry crediting the citizen whose report led to the cleanup.
/// References the same report and weight as the worker entry for audit.
pub fn reporter_entry(
    reporter_id: Uuid,
    report_id: Uuid,
    weight_kg: f64,
    rewards: CompletionRewards,
    at: DateTime<Utc>,
) -> RewardEntry {
    RewardEntry {
        id: Uuid::now_v7(),
        user_id: reporter_id,
        report_id: Some(report_id),
        points: rewards.reporter_points,
        earnings: 0,
        weight: weight_kg,
        kind: RewardKind::ReportCompletion,
        created_at: at,
    }
}
