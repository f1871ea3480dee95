//! # Leaderboard & Badge Aggregator
//!
//! Pure projections over the reward ledger (plus reports and redemptions).
//! Nothing here is authoritative state: every number is re-derived on read,
//! so cached copies elsewhere can never drift from the ledger.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use domains::{
    LedgerStore, RedemptionStore, ReportStatus, ReportStore, Result, Role, UserDirectory,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{self, BadgeCriterion};

/// Aggregation window for the leaderboard. Fixed-length windows, not
/// calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Week,
    Month,
    Year,
    All,
}

impl Timeframe {
    /// Inclusive lower bound of the window, `None` for unbounded.
    pub fn window_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Timeframe::Week => Some(now - Duration::days(7)),
            Timeframe::Month => Some(now - Duration::days(30)),
            Timeframe::Year => Some(now - Duration::days(365)),
            Timeframe::All => None,
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub user_id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub total_points: u64,
    pub total_earnings: u64,
    pub total_weight: f64,
}

/// Fully derived per-user summary. `available_points` is always
/// `total_points - redeemed_points`, recomputed from scratch.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub total_points: u64,
    pub available_points: u64,
    pub redeemed_points: u64,
    pub total_earnings: u64,
    pub total_weight: f64,
    pub total_reports: usize,
    pub completed_reports: usize,
    /// Number of ledger entries credited to the user.
    pub activities: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub points_required: u64,
    pub category: &'static str,
    pub earned: bool,
    pub earned_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelTier {
    pub id: &'static str,
    pub name: &'static str,
    pub points_required: u64,
    pub rewards: Vec<&'static str>,
    pub current: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelInfo {
    pub current: LevelTier,
    pub next: Option<LevelTier>,
    /// Percentage toward the next tier, clamped to 100 at the top tier.
    pub progress: f64,
    pub all_levels: Vec<LevelTier>,
}

pub struct AggregatorService {
    ledger: Arc<dyn LedgerStore>,
    reports: Arc<dyn ReportStore>,
    redemptions: Arc<dyn RedemptionStore>,
    users: Arc<dyn UserDirectory>,
}

impl AggregatorService {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        reports: Arc<dyn ReportStore>,
        redemptions: Arc<dyn RedemptionStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            ledger,
            reports,
            redemptions,
            users,
        }
    }

    /// Top 20 users of the given role by points earned inside the window.
    /// The sort is stable; ties keep ledger insertion order.
    pub async fn leaderboard(&self, role: Role, timeframe: Timeframe) -> Result<Vec<Ranking>> {
        let since = timeframe.window_start(Utc::now());
        let entries = self.ledger.entries_since(since).await?;

        // First-seen order is preserved so the stable sort below has a
        // deterministic secondary key.
        let mut order: Vec<Uuid> = Vec::new();
        let mut totals: HashMap<Uuid, (u64, u64, f64)> = HashMap::new();
        for entry in &entries {
            let slot = totals.entry(entry.user_id).or_insert_with(|| {
                order.push(entry.user_id);
                (0, 0, 0.0)
            });
            slot.0 += entry.points;
            slot.1 += entry.earnings;
            slot.2 += entry.weight;
        }

        let mut rankings = Vec::with_capacity(order.len());
        for user_id in order {
            // Referential integrity is not enforced at write time; entries
            // whose user is unknown to the directory are skipped here.
            let Some(profile) = self.users.get(user_id).await? else {
                continue;
            };
            if profile.role != role {
                continue;
            }
            let (points, earnings, weight) = totals[&user_id];
            rankings.push(Ranking {
                user_id,
                full_name: profile.full_name,
                role: profile.role,
                total_points: points,
                total_earnings: earnings,
                total_weight: weight,
            });
        }

        rankings.sort_by(|a, b| b.total_points.cmp(&a.total_points));
        rankings.truncate(20);
        Ok(rankings)
    }

    pub async fn user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        let entries = self.ledger.entries_for_user(user_id).await?;
        let reports = self.reports.list_by_reporter(user_id).await?;
        let redemptions = self.redemptions.list_by_user(user_id).await?;

        let total_points: u64 = entries.iter().map(|e| e.points).sum();
        let redeemed_points: u64 = redemptions.iter().map(|r| r.points_used).sum();

        Ok(UserStats {
            total_points,
            available_points: total_points.saturating_sub(redeemed_points),
            redeemed_points,
            total_earnings: entries.iter().map(|e| e.earnings).sum(),
            total_weight: entries.iter().map(|e| e.weight).sum(),
            total_reports: reports.len(),
            completed_reports: reports
                .iter()
                .filter(|r| r.status == ReportStatus::Completed)
                .count(),
            activities: entries.len(),
        })
    }

    /// All badges with earned status and earned date. Point and weight
    /// crossings come from a single chronological ledger pass; report-count
    /// badges use the n-th qualifying report's timestamp.
    pub async fn user_badges(&self, user_id: Uuid) -> Result<Vec<Badge>> {
        // Snapshots may hand back ledger rows in any order; the replay below
        // only makes sense chronologically.
        let mut entries = self.ledger.entries_for_user(user_id).await?;
        entries.sort_by_key(|e| e.created_at);
        let mut reports = self.reports.list_by_reporter(user_id).await?;
        reports.sort_by_key(|r| r.created_at);

        let stats = self.user_stats(user_id).await?;

        // One replay computes every threshold crossing the catalog needs.
        let point_targets: Vec<u64> = catalog::BADGES
            .iter()
            .filter_map(|b| match b.criterion {
                BadgeCriterion::TotalPoints(p) => Some(p),
                _ => None,
            })
            .collect();
        let weight_targets: Vec<f64> = catalog::BADGES
            .iter()
            .filter_map(|b| match b.criterion {
                BadgeCriterion::TotalWeightKg(w) => Some(w),
                _ => None,
            })
            .collect();

        let mut point_crossed: HashMap<u64, DateTime<Utc>> = HashMap::new();
        let mut weight_crossed: Vec<(f64, DateTime<Utc>)> = Vec::new();
        let (mut running_points, mut running_weight) = (0u64, 0f64);
        for entry in &entries {
            running_points += entry.points;
            running_weight += entry.weight;
            for &target in &point_targets {
                if running_points >= target {
                    point_crossed.entry(target).or_insert(entry.created_at);
                }
            }
            for &target in &weight_targets {
                if running_weight >= target
                    && !weight_crossed.iter().any(|(t, _)| *t == target)
                {
                    weight_crossed.push((target, entry.created_at));
                }
            }
        }

        let completed: Vec<_> = reports
            .iter()
            .filter(|r| r.status == ReportStatus::Completed)
            .collect();

        let badges = catalog::BADGES
            .iter()
            .map(|spec| {
                let (earned, earned_date) = match spec.criterion {
                    BadgeCriterion::TotalPoints(target) => (
                        stats.total_points >= target,
                        point_crossed.get(&target).copied(),
                    ),
                    BadgeCriterion::TotalWeightKg(target) => (
                        stats.total_weight >= target,
                        weight_crossed
                            .iter()
                            .find(|(t, _)| *t == target)
                            .map(|(_, at)| *at),
                    ),
                    BadgeCriterion::TotalReports(n) => (
                        reports.len() >= n,
                        reports.get(n.saturating_sub(1)).map(|r| r.created_at),
                    ),
                    BadgeCriterion::CompletedReports(n) => (
                        completed.len() >= n,
                        completed
                            .get(n.saturating_sub(1))
                            .map(|r| r.completed_at.unwrap_or(r.updated_at)),
                    ),
                };
                Badge {
                    id: spec.id,
                    name: spec.name,
                    description: spec.description,
                    points_required: spec.points_required,
                    category: spec.category,
                    earned,
                    earned_date: if earned { earned_date } else { None },
                }
            })
            .collect();

        Ok(badges)
    }

    /// Current tier, next tier, and linear progress between their thresholds.
    pub async fn user_level(&self, user_id: Uuid) -> Result<LevelInfo> {
        let stats = self.user_stats(user_id).await?;
        let points = stats.total_points;

        let mut current_idx = 0;
        for (i, level) in catalog::LEVELS.iter().enumerate() {
            if points >= level.points_required {
                current_idx = i;
            } else {
                break;
            }
        }

        let current_spec = &catalog::LEVELS[current_idx];
        let next_spec = catalog::LEVELS.get(current_idx + 1);

        let progress = match next_spec {
            Some(next) => {
                let span = (next.points_required - current_spec.points_required) as f64;
                (((points - current_spec.points_required) as f64 / span) * 100.0).min(100.0)
            }
            None => 100.0,
        };

        let tier = |spec: &catalog::LevelSpec| LevelTier {
            id: spec.id,
            name: spec.name,
            points_required: spec.points_required,
            rewards: spec.rewards.to_vec(),
            current: spec.id == current_spec.id,
            completed: points >= spec.points_required,
        };

        Ok(LevelInfo {
            current: tier(current_spec),
            next: next_spec.map(tier),
            progress,
            all_levels: catalog::LEVELS.iter().map(tier).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{
        MockLedgerStore, MockRedemptionStore, MockReportStore, MockUserDirectory, RewardEntry,
        RewardKind,
    };

    fn credit(points: u64, created_at: DateTime<Utc>) -> RewardEntry {
        RewardEntry {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            report_id: None,
            points,
            earnings: 0,
            weight: 0.0,
            kind: RewardKind::CleanupCompletion,
            created_at,
        }
    }

    #[tokio::test]
    async fn badge_dates_come_from_the_chronological_crossing() {
        let user_id = Uuid::now_v7();
        let earlier = Utc::now() - Duration::hours(2);
        let later = Utc::now() - Duration::hours(1);

        // The store hands the rows back newest first; the 100-point badge is
        // still crossed by the later entry (50, then 110 cumulative).
        let mut ledger = MockLedgerStore::new();
        ledger.expect_entries_for_user().returning(move |_| {
            Ok(vec![credit(60, later), credit(50, earlier)])
        });
        let mut reports = MockReportStore::new();
        reports.expect_list_by_reporter().returning(|_| Ok(vec![]));
        let mut redemptions = MockRedemptionStore::new();
        redemptions.expect_list_by_user().returning(|_| Ok(vec![]));

        let svc = AggregatorService::new(
            Arc::new(ledger),
            Arc::new(reports),
            Arc::new(redemptions),
            Arc::new(MockUserDirectory::new()),
        );

        let badges = svc.user_badges(user_id).await.unwrap();
        let warrior = badges.iter().find(|b| b.id == "week_warrior").unwrap();
        assert!(warrior.earned);
        assert_eq!(warrior.earned_date, Some(later));
    }

    #[test]
    fn window_lengths() {
        let now = Utc::now();
        assert_eq!(
            Timeframe::Week.window_start(now),
            Some(now - Duration::days(7))
        );
        assert_eq!(
            Timeframe::Month.window_start(now),
            Some(now - Duration::days(30))
        );
        assert_eq!(
            Timeframe::Year.window_start(now),
            Some(now - Duration::days(365))
        );
        assert_eq!(Timeframe::All.window_start(now), None);
    }

    #[test]
    fn timeframe_parses_lowercase() {
        assert_eq!(
            serde_json::from_str::<Timeframe>("\"week\"").unwrap(),
            Timeframe::Week
        );
        assert_eq!(
            serde_json::from_str::<Timeframe>("\"all\"").unwrap(),
            Timeframe::All
        );
    }
}
