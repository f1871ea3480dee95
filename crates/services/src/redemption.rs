//! # Perk Redemption
//!
//! Debits a user's available points against the perk catalog. The debit is
//! implicit: appending the redemption row is enough, because every balance is
//! re-derived as total points minus redeemed points. Perk stock is surfaced
//! but never decremented.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use domains::{
    DomainError, LedgerStore, Redemption, RedemptionStatus, RedemptionStore, Result,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::catalog::{self, PerkSpec};

/// Catalog entry annotated with what the user can redeem right now.
#[derive(Debug, Clone, Serialize)]
pub struct PerkView {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub points_cost: u64,
    pub category: &'static str,
    pub stock: u32,
    pub available: bool,
}

pub struct RedemptionService {
    ledger: Arc<dyn LedgerStore>,
    redemptions: Arc<dyn RedemptionStore>,
    /// One lock per user serializes the balance check and the append, so
    /// concurrent redemptions can never overdraw a balance.
    user_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl RedemptionService {
    pub fn new(ledger: Arc<dyn LedgerStore>, redemptions: Arc<dyn RedemptionStore>) -> Self {
        Self {
            ledger,
            redemptions,
            user_locks: DashMap::new(),
        }
    }

    /// Redeems a catalog perk. The unlock predicate (lifetime minimum) is
    /// checked before the balance so callers can distinguish "never earned
    /// enough" from "spent too much". Of N concurrent redemptions only those
    /// the balance still covers, checked one at a time, may land.
    pub async fn redeem(&self, user_id: Uuid, perk_id: &str) -> Result<Redemption> {
        let perk = catalog::perk_by_id(perk_id)
            .ok_or_else(|| DomainError::NotFound("perk", perk_id.to_string()))?;

        let lock = self
            .user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let (total, available) = self.balances(user_id).await?;

        if let Some(minimum) = perk.min_total_points {
            if total < minimum {
                return Err(DomainError::RequirementsNotMet(format!(
                    "perk '{}' requires {} lifetime points, user has {}",
                    perk.id, minimum, total
                )));
            }
        }
        if available < perk.points_cost {
            return Err(DomainError::InsufficientPoints {
                available,
                required: perk.points_cost,
            });
        }

        let now = Utc::now();
        let redemption = Redemption {
            id: Uuid::now_v7(),
            user_id,
            perk_id: perk.id.to_string(),
            perk_name: perk.name.to_string(),
            points_used: perk.points_cost,
            status: RedemptionStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.redemptions.append(redemption.clone()).await?;

        info!(
            user_id = %user_id,
            perk_id = %perk.id,
            points_used = perk.points_cost,
            "🎁 perk redeemed"
        );
        Ok(redemption)
    }

    /// The full catalog annotated with affordability for this user.
    pub async fn available_perks(&self, user_id: Uuid) -> Result<Vec<PerkView>> {
        let (total, available) = self.balances(user_id).await?;
        Ok(catalog::PERKS
            .iter()
            .map(|perk| perk_view(perk, total, available))
            .collect())
    }

    /// Redemption history, newest first.
    pub async fn history(&self, user_id: Uuid) -> Result<Vec<Redemption>> {
        let mut rows = self.redemptions.list_by_user(user_id).await?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// (total lifetime points, available points) derived from the stores.
    async fn balances(&self, user_id: Uuid) -> Result<(u64, u64)> {
        let total: u64 = self
            .ledger
            .entries_for_user(user_id)
            .await?
            .iter()
            .map(|e| e.points)
            .sum();
        let redeemed: u64 = self
            .redemptions
            .list_by_user(user_id)
            .await?
            .iter()
            .map(|r| r.points_used)
            .sum();
        Ok((total, total.saturating_sub(redeemed)))
    }
}

fn perk_view(perk: &'static PerkSpec, total: u64, available: u64) -> PerkView {
    let unlocked = perk.min_total_points.map_or(true, |min| total >= min);
    PerkView {
        id: perk.id,
        name: perk.name,
        description: perk.description,
        points_cost: perk.points_cost,
        category: perk.category,
        stock: perk.stock,
        available: unlocked && available >= perk.points_cost,
    }
}
