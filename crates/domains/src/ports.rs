//! # Core Traits (Ports)
//!
//! Any storage or identity adapter must implement these traits to be used by
//! the services and binaries. All methods return typed domain errors;
//! infrastructure faults map to `DomainError::Internal`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Redemption, Report, RewardEntry, Task, TaskStatus, UserProfile};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Persistence contract for citizen reports.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, report: Report) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Report>>;
    /// Whole-record replacement keyed by `report.id`.
    async fn put(&self, report: Report) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn list_by_reporter(&self, reporter_id: Uuid) -> Result<Vec<Report>>;
}

/// Persistence contract for tasks; the single source of truth for task state.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: Task) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Task>>;

    /// All tasks with `status == Available` and no assignee, optionally
    /// restricted to an exact zone match. Ordering is left to the caller.
    async fn list_available(&self, zone: Option<String>) -> Result<Vec<Task>>;

    async fn list_by_assignee(
        &self,
        worker_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>>;

    /// Atomically replaces the stored record iff its current status matches
    /// `expected`. Returns `false` when the precondition no longer holds
    /// (someone else transitioned the task first). This is the indivisible
    /// step every lifecycle transition is built on.
    async fn compare_and_swap(&self, id: Uuid, expected: TaskStatus, updated: Task)
        -> Result<bool>;

    /// Removes tasks derived from the given report. Returns how many went.
    async fn delete_by_report(&self, report_id: Uuid) -> Result<usize>;
}

/// Append-only reward ledger. Iteration order of the listing methods is
/// insertion order; the aggregator relies on it as the stable tie-break.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append(&self, entry: RewardEntry) -> Result<()>;
    async fn entries_for_user(&self, user_id: Uuid) -> Result<Vec<RewardEntry>>;
    /// All entries created at or after `since` (all entries when `None`).
    async fn entries_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<RewardEntry>>;
    /// Defensive cleanup used only when a still-pending report is deleted;
    /// such a report can have earned nothing, so this normally removes zero
    /// rows. Returns how many were removed.
    async fn purge_report(&self, report_id: Uuid) -> Result<usize>;
}

/// Append-only record of perk redemptions.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait RedemptionStore: Send + Sync {
    async fn append(&self, redemption: Redemption) -> Result<()>;
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Redemption>>;
}

/// Read-mostly identity directory fed by the upstream identity provider.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn upsert(&self, profile: UserProfile) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<UserProfile>>;
}
