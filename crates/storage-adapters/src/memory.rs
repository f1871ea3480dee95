//! In-memory implementation of every store port.
//!
//! Keyed collections live in `DashMap`s; the append-only ledger and
//! redemption log live in ordered `Vec`s behind an `RwLock`, because their
//! insertion order is part of the contract (the aggregator's stable
//! tie-break). Task state transitions go through `compare_and_swap`, which
//! checks the status precondition and installs the new record while holding
//! the entry lock, the indivisible step the claim invariant needs.

use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use domains::{
    DomainError, LedgerStore, Redemption, RedemptionStore, Report, ReportStore, Result,
    RewardEntry, Task, TaskStatus, TaskStore, UserDirectory, UserProfile,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Serialized form of the whole store; what `cmd/seed` writes and the server
/// loads at startup.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub reports: Vec<Report>,
    pub tasks: Vec<Task>,
    pub users: Vec<UserProfile>,
    pub ledger: Vec<RewardEntry>,
    pub redemptions: Vec<Redemption>,
}

#[derive(Default)]
pub struct MemoryStore {
    reports: DashMap<Uuid, Report>,
    tasks: DashMap<Uuid, Task>,
    users: DashMap<Uuid, UserProfile>,
    ledger: RwLock<Vec<RewardEntry>>,
    redemptions: RwLock<Vec<Redemption>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            reports: snapshot.reports.into_iter().map(|r| (r.id, r)).collect(),
            tasks: snapshot.tasks.into_iter().map(|t| (t.id, t)).collect(),
            users: snapshot.users.into_iter().map(|u| (u.id, u)).collect(),
            ledger: RwLock::new(snapshot.ledger),
            redemptions: RwLock::new(snapshot.redemptions),
        }
    }

    /// A point-in-time copy of all five collections. Keyed collections are
    /// emitted in creation order so snapshots diff cleanly.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let mut reports: Vec<Report> = self.reports.iter().map(|e| e.value().clone()).collect();
        reports.sort_by_key(|r| r.created_at);
        let mut tasks: Vec<Task> = self.tasks.iter().map(|e| e.value().clone()).collect();
        tasks.sort_by_key(|t| t.created_at);
        let mut users: Vec<UserProfile> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by_key(|u| u.id);

        Ok(Snapshot {
            reports,
            tasks,
            users,
            ledger: self.read_ledger()?.clone(),
            redemptions: self
                .redemptions
                .read()
                .map_err(|_| poisoned("redemptions"))?
                .clone(),
        })
    }

    /// Loads a snapshot file, or starts empty when the file does not exist.
    pub async fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            info!(path = %path.display(), "no snapshot found, starting with an empty store");
            return Ok(Self::new());
        }
        let raw = tokio::fs::read(path).await?;
        let snapshot: Snapshot = serde_json::from_slice(&raw)?;
        info!(
            path = %path.display(),
            reports = snapshot.reports.len(),
            tasks = snapshot.tasks.len(),
            "store snapshot loaded"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let snapshot = self.snapshot().map_err(|e| anyhow::anyhow!(e))?;
        let raw = serde_json::to_vec_pretty(&snapshot)?;
        if let Some(parent) = path.as_ref().parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path.as_ref(), raw).await?;
        Ok(())
    }

    fn read_ledger(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<RewardEntry>>> {
        self.ledger.read().map_err(|_| poisoned("ledger"))
    }
}

fn poisoned(what: &str) -> DomainError {
    DomainError::Internal(format!("{what} lock poisoned"))
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert(&self, report: Report) -> Result<()> {
        self.reports.insert(report.id, report);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Report>> {
        Ok(self.reports.get(&id).map(|e| e.value().clone()))
    }

    async fn put(&self, report: Report) -> Result<()> {
        self.reports.insert(report.id, report);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.reports.remove(&id);
        Ok(())
    }

    async fn list_by_reporter(&self, reporter_id: Uuid) -> Result<Vec<Report>> {
        Ok(self
            .reports
            .iter()
            .filter(|e| e.value().reported_by == reporter_id)
            .map(|e| e.value().clone())
            .collect())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: Task) -> Result<()> {
        self.tasks.insert(task.id, task);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        Ok(self.tasks.get(&id).map(|e| e.value().clone()))
    }

    async fn list_available(&self, zone: Option<String>) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .iter()
            .filter(|e| {
                let task = e.value();
                task.status == TaskStatus::Available
                    && task.assigned_to.is_none()
                    && zone.as_deref().map_or(true, |z| task.zone == z)
            })
            .map(|e| e.value().clone())
            .collect())
    }

    async fn list_by_assignee(
        &self,
        worker_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .iter()
            .filter(|e| {
                let task = e.value();
                task.assigned_to == Some(worker_id)
                    && status.map_or(true, |s| task.status == s)
            })
            .map(|e| e.value().clone())
            .collect())
    }

    async fn compare_and_swap(
        &self,
        id: Uuid,
        expected: TaskStatus,
        updated: Task,
    ) -> Result<bool> {
        // get_mut holds the shard lock for the whole check-and-set, so no
        // other caller can interleave between the status check and the write.
        match self.tasks.get_mut(&id) {
            Some(mut entry) => {
                if entry.status != expected {
                    return Ok(false);
                }
                *entry = updated;
                Ok(true)
            }
            None => Err(DomainError::NotFound("task", id.to_string())),
        }
    }

    async fn delete_by_report(&self, report_id: Uuid) -> Result<usize> {
        let doomed: Vec<Uuid> = self
            .tasks
            .iter()
            .filter(|e| e.value().report_id == Some(report_id))
            .map(|e| *e.key())
            .collect();
        for id in &doomed {
            self.tasks.remove(id);
        }
        Ok(doomed.len())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn append(&self, entry: RewardEntry) -> Result<()> {
        self.ledger
            .write()
            .map_err(|_| poisoned("ledger"))?
            .push(entry);
        Ok(())
    }

    async fn entries_for_user(&self, user_id: Uuid) -> Result<Vec<RewardEntry>> {
        Ok(self
            .read_ledger()?
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn entries_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<RewardEntry>> {
        Ok(self
            .read_ledger()?
            .iter()
            .filter(|e| since.map_or(true, |s| e.created_at >= s))
            .cloned()
            .collect())
    }

    async fn purge_report(&self, report_id: Uuid) -> Result<usize> {
        let mut ledger = self.ledger.write().map_err(|_| poisoned("ledger"))?;
        let before = ledger.len();
        ledger.retain(|e| e.report_id != Some(report_id));
        Ok(before - ledger.len())
    }
}

#[async_trait]
impl RedemptionStore for MemoryStore {
    async fn append(&self, redemption: Redemption) -> Result<()> {
        self.redemptions
            .write()
            .map_err(|_| poisoned("redemptions"))?
            .push(redemption);
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Redemption>> {
        Ok(self
            .redemptions
            .read()
            .map_err(|_| poisoned("redemptions"))?
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn upsert(&self, profile: UserProfile) -> Result<()> {
        self.users.insert(profile.id, profile);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.users.get(&id).map(|e| e.value().clone()))
    }
}
