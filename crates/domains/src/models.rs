//! # Domain Models
//!
//! These structs represent the core entities of CleanSight.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How urgent a reported site is. Drives payment estimation and
/// the ordering of the available-task feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Sort weight for the available-task feed (higher surfaces first).
    pub fn priority(self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }
}

/// Lifecycle of a citizen report. Transitions are driven only by the
/// lifecycle controller mirroring the linked task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
}

/// Lifecycle of a claimable task: strictly linear,
/// available → assigned → in_progress → completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Available,
    Assigned,
    InProgress,
    Completed,
}

/// Actor classes known to the reward economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Worker,
    Institution,
    Admin,
}

/// A citizen-submitted record of a waste site needing attention.
///
/// Location fields (`reporter_zone`/`reporter_city`/`reporter_state`) are a
/// snapshot taken at submission time so later profile edits never move a
/// report between zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub landmark: Option<String>,
    /// Opaque handle supplied by the image collaborator; never interpreted.
    pub image_url: Option<String>,
    pub reported_by: Uuid,
    pub reporter_zone: String,
    pub reporter_city: String,
    pub reporter_state: String,
    pub status: ReportStatus,
    pub assigned_to: Option<Uuid>,
    pub cleanup_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// The claimable unit of work, derived 1:1 from a report (or created ad hoc
/// with `report_id = None`).
///
/// Invariant: `assigned_to` is `None` iff `status == Available`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub report_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub landmark: Option<String>,
    /// Zone is the sole eligibility filter for matching.
    pub zone: String,
    pub city: String,
    pub state: String,
    pub reported_by: Option<Uuid>,
    /// Fixed-table estimate in whole currency units, derived from severity.
    pub estimated_payment: u64,
    /// Human-facing duration band, e.g. "30-45 min".
    pub estimated_duration: String,
    pub status: TaskStatus,
    pub assigned_to: Option<Uuid>,
    pub weight_collected: Option<f64>,
    pub notes: Option<String>,
    pub cleanup_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// What a worker reports when closing out a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionData {
    /// Collected weight in kilograms. Must be non-negative.
    pub weight_kg: f64,
    pub notes: Option<String>,
    /// Opaque post-cleanup image handle; the upload itself happens elsewhere.
    pub cleanup_image_url: Option<String>,
}

/// Why a ledger entry was credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Worker credit for completing a cleanup.
    CleanupCompletion,
    /// Reporter credit when their report reaches completion.
    ReportCompletion,
}

/// An immutable credit of points/earnings/weight to a user.
/// Entries are created exactly once per completion event and never revisited;
/// every summary is re-derived from these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub report_id: Option<Uuid>,
    pub points: u64,
    /// Whole currency units.
    pub earnings: u64,
    /// Kilograms, kept alongside points for auditability.
    pub weight: f64,
    pub kind: RewardKind,
    pub created_at: DateTime<Utc>,
}

/// Fulfilment state of a redemption. Advanced by an external process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Fulfilled,
}

/// A debit against a user's available points in exchange for a catalog perk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub id: Uuid,
    pub user_id: Uuid,
    pub perk_id: String,
    pub perk_name: String,
    pub points_used: u64,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read-mostly identity snapshot from the upstream identity provider.
/// No reward totals live here; the ledger is the only source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub zone: String,
    pub city: String,
    pub state: String,
}
