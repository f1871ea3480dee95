//! # Task Matching Engine
//!
//! Turns an incoming report into a claimable task and serves the
//! available-task feed. The reporter's zone/city/state are snapshotted onto
//! the report at submission time, so later profile edits never move work
//! between zones.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    DomainError, Report, ReportStatus, ReportStore, Result, Severity, Task, TaskStatus, TaskStore,
    UserDirectory,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

/// Payload accepted from the report submission surface.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub landmark: Option<String>,
    pub image_url: Option<String>,
    pub reporter_id: Uuid,
}

/// Payload for manually created work with no originating report.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdhocTask {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub landmark: Option<String>,
    pub zone: String,
    pub city: String,
    pub state: String,
}

/// Fixed payment table, whole currency units per severity.
pub fn estimated_payment(severity: Severity) -> u64 {
    match severity {
        Severity::Low => 25,
        Severity::Medium => 50,
        Severity::High => 100,
        Severity::Critical => 150,
    }
}

/// Human-facing cleanup duration band per severity.
pub fn estimated_duration(severity: Severity) -> &'static str {
    match severity {
        Severity::High | Severity::Critical => "45-60 min",
        Severity::Medium => "30-45 min",
        Severity::Low => "15-30 min",
    }
}

pub struct MatchingService {
    reports: Arc<dyn ReportStore>,
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserDirectory>,
}

impl MatchingService {
    pub fn new(
        reports: Arc<dyn ReportStore>,
        tasks: Arc<dyn TaskStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            reports,
            tasks,
            users,
        }
    }

    /// Creates a report and its derived available task in one logical step.
    pub async fn submit_report(&self, input: NewReport) -> Result<Report> {
        validate_coordinates(input.latitude, input.longitude)?;
        if input.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("title must not be empty".into()));
        }

        let reporter = self
            .users
            .get(input.reporter_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("user", input.reporter_id.to_string()))?;

        let now = Utc::now();
        let report = Report {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            severity: input.severity,
            latitude: input.latitude,
            longitude: input.longitude,
            address: input.address,
            landmark: input.landmark,
            image_url: input.image_url,
            reported_by: reporter.id,
            reporter_zone: reporter.zone,
            reporter_city: reporter.city,
            reporter_state: reporter.state,
            status: ReportStatus::Pending,
            assigned_to: None,
            cleanup_image_url: None,
            created_at: now,
            updated_at: now,
            assigned_at: None,
            started_at: None,
            completed_at: None,
        };

        self.reports.insert(report.clone()).await?;

        let task = derive_task(&report);
        self.tasks.insert(task.clone()).await?;

        info!(
            task_id = %task.id,
            report_id = %report.id,
            zone = %task.zone,
            severity = ?task.severity,
            "🆕 report submitted, task derived"
        );

        Ok(report)
    }

    /// Manual task creation for ad-hoc work (no linked report, no reporter
    /// credit on completion).
    pub async fn create_adhoc_task(&self, input: NewAdhocTask) -> Result<Task> {
        validate_coordinates(input.latitude, input.longitude)?;
        if input.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("title must not be empty".into()));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::now_v7(),
            report_id: None,
            title: input.title,
            description: input.description,
            severity: input.severity,
            latitude: input.latitude,
            longitude: input.longitude,
            address: input.address,
            landmark: input.landmark,
            zone: input.zone,
            city: input.city,
            state: input.state,
            reported_by: None,
            estimated_payment: estimated_payment(input.severity),
            estimated_duration: estimated_duration(input.severity).to_string(),
            status: TaskStatus::Available,
            assigned_to: None,
            weight_collected: None,
            notes: None,
            cleanup_image_url: None,
            created_at: now,
            updated_at: now,
            assigned_at: None,
            started_at: None,
            completed_at: None,
        };

        self.tasks.insert(task.clone()).await?;
        info!(task_id = %task.id, zone = %task.zone, "🆕 ad-hoc task created");
        Ok(task)
    }

    /// The claimable feed: available tasks, optionally restricted to one
    /// zone, ordered by severity priority descending, newest first on ties.
    /// A finite, restartable snapshot; callers re-query rather than stream.
    pub async fn list_available(&self, zone: Option<String>) -> Result<Vec<Task>> {
        let mut tasks = self.tasks.list_available(zone).await?;
        tasks.sort_by(|a, b| {
            b.severity
                .priority()
                .cmp(&a.severity.priority())
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(tasks)
    }

    pub async fn reports_for_user(&self, reporter_id: Uuid) -> Result<Vec<Report>> {
        let mut reports = self.reports.list_by_reporter(reporter_id).await?;
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    pub async fn tasks_for_worker(
        &self,
        worker_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>> {
        let mut tasks = self.tasks.list_by_assignee(worker_id, status).await?;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }
}

/// Pure derivation of the claimable task from a freshly created report.
pub fn derive_task(report: &Report) -> Task {
    let description = if report.description.trim().is_empty() {
        format!("Garbage cleanup needed at {}", report.address)
    } else {
        report.description.clone()
    };

    Task {
        id: Uuid::now_v7(),
        report_id: Some(report.id),
        title: report.title.clone(),
        description,
        severity: report.severity,
        latitude: report.latitude,
        longitude: report.longitude,
        address: report.address.clone(),
        landmark: report.landmark.clone(),
        zone: report.reporter_zone.clone(),
        city: report.reporter_city.clone(),
        state: report.reporter_state.clone(),
        reported_by: Some(report.reported_by),
        estimated_payment: estimated_payment(report.severity),
        estimated_duration: estimated_duration(report.severity).to_string(),
        status: TaskStatus::Available,
        assigned_to: None,
        weight_collected: None,
        notes: None,
        cleanup_image_url: None,
        created_at: report.created_at,
        updated_at: report.created_at,
        assigned_at: None,
        started_at: None,
        completed_at: None,
    }
}

fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(DomainError::InvalidInput(format!(
            "coordinates out of range: ({lat}, {lon})"
        )));
    }
    Ok(())
}
