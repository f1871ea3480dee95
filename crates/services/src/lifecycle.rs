//! # Task Lifecycle Controller
//!
//! Enforces the strictly linear claim → start → complete state machine and
//! the single-ownership invariant. Every transition is a compare-and-swap on
//! the task store: the status precondition is checked and the new record
//! installed in one indivisible step, so two racing claims can never both
//! succeed. Reward ledger entries are appended only after the completing
//! swap lands, which makes completion idempotent from the caller's view.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    CompletionData, DomainError, LedgerStore, Report, ReportStatus, ReportStore, Result, Task,
    TaskStatus, TaskStore,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::rewards;

pub struct LifecycleService {
    reports: Arc<dyn ReportStore>,
    tasks: Arc<dyn TaskStore>,
    ledger: Arc<dyn LedgerStore>,
}

impl LifecycleService {
    pub fn new(
        reports: Arc<dyn ReportStore>,
        tasks: Arc<dyn TaskStore>,
        ledger: Arc<dyn LedgerStore>,
    ) -> Self {
        Self {
            reports,
            tasks,
            ledger,
        }
    }

    /// Claims an available task for a worker. Of N concurrent claims on the
    /// same task exactly one succeeds; the rest observe `AlreadyClaimed`.
    pub async fn claim(&self, task_id: Uuid, worker_id: Uuid) -> Result<Task> {
        let task = self.get_task(task_id).await?;
        if task.status != TaskStatus::Available {
            return Err(DomainError::AlreadyClaimed(task_id));
        }

        let now = Utc::now();
        let mut updated = task;
        updated.status = TaskStatus::Assigned;
        updated.assigned_to = Some(worker_id);
        updated.assigned_at = Some(now);
        updated.updated_at = now;

        if !self
            .tasks
            .compare_and_swap(task_id, TaskStatus::Available, updated.clone())
            .await?
        {
            // Lost the race: another worker's swap landed first.
            return Err(DomainError::AlreadyClaimed(task_id));
        }

        self.mirror_report(&updated, ReportStatus::Assigned).await?;

        info!(task_id = %task_id, worker_id = %worker_id, "🤝 task claimed");
        Ok(updated)
    }

    /// Moves a claimed task into progress. Only the assigned worker may do so.
    pub async fn start(&self, task_id: Uuid, worker_id: Uuid) -> Result<Task> {
        let task = self.get_task(task_id).await?;
        check_assignee(&task, worker_id)?;
        match task.status {
            TaskStatus::Assigned => {}
            TaskStatus::InProgress => return Err(DomainError::AlreadyStarted(task_id)),
            TaskStatus::Completed => return Err(DomainError::AlreadyCompleted(task_id)),
            // Unreachable once the assignee check passed, kept for totality.
            TaskStatus::Available => return Err(DomainError::WrongAssignee(task_id)),
        }

        let now = Utc::now();
        let mut updated = task;
        updated.status = TaskStatus::InProgress;
        updated.started_at = Some(now);
        updated.updated_at = now;

        if !self
            .tasks
            .compare_and_swap(task_id, TaskStatus::Assigned, updated.clone())
            .await?
        {
            return Err(DomainError::AlreadyStarted(task_id));
        }

        self.mirror_report(&updated, ReportStatus::InProgress)
            .await?;

        info!(task_id = %task_id, worker_id = %worker_id, "▶ task started");
        Ok(updated)
    }

    /// Completes an in-progress task and issues rewards exactly once.
    /// Re-invoking on a completed task fails with `AlreadyCompleted` and
    /// issues nothing.
    pub async fn complete(
        &self,
        task_id: Uuid,
        worker_id: Uuid,
        completion: CompletionData,
    ) -> Result<Task> {
        if !(completion.weight_kg >= 0.0) || !completion.weight_kg.is_finite() {
            return Err(DomainError::InvalidInput(format!(
                "collected weight must be a non-negative number, got {}",
                completion.weight_kg
            )));
        }

        let task = self.get_task(task_id).await?;
        check_assignee(&task, worker_id)?;
        match task.status {
            TaskStatus::InProgress => {}
            TaskStatus::Completed => return Err(DomainError::AlreadyCompleted(task_id)),
            TaskStatus::Assigned => return Err(DomainError::NotStarted(task_id)),
            TaskStatus::Available => return Err(DomainError::WrongAssignee(task_id)),
        }

        let now = Utc::now();
        let mut updated = task;
        updated.status = TaskStatus::Completed;
        updated.completed_at = Some(now);
        updated.updated_at = now;
        updated.weight_collected = Some(completion.weight_kg);
        updated.notes = completion.notes.clone();
        updated.cleanup_image_url = completion.cleanup_image_url.clone();

        if !self
            .tasks
            .compare_and_swap(task_id, TaskStatus::InProgress, updated.clone())
            .await?
        {
            return Err(DomainError::AlreadyCompleted(task_id));
        }

        if let Some(report) = self.mirror_report(&updated, ReportStatus::Completed).await? {
            // The winning swap is also the commit point for the rewards.
            self.issue_rewards(&updated, worker_id, Some(&report), completion.weight_kg)
                .await?;
        } else {
            self.issue_rewards(&updated, worker_id, None, completion.weight_kg)
                .await?;
        }

        info!(
            task_id = %task_id,
            worker_id = %worker_id,
            weight_kg = completion.weight_kg,
            "✅ task completed"
        );
        Ok(updated)
    }

    /// Deletes a still-pending report on behalf of its reporter, together
    /// with the derived task and (defensively) any ledger rows referencing
    /// it. A pending report can have earned nothing.
    pub async fn delete_if_pending(&self, report_id: Uuid, requester_id: Uuid) -> Result<()> {
        let report = self
            .reports
            .get(report_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("report", report_id.to_string()))?;

        if report.reported_by != requester_id {
            return Err(DomainError::Forbidden(
                "only the reporter may delete a report".into(),
            ));
        }
        if report.status != ReportStatus::Pending {
            return Err(DomainError::NotDeletable(report_id));
        }

        let removed_tasks = self.tasks.delete_by_report(report_id).await?;
        let purged = self.ledger.purge_report(report_id).await?;
        if purged > 0 {
            warn!(report_id = %report_id, purged, "pending report had ledger rows; purged");
        }
        self.reports.delete(report_id).await?;

        info!(report_id = %report_id, removed_tasks, "🗑 pending report deleted");
        Ok(())
    }

    async fn get_task(&self, task_id: Uuid) -> Result<Task> {
        self.tasks
            .get(task_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("task", task_id.to_string()))
    }

    /// Propagates a task transition onto the linked report, if any. The
    /// report id is checked defensively; a dangling link is skipped rather
    /// than treated as fatal.
    async fn mirror_report(
        &self,
        task: &Task,
        status: ReportStatus,
    ) -> Result<Option<Report>> {
        let Some(report_id) = task.report_id else {
            return Ok(None);
        };
        let Some(mut report) = self.reports.get(report_id).await? else {
            warn!(task_id = %task.id, report_id = %report_id, "task references missing report");
            return Ok(None);
        };

        report.status = status;
        report.assigned_to = task.assigned_to;
        report.assigned_at = task.assigned_at;
        report.started_at = task.started_at;
        report.completed_at = task.completed_at;
        report.cleanup_image_url = task.cleanup_image_url.clone();
        report.updated_at = task.updated_at;

        self.reports.put(report.clone()).await?;
        Ok(Some(report))
    }

    async fn issue_rewards(
        &self,
        task: &Task,
        worker_id: Uuid,
        report: Option<&Report>,
        weight_kg: f64,
    ) -> Result<()> {
        let split = rewards::completion_rewards(weight_kg);
        let at = task.completed_at.unwrap_or_else(Utc::now);

        self.ledger
            .append(rewards::worker_entry(
                worker_id,
                task.report_id,
                weight_kg,
                split,
                at,
            ))
            .await?;
        info!(
            worker_id = %worker_id,
            points = split.worker_points,
            earnings = split.worker_earnings,
            "💰 worker credited"
        );

        if let Some(report) = report {
            self.ledger
                .append(rewards::reporter_entry(
                    report.reported_by,
                    report.id,
                    weight_kg,
                    split,
                    at,
                ))
                .await?;
            info!(
                reporter_id = %report.reported_by,
                points = split.reporter_points,
                "💰 reporter credited"
            );
        }

        Ok(())
    }
}

fn check_assignee(task: &Task, worker_id: Uuid) -> Result<()> {
    if task.assigned_to != Some(worker_id) {
        return Err(DomainError::WrongAssignee(task.id));
    }
    Ok(())
}
