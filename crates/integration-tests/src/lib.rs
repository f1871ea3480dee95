//! Shared fixtures for the end-to-end suites: one in-memory store wired
//! through the real services, plus helpers to mint users and walk reports
//! through the full lifecycle.

use std::sync::Arc;

use api_adapters::AppState;
use domains::{
    CompletionData, Report, ReportStore, Role, Severity, Task, TaskStore, UserDirectory,
    UserProfile,
};
use services::aggregate::AggregatorService;
use services::lifecycle::LifecycleService;
use services::matching::{MatchingService, NewReport};
use services::redemption::RedemptionService;
use storage_adapters::MemoryStore;
use uuid::Uuid;

/// The whole engine over a single fresh in-memory store.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub matching: Arc<MatchingService>,
    pub lifecycle: Arc<LifecycleService>,
    pub aggregator: Arc<AggregatorService>,
    pub redemption: Arc<RedemptionService>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let matching = Arc::new(MatchingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let lifecycle = Arc::new(LifecycleService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let aggregator = Arc::new(AggregatorService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let redemption = Arc::new(RedemptionService::new(store.clone(), store.clone()));

        Self {
            store,
            matching,
            lifecycle,
            aggregator,
            redemption,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            matching: self.matching.clone(),
            lifecycle: self.lifecycle.clone(),
            aggregator: self.aggregator.clone(),
            redemption: self.redemption.clone(),
        }
    }

    /// Registers a user in the directory and returns the profile.
    pub async fn user(&self, name: &str, role: Role, zone: &str) -> UserProfile {
        let profile = UserProfile {
            id: Uuid::now_v7(),
            full_name: name.to_string(),
            role,
            zone: zone.to_string(),
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
        };
        UserDirectory::upsert(self.store.as_ref(), profile.clone())
            .await
            .unwrap();
        profile
    }

    /// Submits a report and returns it together with the derived task.
    pub async fn submit(
        &self,
        reporter: &UserProfile,
        severity: Severity,
        title: &str,
    ) -> (Report, Task) {
        let report = self
            .matching
            .submit_report(new_report(reporter, severity, title))
            .await
            .unwrap();
        let task = TaskStore::list_available(self.store.as_ref(), None)
            .await
            .unwrap()
            .into_iter()
            .find(|t| t.report_id == Some(report.id))
            .expect("submitted report must derive a task");
        (report, task)
    }

    /// Runs one report through submit → claim → start → complete.
    pub async fn completed_cycle(
        &self,
        reporter: &UserProfile,
        worker: &UserProfile,
        severity: Severity,
        weight_kg: f64,
    ) -> (Report, Task) {
        let (report, task) = self.submit(reporter, severity, "cycle").await;
        self.lifecycle.claim(task.id, worker.id).await.unwrap();
        self.lifecycle.start(task.id, worker.id).await.unwrap();
        let task = self
            .lifecycle
            .complete(task.id, worker.id, completion(weight_kg))
            .await
            .unwrap();
        let report = ReportStore::get(self.store.as_ref(), report.id)
            .await
            .unwrap()
            .unwrap();
        (report, task)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn new_report(reporter: &UserProfile, severity: Severity, title: &str) -> NewReport {
    NewReport {
        title: title.to_string(),
        description: "Overflowing bin and scattered waste".to_string(),
        severity,
        latitude: 19.076,
        longitude: 72.877,
        address: "Linking Road, Bandra West".to_string(),
        landmark: Some("opposite the bus depot".to_string()),
        image_url: None,
        reporter_id: reporter.id,
    }
}

pub fn completion(weight_kg: f64) -> CompletionData {
    CompletionData {
        weight_kg,
        notes: Some("site cleared".to_string()),
        cleanup_image_url: Some("uploads/after.jpg".to_string()),
    }
}
