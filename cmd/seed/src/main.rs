//! Demo data generator. Populates an in-memory store through the real
//! services (so every invariant holds) and writes the result as a snapshot
//! the server can load.
//!
//! Usage: `seed [output-path]` (default `data/cleansight.json`).

use std::sync::Arc;

use domains::{CompletionData, Role, UserDirectory, UserProfile};
use fake::faker::address::en::StreetName;
use fake::faker::name::en::Name;
use fake::Fake;
use services::lifecycle::LifecycleService;
use services::matching::{MatchingService, NewReport};
use storage_adapters::MemoryStore;
use uuid::Uuid;

const ZONES: &[&str] = &[
    "Zone 1 - South Mumbai",
    "Zone 2 - Western Suburbs",
    "Zone 3 - Eastern Suburbs",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let out = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/cleansight.json".to_string());

    let store = Arc::new(MemoryStore::new());
    let matching = MatchingService::new(store.clone(), store.clone(), store.clone());
    let lifecycle = LifecycleService::new(store.clone(), store.clone(), store.clone());

    // Three citizens and two workers spread over the zones.
    let mut citizens = Vec::new();
    for i in 0..3 {
        let citizen = profile(Role::Citizen, ZONES[i % ZONES.len()]);
        store.upsert(citizen.clone()).await?;
        citizens.push(citizen);
    }
    let mut workers = Vec::new();
    for i in 0..2 {
        let worker = profile(Role::Worker, ZONES[i % ZONES.len()]);
        store.upsert(worker.clone()).await?;
        workers.push(worker);
    }

    // A spread of severities; some stay open, some are worked to completion.
    let severities = [
        domains::Severity::Low,
        domains::Severity::Medium,
        domains::Severity::High,
        domains::Severity::Critical,
        domains::Severity::Medium,
        domains::Severity::Low,
    ];
    let mut open = 0usize;
    for (i, &severity) in severities.iter().enumerate() {
        let citizen = &citizens[i % citizens.len()];
        let report = matching
            .submit_report(NewReport {
                title: format!("Waste pile near {}", StreetName().fake::<String>()),
                description: "Accumulated household waste".into(),
                severity,
                latitude: 19.0 + i as f64 * 0.01,
                longitude: 72.8 + i as f64 * 0.01,
                address: format!("{} {}", i + 1, StreetName().fake::<String>()),
                landmark: None,
                image_url: None,
                reporter_id: citizen.id,
            })
            .await?;

        // Complete every other report so the leaderboard has data.
        if i % 2 == 0 {
            let worker = &workers[i % workers.len()];
            let tasks = matching.list_available(Some(report.reporter_zone.clone())).await?;
            if let Some(task) = tasks.iter().find(|t| t.report_id == Some(report.id)) {
                lifecycle.claim(task.id, worker.id).await?;
                lifecycle.start(task.id, worker.id).await?;
                lifecycle
                    .complete(
                        task.id,
                        worker.id,
                        CompletionData {
                            weight_kg: 1.0 + i as f64,
                            notes: Some("seeded completion".into()),
                            cleanup_image_url: None,
                        },
                    )
                    .await?;
            }
        } else {
            open += 1;
        }
    }

    store.save_to_file(&out).await?;
    println!("seeded snapshot written to {out} ({open} tasks left open)");
    Ok(())
}

fn profile(role: Role, zone: &str) -> UserProfile {
    UserProfile {
        id: Uuid::now_v7(),
        full_name: Name().fake(),
        role,
        zone: zone.to_string(),
        city: "Mumbai".to_string(),
        state: "Maharashtra".to_string(),
    }
}
