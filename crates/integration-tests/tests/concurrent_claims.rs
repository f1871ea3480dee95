//! Races on the engine's serialization points: of N concurrent claims on one
//! task exactly one may win, of N concurrent completions exactly one may
//! credit the ledger, and concurrent redemptions may never overdraw a
//! balance.

use std::sync::Arc;

use domains::{DomainError, LedgerStore, Role, Severity, TaskStatus, TaskStore};
use integration_tests::{completion, Harness};
use tokio::sync::Barrier;

const RACERS: usize = 32;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn exactly_one_concurrent_claim_wins() {
    let h = Harness::new();
    let citizen = h.user("Priya", Role::Citizen, "Z1").await;
    let (_, task) = h.submit(&citizen, Severity::High, "Dump").await;

    let mut workers = Vec::with_capacity(RACERS);
    for i in 0..RACERS {
        workers.push(h.user(&format!("Worker {i}"), Role::Worker, "Z1").await);
    }

    let mut handles = Vec::with_capacity(RACERS);
    for worker in &workers {
        let lifecycle = h.lifecycle.clone();
        let (task_id, worker_id) = (task.id, worker.id);
        handles.push(tokio::spawn(async move {
            lifecycle.claim(task_id, worker_id).await
        }));
    }

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(claimed) => winners.push(claimed),
            Err(DomainError::AlreadyClaimed(_)) => conflicts += 1,
            Err(other) => panic!("unexpected claim error: {other}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts, RACERS - 1);

    // The stored record agrees with the single winner.
    let stored = TaskStore::get(h.store.as_ref(), task.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, TaskStatus::Assigned);
    assert_eq!(stored.assigned_to, winners[0].assigned_to);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_completions_credit_the_ledger_once() {
    let h = Harness::new();
    let citizen = h.user("Priya", Role::Citizen, "Z1").await;
    let worker = h.user("Asha", Role::Worker, "Z1").await;

    let (_, task) = h.submit(&citizen, Severity::Medium, "Dump").await;
    h.lifecycle.claim(task.id, worker.id).await.unwrap();
    h.lifecycle.start(task.id, worker.id).await.unwrap();

    let mut handles = Vec::with_capacity(RACERS);
    for _ in 0..RACERS {
        let lifecycle = h.lifecycle.clone();
        let (task_id, worker_id) = (task.id, worker.id);
        handles.push(tokio::spawn(async move {
            lifecycle.complete(task_id, worker_id, completion(2.0)).await
        }));
    }

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(DomainError::AlreadyCompleted(_)) => conflicts += 1,
            Err(other) => panic!("unexpected completion error: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, RACERS - 1);

    // Exactly one cleanup credit and one reporter credit, despite the race.
    let worker_entries = LedgerStore::entries_for_user(h.store.as_ref(), worker.id)
        .await
        .unwrap();
    let citizen_entries = LedgerStore::entries_for_user(h.store.as_ref(), citizen.id)
        .await
        .unwrap();
    assert_eq!(worker_entries.len(), 1);
    assert_eq!(citizen_entries.len(), 1);
    assert_eq!(worker_entries[0].points, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_redemptions_never_overdraw_the_balance() {
    let h = Harness::new();
    let citizen = h.user("Priya", Role::Citizen, "Z1").await;
    let worker = h.user("Asha", Role::Worker, "Z1").await;

    // 4 kg * 50 = 200 points: exactly one bottle's worth.
    h.completed_cycle(&citizen, &worker, Severity::Medium, 4.0).await;

    let barrier = Arc::new(Barrier::new(8));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let redemption = h.redemption.clone();
        let barrier = barrier.clone();
        let user_id = worker.id;
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            redemption.redeem(user_id, "eco_bottle").await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(DomainError::InsufficientPoints { .. }) => {}
            Err(other) => panic!("unexpected redemption error: {other}"),
        }
    }

    assert_eq!(successes, 1);

    // The invariant holds with real subtraction, not clamping.
    let stats = h.aggregator.user_stats(worker.id).await.unwrap();
    assert_eq!(stats.total_points, 200);
    assert_eq!(stats.redeemed_points, 200);
    assert_eq!(stats.available_points, 0);
    assert_eq!(h.redemption.history(worker.id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn racing_workers_split_a_pool_of_tasks_without_overlap() {
    let h = Harness::new();
    let citizen = h.user("Priya", Role::Citizen, "Z1").await;

    let mut task_ids = Vec::new();
    for i in 0..8 {
        let (_, task) = h.submit(&citizen, Severity::Low, &format!("site {i}")).await;
        task_ids.push(task.id);
    }

    // Every worker tries to grab every task; each task must end up with one
    // claimant and the feed must drain completely.
    let mut handles = Vec::new();
    for i in 0..RACERS {
        let worker = h.user(&format!("Worker {i}"), Role::Worker, "Z1").await;
        for &task_id in &task_ids {
            let lifecycle = h.lifecycle.clone();
            let worker_id = worker.id;
            handles.push(tokio::spawn(async move {
                lifecycle.claim(task_id, worker_id).await
            }));
        }
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(DomainError::AlreadyClaimed(_)) => {}
            Err(other) => panic!("unexpected claim error: {other}"),
        }
    }

    assert_eq!(wins, task_ids.len());
    assert!(h.matching.list_available(None).await.unwrap().is_empty());
    for task_id in task_ids {
        let stored = TaskStore::get(h.store.as_ref(), task_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, TaskStatus::Assigned);
        assert!(stored.assigned_to.is_some());
    }
}
