//! Report intake and the available-task feed: zone filtering, severity
//! ordering, derived fields, and ad-hoc tasks.

use domains::{DomainError, LedgerStore, Role, Severity, TaskStatus};
use integration_tests::{completion, new_report, Harness};
use services::matching::NewAdhocTask;
use uuid::Uuid;

#[tokio::test]
async fn feed_is_scoped_to_the_requested_zone() {
    let h = Harness::new();
    let south = h.user("Priya", Role::Citizen, "Z1").await;
    let north = h.user("Meera", Role::Citizen, "Z2").await;
    let worker = h.user("Asha", Role::Worker, "Z1").await;

    h.submit(&south, Severity::Low, "south site").await;
    let (_, northern) = h.submit(&north, Severity::Low, "north site").await;

    let z1 = h.matching.list_available(Some("Z1".into())).await.unwrap();
    assert_eq!(z1.len(), 1);
    assert!(z1.iter().all(|t| t.zone == "Z1"));

    // Claiming removes the task from every view of the feed.
    h.lifecycle.claim(northern.id, worker.id).await.unwrap();
    assert!(h
        .matching
        .list_available(Some("Z2".into()))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(h.matching.list_available(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn feed_orders_by_severity_then_recency() {
    let h = Harness::new();
    let citizen = h.user("Priya", Role::Citizen, "Z1").await;

    h.submit(&citizen, Severity::Low, "low").await;
    h.submit(&citizen, Severity::Critical, "critical").await;
    h.submit(&citizen, Severity::Medium, "older medium").await;
    h.submit(&citizen, Severity::Medium, "newer medium").await;

    let feed = h.matching.list_available(None).await.unwrap();
    let titles: Vec<&str> = feed.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["critical", "newer medium", "older medium", "low"]);
}

#[tokio::test]
async fn derived_task_carries_the_payment_table() {
    let h = Harness::new();
    let citizen = h.user("Priya", Role::Citizen, "Z1").await;

    let cases = [
        (Severity::Low, 25, "15-30 min"),
        (Severity::Medium, 50, "30-45 min"),
        (Severity::High, 100, "45-60 min"),
        (Severity::Critical, 150, "45-60 min"),
    ];
    for (severity, payment, duration) in cases {
        let (report, task) = h.submit(&citizen, severity, "site").await;
        assert_eq!(task.estimated_payment, payment);
        assert_eq!(task.estimated_duration, duration);
        assert_eq!(task.severity, severity);
        // Location snapshot comes from the reporter's profile.
        assert_eq!(task.zone, "Z1");
        assert_eq!(task.reported_by, Some(citizen.id));
        assert_eq!(task.report_id, Some(report.id));
    }
}

#[tokio::test]
async fn blank_description_gets_a_default() {
    let h = Harness::new();
    let citizen = h.user("Priya", Role::Citizen, "Z1").await;

    let mut input = new_report(&citizen, Severity::Low, "Dump");
    input.description = "   ".into();
    let report = h.matching.submit_report(input).await.unwrap();

    let feed = h.matching.list_available(None).await.unwrap();
    let task = feed
        .iter()
        .find(|t| t.report_id == Some(report.id))
        .unwrap();
    assert_eq!(
        task.description,
        format!("Garbage cleanup needed at {}", report.address)
    );
}

#[tokio::test]
async fn submission_rejects_bad_input() {
    let h = Harness::new();
    let citizen = h.user("Priya", Role::Citizen, "Z1").await;

    let mut blank_title = new_report(&citizen, Severity::Low, "x");
    blank_title.title = "  ".into();
    let err = h.matching.submit_report(blank_title).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    let mut off_map = new_report(&citizen, Severity::Low, "x");
    off_map.latitude = 91.0;
    let err = h.matching.submit_report(off_map).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    let mut ghost = new_report(&citizen, Severity::Low, "x");
    ghost.reporter_id = Uuid::now_v7();
    let err = h.matching.submit_report(ghost).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound("user", _)));

    // Nothing leaked into the feed.
    assert!(h.matching.list_available(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn adhoc_tasks_complete_without_a_reporter_credit() {
    let h = Harness::new();
    let worker = h.user("Asha", Role::Worker, "Z3").await;

    let task = h
        .matching
        .create_adhoc_task(NewAdhocTask {
            title: "Drive leftovers".into(),
            description: "Post-event sweep".into(),
            severity: Severity::Medium,
            latitude: 19.1,
            longitude: 72.9,
            address: "Juhu beach, north end".into(),
            landmark: None,
            zone: "Z3".into(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
        })
        .await
        .unwrap();
    assert_eq!(task.report_id, None);
    assert_eq!(task.status, TaskStatus::Available);

    h.lifecycle.claim(task.id, worker.id).await.unwrap();
    h.lifecycle.start(task.id, worker.id).await.unwrap();
    h.lifecycle
        .complete(task.id, worker.id, completion(2.0))
        .await
        .unwrap();

    // Only the worker is credited; there is no reporter to share with.
    let all = LedgerStore::entries_since(h.store.as_ref(), None)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].user_id, worker.id);
    assert_eq!(all[0].report_id, None);
}

#[tokio::test]
async fn worker_task_lists_filter_by_status() {
    let h = Harness::new();
    let citizen = h.user("Priya", Role::Citizen, "Z1").await;
    let worker = h.user("Asha", Role::Worker, "Z1").await;

    let (_, first) = h.submit(&citizen, Severity::Low, "first").await;
    let (_, second) = h.submit(&citizen, Severity::Low, "second").await;
    h.lifecycle.claim(first.id, worker.id).await.unwrap();
    h.lifecycle.claim(second.id, worker.id).await.unwrap();
    h.lifecycle.start(second.id, worker.id).await.unwrap();

    let all = h.matching.tasks_for_worker(worker.id, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let in_progress = h
        .matching
        .tasks_for_worker(worker.id, Some(TaskStatus::InProgress))
        .await
        .unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].id, second.id);
}

#[tokio::test]
async fn reporters_see_their_own_reports_newest_first() {
    let h = Harness::new();
    let priya = h.user("Priya", Role::Citizen, "Z1").await;
    let meera = h.user("Meera", Role::Citizen, "Z1").await;

    h.submit(&priya, Severity::Low, "older").await;
    h.submit(&priya, Severity::Low, "newer").await;
    h.submit(&meera, Severity::Low, "someone else's").await;

    let mine = h.matching.reports_for_user(priya.id).await.unwrap();
    let titles: Vec<&str> = mine.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["newer", "older"]);
}
