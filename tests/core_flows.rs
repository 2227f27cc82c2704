use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use worktime_lib::{
    api::{MemoryReportApi, MemoryTaxonomyApi, MemoryWorkApi},
    config::CoreConfig,
    error::TransportError,
    modals::DialogValue,
    models::{TaxonomyItem, TaxonomyPatch, UtcStamp, WorkDay, WorkSegment, WorkSession},
    taxonomy::{LoadOutcome, PatchOutcome},
    ticker::ManualClock,
    toast::ToastLevel,
    CoreApis, WorktimeCore,
};

struct Harness {
    core: WorktimeCore,
    clock: Arc<ManualClock>,
    categories: Arc<MemoryTaxonomyApi>,
    _dir: tempfile::TempDir,
}

fn category(id: i64, name: &str) -> TaxonomyItem {
    TaxonomyItem {
        id: Some(id),
        name: name.to_string(),
        description: Some(format!("{name} work")),
        active: Some(true),
        created_at: None,
        updated_at: None,
    }
}

fn now_whole_seconds() -> DateTime<Utc> {
    DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap()
}

fn interval(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> (UtcStamp, Option<UtcStamp>) {
    (UtcStamp::from(start), end.map(UtcStamp::from))
}

fn segment(id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> WorkSegment {
    let (start_time, end_time) = interval(start, Some(end));
    WorkSegment {
        id,
        work_session_id: Some(1),
        category_id: Some(1),
        category_name: Some("Client".into()),
        activity_id: Some(2),
        activity_name: Some("Dev".into()),
        start_time,
        end_time,
        comment: None,
        created_at: None,
        updated_at: None,
    }
}

fn harness(days: Vec<WorkDay>, now: DateTime<Utc>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(now));
    let categories = Arc::new(MemoryTaxonomyApi::new(vec![
        category(2, "Zeta"),
        category(1, "alpha"),
        category(3, "Beta"),
    ]));
    let apis = CoreApis {
        categories: categories.clone(),
        activities: Arc::new(MemoryTaxonomyApi::new(vec![])),
        work: Arc::new(MemoryWorkApi::new()),
        reports: Arc::new(MemoryReportApi::new(days)),
    };

    let core = WorktimeCore::with_clock(
        CoreConfig::default(),
        apis,
        &dir.path().join("report.json"),
        clock.clone(),
    )
    .unwrap();

    Harness {
        core,
        clock,
        categories,
        _dir: dir,
    }
}

fn names(items: &[TaxonomyItem]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

#[tokio::test]
async fn concurrent_loads_share_one_request() {
    let h = harness(vec![], now_whole_seconds());
    let store = &h.core.categories;
    h.categories.hold_list();

    let release = async {
        tokio::task::yield_now().await;
        h.categories.release_list();
    };
    let (first, second, ()) = tokio::join!(store.load_all(), store.load_all(), release);

    assert_eq!(first, LoadOutcome::Loaded { count: 3 });
    assert_eq!(first, second);
    assert_eq!(h.categories.list_calls(), 1);
    assert_eq!(names(&store.items()), ["alpha", "Beta", "Zeta"]);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn failed_rename_restores_the_entry_exactly() {
    let h = harness(vec![], now_whole_seconds());
    let store = &h.core.categories;
    store.load_all().await;
    let before = store.get(2).unwrap();

    h.categories
        .fail_next_patch(TransportError::new("Name already taken", 409));
    let outcome = store
        .patch_field(2, TaxonomyPatch::name("Aardvark"))
        .await
        .unwrap();

    assert!(matches!(outcome, PatchOutcome::RolledBack(ref e) if e.status == 409));
    assert_eq!(store.get(2).unwrap(), before);
    assert_eq!(names(&store.items()), ["alpha", "Beta", "Zeta"]);

    let toast = h.core.toasts.items().pop().unwrap();
    assert_eq!(toast.level, ToastLevel::Danger);
    assert!(toast.message.contains("Name already taken"));
}

#[tokio::test]
async fn blank_name_never_reaches_the_transport() {
    let h = harness(vec![], now_whole_seconds());
    h.core.categories.load_all().await;

    assert!(h
        .core
        .categories
        .patch_field(1, TaxonomyPatch::name("   "))
        .await
        .is_err());
    assert_eq!(h.categories.patch_calls(), 0);
    assert_eq!(h.core.categories.get(1).unwrap().name, "alpha");
}

#[tokio::test]
async fn second_dialog_cancels_the_first() {
    let h = harness(vec![], now_whole_seconds());
    let modals = &h.core.modals;

    let first = modals.open_datetime("Adjust START time", None);
    let second = modals.open_datetime("Adjust END time", None);

    assert_eq!(first.await, None);
    assert_eq!(
        modals.active().map(|d| d.request.title().to_string()).as_deref(),
        Some("Adjust END time")
    );

    let stamp = UtcStamp::from("2025-01-06T12:00:00.000Z");
    assert!(modals.close(Some(DialogValue::Instant(stamp.clone()))));
    assert_eq!(second.await, Some(DialogValue::Instant(stamp)));
    assert!(!modals.close(None));
}

#[tokio::test]
async fn report_day_splits_allocated_and_unallocated_time() {
    let now = now_whole_seconds();
    let start = now - chrono::Duration::hours(4);
    let (start_time, end_time) = interval(start, Some(now));
    let day = WorkDay {
        day_utc: now.date_naive(),
        sessions: vec![WorkSession {
            id: 1,
            start_time,
            end_time,
            items: vec![
                segment(10, start, start + chrono::Duration::hours(1)),
                segment(11, start + chrono::Duration::hours(1), start + chrono::Duration::hours(3)),
            ],
        }],
    };
    let h = harness(vec![day], now);

    h.core.report.mount().await.unwrap();
    let views = h.core.report.views();
    h.core.report.unmount();

    assert_eq!(views.len(), 1);
    let totals = &views[0].totals;
    assert_eq!(totals.total, "4h 00m 00s");
    assert_eq!(totals.segments, "3h 00m 00s");
    assert_eq!(totals.unallocated, "1h 00m 00s");
    assert_eq!(views[0].sessions[0].duration_label, "4h 00m 00s");
}

#[tokio::test(start_paused = true)]
async fn hidden_page_freezes_running_totals_until_revealed() {
    let now = now_whole_seconds();
    let (start_time, end_time) = interval(now - chrono::Duration::seconds(90), None);
    let day = WorkDay {
        day_utc: now.date_naive(),
        sessions: vec![WorkSession {
            id: 1,
            start_time,
            end_time,
            items: vec![],
        }],
    };
    let h = harness(vec![day], now);

    h.core.report.mount().await.unwrap();
    assert_eq!(h.core.report.views()[0].totals.unallocated, "0h 01m 30s");

    h.core.set_hidden(true);
    h.clock.advance(chrono::Duration::seconds(30));
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(h.core.report.views()[0].totals.total, "0h 01m 30s");

    h.core.set_hidden(false);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.core.report.views()[0].totals.total, "0h 02m 00s");

    h.core.report.unmount();
}
