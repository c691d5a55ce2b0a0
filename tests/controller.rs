use chrono::{Days, NaiveDate, Utc};
use starchart::controller::{CELEBRATION_DELAY, TodayFn};
use starchart::storage::LocalStorage;
use starchart::{Child, Controller, Dialog, Effect, EventStore, StarEvent, ToggleOutcome};
use std::sync::Arc;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
}

fn fixed_clock() -> TodayFn {
    Arc::new(today)
}

/// `count` stars on earlier days, alternating children.
fn history(count: usize) -> Vec<StarEvent> {
    (0..count)
        .map(|i| StarEvent {
            id: i as i64 + 1,
            child: if i % 2 == 0 { Child::A } else { Child::B },
            local_date: today() - Days::new(i as u64 / 2 + 1),
            created_at: Utc::now(),
        })
        .collect()
}

async fn controller_with(
    dir: &tempfile::TempDir,
    seeded: usize,
) -> (Arc<Controller>, Arc<EventStore>) {
    let storage = LocalStorage::new(dir.path().join("star_events.json"));
    storage.save(&history(seeded)).unwrap();
    let store = EventStore::new(None, storage);
    store.initialize().await;
    let controller = Controller::with_clock(store.clone(), fixed_clock());
    assert!(controller.load_data().await);
    (controller, store)
}

#[tokio::test]
async fn load_reflects_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, _store) = controller_with(&dir, 7).await;

    let view = controller.snapshot();
    assert!(view.loaded);
    assert_eq!(view.events.len(), 7);
    assert_eq!(controller.total(), 7);
    assert_eq!(controller.progress().label(), "7 / 60");
    assert!(!controller.has_star_today(Child::A));
}

#[tokio::test]
async fn toggle_adds_then_removes_todays_star() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, store) = controller_with(&dir, 0).await;

    assert_eq!(controller.handle_toggle(Child::A).await, ToggleOutcome::Added);
    assert!(controller.has_star_today(Child::A));
    assert!(!controller.has_star_today(Child::B));
    assert_eq!(controller.total(), 1);
    assert!(!controller.is_toggle_disabled(Child::A));

    assert_eq!(
        controller.handle_toggle(Child::A).await,
        ToggleOutcome::Removed
    );
    assert!(!controller.has_star_today(Child::A));
    assert_eq!(controller.total(), 0);
    assert!(store.local().load().is_empty());

    let effects = controller.drain_effects();
    assert_eq!(
        effects,
        vec![Effect::StarAdded { index: 0 }, Effect::StarRemoved]
    );
    assert!(controller.drain_effects().is_empty());
}

#[tokio::test]
async fn both_children_can_earn_a_star_on_the_same_day() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, _store) = controller_with(&dir, 0).await;

    let (a, b) = tokio::join!(
        controller.handle_toggle(Child::A),
        controller.handle_toggle(Child::B)
    );
    assert_eq!(a, ToggleOutcome::Added);
    assert_eq!(b, ToggleOutcome::Added);
    assert!(controller.has_star_today(Child::A));
    assert!(controller.has_star_today(Child::B));
    assert_eq!(controller.total(), 2);
}

#[tokio::test]
async fn sixth_star_completes_a_row() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, _store) = controller_with(&dir, 5).await;

    controller.handle_toggle(Child::B).await;
    let effects = controller.drain_effects();
    assert_eq!(
        effects,
        vec![Effect::StarAdded { index: 5 }, Effect::RowComplete]
    );
}

#[tokio::test]
async fn seventh_star_is_not_a_milestone() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, _store) = controller_with(&dir, 6).await;

    controller.handle_toggle(Child::A).await;
    assert_eq!(
        controller.drain_effects(),
        vec![Effect::StarAdded { index: 6 }]
    );
}

#[tokio::test]
async fn sixtieth_star_celebrates() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, _store) = controller_with(&dir, 59).await;

    controller.handle_toggle(Child::A).await;
    let effects = controller.drain_effects();
    assert_eq!(
        effects,
        vec![
            Effect::StarAdded { index: 59 },
            Effect::RowComplete,
            Effect::Celebrate {
                after: CELEBRATION_DELAY
            },
        ]
    );
    assert!(controller.progress().complete);

    controller.show_celebration();
    assert_eq!(controller.snapshot().dialog, Dialog::Celebration);
    controller.close_celebration();
    assert_eq!(controller.snapshot().dialog, Dialog::None);
}

#[tokio::test]
async fn removing_from_a_full_chart_does_not_celebrate() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, _store) = controller_with(&dir, 60).await;

    assert!(controller.request_remove(10));
    assert!(controller.confirm_remove().await);
    assert_eq!(controller.total(), 59);
    assert_eq!(controller.drain_effects(), vec![Effect::StarRemoved]);
}

#[tokio::test]
async fn remove_flow_needs_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, _store) = controller_with(&dir, 3).await;

    // Empty slots do not open anything.
    assert!(!controller.request_remove(3));
    assert_eq!(controller.snapshot().dialog, Dialog::None);
    assert!(!controller.confirm_remove().await);

    assert!(controller.request_remove(1));
    assert_eq!(controller.snapshot().dialog, Dialog::Remove { id: 2 });
    controller.cancel_remove();
    assert_eq!(controller.snapshot().dialog, Dialog::None);
    assert_eq!(controller.total(), 3);

    assert!(controller.request_remove(1));
    assert!(controller.confirm_remove().await);
    assert_eq!(controller.snapshot().dialog, Dialog::None);
    let ids: Vec<i64> = controller.snapshot().events.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn reset_requires_exact_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, store) = controller_with(&dir, 12).await;

    controller.open_reset();
    for attempt in ["", "reset", "RESET ", " RESET", "RESE"] {
        controller.set_reset_input(attempt);
        assert!(!controller.reset_input_valid(), "accepted {attempt:?}");
        assert!(!controller.confirm_reset().await);
    }
    assert_eq!(controller.total(), 12);

    controller.set_reset_input("RESE");
    controller.push_reset_char('T');
    assert!(controller.reset_input_valid());
    controller.pop_reset_char();
    assert!(!controller.reset_input_valid());
    controller.push_reset_char('T');

    assert!(controller.confirm_reset().await);
    assert_eq!(controller.total(), 0);
    assert_eq!(controller.snapshot().dialog, Dialog::None);
    assert!(store.local().load().is_empty());
}

#[tokio::test]
async fn cancelled_reset_keeps_everything() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, _store) = controller_with(&dir, 4).await;

    controller.open_reset();
    controller.set_reset_input("RESET");
    controller.cancel_reset();
    assert_eq!(controller.snapshot().dialog, Dialog::None);
    // Without an open dialog there is nothing to confirm.
    assert!(!controller.confirm_reset().await);
    assert_eq!(controller.total(), 4);
}

#[tokio::test]
async fn attached_controller_follows_outside_changes() {
    let dir = tempfile::tempdir().unwrap();
    let (controller, store) = controller_with(&dir, 0).await;
    let reloader = controller.attach();

    // A change made through the store by someone else.
    store
        .add_event(Child::B, today() - Days::new(3))
        .await
        .unwrap();

    for _ in 0..50 {
        if controller.total() == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(controller.total(), 1);
    reloader.abort();
}

#[tokio::test]
async fn adding_a_star_fetches_the_list_once() {
    use mockito::Matcher;

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/rest/v1/star_events")
        .match_query(Matcher::UrlEncoded("limit".into(), "1".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let list = server
        .mock("GET", "/rest/v1/star_events")
        .match_query(Matcher::UrlEncoded("order".into(), "created_at.asc".into()))
        .with_status(200)
        .with_body("[]")
        .expect(2)
        .create_async()
        .await;
    server
        .mock("POST", "/rest/v1/star_events")
        .with_status(201)
        .with_body(
            r#"[{"id":1,"child":"a","local_date":"2024-09-01","created_at":"2024-09-01T17:00:00"}]"#,
        )
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = EventStore::new(
        Some(starchart::RemoteCredentials {
            url: server.url(),
            key: "test-anon-key".to_string(),
        }),
        LocalStorage::new(dir.path().join("star_events.json")),
    );
    store.initialize().await;
    store.stop_polling();
    let controller = Controller::with_clock(store.clone(), fixed_clock());

    controller.load_data().await;
    assert_eq!(controller.handle_toggle(Child::A).await, ToggleOutcome::Added);
    list.assert_async().await;
}
