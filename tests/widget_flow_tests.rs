mod common;

use common::{community, DownStore, FakeReddit, RecordingStore};
use serde_json::json;
use shared::config::WidgetConfig;
use shared::{CacheKeys, Identity, KeyValueStore, Username};
use std::sync::Arc;
use std::time::Duration;
use upv_widget::domains::ledger::BalanceLedger;
use upv_widget::domains::widget::state::{BalanceState, CommunityState, IdentityState};
use upv_widget::domains::widget::{FormValues, WidgetPhase, WidgetServices, WidgetSession};

fn services(store: Arc<dyn KeyValueStore>, default_balance: i64) -> WidgetServices {
    WidgetServices {
        ledger: BalanceLedger::new(store),
        settings: Arc::new(WidgetConfig {
            default_balance,
            ..WidgetConfig::default()
        }),
        initialize_on_first_read: true,
    }
}

fn read_only_services(store: Arc<dyn KeyValueStore>) -> WidgetServices {
    WidgetServices {
        initialize_on_first_read: false,
        ..services(store, 100)
    }
}

fn form(name: &str) -> FormValues {
    serde_json::from_value(json!({ "subreddit": name })).unwrap()
}

#[tokio::test]
async fn test_full_session_flow() {
    let store = Arc::new(RecordingStore::default());
    let reddit = Arc::new(
        FakeReddit::new()
            .with_user("alice")
            .with_community(community("AskReddit", 1_234_567, Some(4321)), Some("#FF4500")),
    );
    let session = WidgetSession::new(services(store.clone(), 250), reddit.clone());

    session.mount(reddit.as_ref()).await;

    let state = session.snapshot();
    assert_eq!(state.phase(), WidgetPhase::AwaitingCommunitySelection);
    assert_eq!(state.balance, BalanceState::Loaded { balance: Some(250) });
    let text = session.render().plain_text();
    assert!(text.contains("u/alice"), "{}", text);
    assert!(text.contains("250 $UPV"), "{}", text);
    assert!(text.contains("Discover and choose which subreddit to invest."));

    session.submit_form(&form("r/AskReddit")).await;

    let state = session.snapshot();
    assert_eq!(state.phase(), WidgetPhase::CommunityDataLoaded);
    let snapshot = state.community.visible_snapshot().unwrap();
    assert_eq!(snapshot.member_count, 1_234_567);
    assert_eq!(snapshot.live_count, Some(4321));
    assert_eq!(snapshot.theme_color.as_deref(), Some("#FF4500"));

    let text = session.render().plain_text();
    assert!(text.contains("r/AskReddit"));
    assert!(text.contains("1,234,567"));
    assert!(text.contains("4,321"));
    assert!(session.take_toasts().is_empty());
}

#[tokio::test]
async fn test_balance_lookup_only_for_resolved_user() {
    let store = Arc::new(RecordingStore::default());
    let reddit = Arc::new(FakeReddit::new().with_user("bob"));
    let session = WidgetSession::new(services(store.clone(), 100), reddit.clone());

    let mut updates = session.subscribe();
    session.mount(reddit.as_ref()).await;

    assert!(!store.keys().is_empty());
    assert!(store
        .keys()
        .iter()
        .all(|key| key == &CacheKeys::user_balance("bob")));

    // Once the identity is visible it never changes again.
    let identity = updates.borrow_and_update().identity.clone();
    assert_eq!(
        identity,
        IdentityState::Resolved(Identity::User(Username::parse("bob").unwrap()))
    );
}

#[tokio::test]
async fn test_missing_balance_without_initialization_shows_bare_label() {
    let store = Arc::new(RecordingStore::default());
    let reddit = Arc::new(FakeReddit::new().with_user("frank"));
    let session = WidgetSession::new(read_only_services(store.clone()), reddit.clone());

    session.mount(reddit.as_ref()).await;

    assert_eq!(session.snapshot().balance, BalanceState::Loaded { balance: None });
    assert_eq!(store.get(&CacheKeys::user_balance("frank")).await.unwrap(), None);
    let text = session.render().plain_text();
    assert!(text.contains("$UPV"), "{}", text);
    assert!(!text.contains("100 $UPV"), "{}", text);
    assert!(session.take_toasts().is_empty());
}

#[tokio::test]
async fn test_anonymous_session_never_touches_ledger() {
    let store = Arc::new(RecordingStore::default());
    let reddit = Arc::new(FakeReddit::new());
    let session = WidgetSession::new(services(store.clone(), 100), reddit.clone());

    session.mount(reddit.as_ref()).await;

    assert!(store.keys().is_empty());
    let state = session.snapshot();
    assert_eq!(state.identity(), Some(&Identity::Anonymous));
    assert_eq!(state.balance, BalanceState::Idle);
    let text = session.render().plain_text();
    assert!(text.contains("u/Anonymous"));
}

#[tokio::test]
async fn test_existing_balance_is_not_overwritten() {
    let store = Arc::new(RecordingStore::default());
    let ledger = BalanceLedger::new(store.clone());
    let carol = Username::parse("carol").unwrap();
    ledger.initialize(&carol, 10).await.unwrap();
    ledger.apply_delta(&carol, 990).await.unwrap();

    let reddit = Arc::new(FakeReddit::new().with_user("carol"));
    let session = WidgetSession::new(services(store, 100), reddit.clone());
    session.mount(reddit.as_ref()).await;

    assert_eq!(session.snapshot().balance, BalanceState::Loaded { balance: Some(1000) });
    assert!(session.render().plain_text().contains("1,000 $UPV"));
}

#[tokio::test]
async fn test_store_outage_shows_toast_and_keeps_widget_usable() {
    let reddit = Arc::new(
        FakeReddit::new()
            .with_user("dave")
            .with_community(community("rust", 300_000, None), None),
    );
    let session = WidgetSession::new(services(Arc::new(DownStore), 100), reddit.clone());

    session.mount(reddit.as_ref()).await;

    assert!(matches!(session.snapshot().balance, BalanceState::Failed { .. }));
    let toasts = session.take_toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].text, "Could not load your $UPV balance.");

    session.submit_form(&form("rust")).await;
    assert_eq!(session.snapshot().phase(), WidgetPhase::CommunityDataLoaded);
}

#[tokio::test]
async fn test_theme_failure_keeps_new_counts_and_previous_color() {
    let reddit = Arc::new(
        FakeReddit::new()
            .with_user("erin")
            .with_community(community("pics", 500, Some(5)), Some("#123456"))
            .with_community(community("gaming", 9_000, Some(90)), Some("#abcdef"))
            .with_failing_styles("t5_gaming"),
    );
    let session = WidgetSession::new(
        services(Arc::new(RecordingStore::default()), 100),
        reddit.clone(),
    );
    session.mount(reddit.as_ref()).await;

    session.submit_form(&form("pics")).await;
    session.submit_form(&form("gaming")).await;

    let state = session.snapshot();
    assert_eq!(state.phase(), WidgetPhase::CommunityDataFailed);
    let retained = state.community.visible_snapshot().unwrap();
    assert_eq!(retained.member_count, 9_000);
    assert_eq!(retained.live_count, Some(90));
    assert_eq!(retained.theme_color.as_deref(), Some("#123456"));
    assert_eq!(session.take_toasts().len(), 1);
}

#[tokio::test]
async fn test_unknown_community_keeps_previous_counts() {
    let reddit = Arc::new(
        FakeReddit::new().with_community(community("pics", 500, Some(5)), None),
    );
    let session = WidgetSession::new(
        services(Arc::new(RecordingStore::default()), 100),
        reddit.clone(),
    );
    session.mount(reddit.as_ref()).await;

    session.submit_form(&form("pics")).await;
    session.submit_form(&form("doesnotexist")).await;

    let state = session.snapshot();
    match &state.community {
        CommunityState::Failed { name, retained, .. } => {
            assert_eq!(name, "doesnotexist");
            assert_eq!(retained.as_ref().map(|s| s.member_count), Some(500));
        }
        other => panic!("unexpected community state: {:?}", other),
    }
    let toasts = session.take_toasts();
    assert_eq!(toasts.len(), 1);
    assert!(toasts[0].text.contains("doesnotexist"));
}

#[tokio::test]
async fn test_superseded_submission_is_discarded() {
    let reddit = Arc::new(
        FakeReddit::new()
            .with_community(community("slow", 1, Some(1)), None)
            .with_community(community("fast", 2, Some(2)), None)
            .with_gate("slow"),
    );
    let session = Arc::new(WidgetSession::new(
        services(Arc::new(RecordingStore::default()), 100),
        reddit.clone(),
    ));
    session.mount(reddit.as_ref()).await;

    let mut updates = session.subscribe();
    let slow = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_form(&form("slow")).await })
    };
    updates
        .wait_for(|state| state.community.selected_name() == Some("slow"))
        .await
        .unwrap();

    session.submit_form(&form("fast")).await;
    reddit.release.notify_one();
    tokio::time::timeout(Duration::from_secs(5), slow)
        .await
        .unwrap()
        .unwrap();

    let state = session.snapshot();
    assert_eq!(state.community.selected_name(), Some("fast"));
    assert_eq!(state.community.visible_snapshot().unwrap().member_count, 2);
    assert_eq!(state.generation, 2);
}

#[tokio::test]
async fn test_unmount_discards_in_flight_lookup() {
    let reddit = Arc::new(
        FakeReddit::new()
            .with_community(community("slow", 1, Some(1)), None)
            .with_gate("slow"),
    );
    let session = Arc::new(WidgetSession::new(
        services(Arc::new(RecordingStore::default()), 100),
        reddit.clone(),
    ));
    session.mount(reddit.as_ref()).await;

    let mut updates = session.subscribe();
    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.submit_form(&form("slow")).await })
    };
    updates
        .wait_for(|state| state.is_loading())
        .await
        .unwrap();

    session.unmount();
    reddit.release.notify_one();
    pending.await.unwrap();

    assert_eq!(session.snapshot().phase(), WidgetPhase::CommunityLoading);
    assert!(session.take_toasts().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_keep_name_and_counts_together() {
    let reddit = Arc::new(
        FakeReddit::new()
            .with_community(community("aaa", 111, Some(1)), None)
            .with_community(community("bbb", 222, Some(2)), None),
    );

    for _ in 0..500 {
        let session = Arc::new(WidgetSession::new(
            services(Arc::new(RecordingStore::default()), 100),
            reddit.clone(),
        ));
        session.mount(reddit.as_ref()).await;

        let submits: Vec<_> = ["aaa", "bbb"]
            .into_iter()
            .map(|name| {
                let session = session.clone();
                tokio::spawn(async move { session.submit_form(&form(name)).await })
            })
            .collect();
        for submit in submits {
            submit.await.unwrap();
        }

        let state = session.snapshot();
        assert_eq!(state.generation, 2);
        match &state.community {
            CommunityState::Loaded { name, snapshot } => {
                let expected = if name == "aaa" { 111 } else { 222 };
                assert_eq!(snapshot.member_count, expected, "r/{} shows wrong counts", name);
            }
            other => panic!("unexpected community state: {:?}", other),
        }
    }
}
