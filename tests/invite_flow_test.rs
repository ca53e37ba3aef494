mod helpers;

use async_trait::async_trait;
use forefinder_backend::database::DatabaseError;
use forefinder_backend::error::{AppError, AppResult};
use forefinder_backend::invitation::{ActionOutcome, InviteAction, InviteStatus};
use forefinder_backend::models::*;
use forefinder_backend::services::InviteService;
use forefinder_backend::store::{EventStore, MemoryStore};
use helpers::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_test::assert_ok;

// ============================================================================
// Event creation
// ============================================================================

#[tokio::test]
async fn test_public_event_invites_every_other_player() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;

    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(4, false, vec![]))
        .await
        .unwrap();

    assert_eq!(event.accepted(), vec![f.eric.id]);
    assert_eq!(event.pending(), vec![f.julie.id, f.mark.id, f.pat.id]);
    assert_eq!(event.remaining_spots(), 3);
    assert_eq!(event.host_name, "Eric");
}

#[tokio::test]
async fn test_private_event_invites_listed_players_only() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;

    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(3, true, vec![f.julie.id, f.eric.id]))
        .await
        .unwrap();

    assert_eq!(event.pending(), vec![f.julie.id]);
    assert!(app.state.events.fetch_events(f.mark.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_event_validation() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;

    let mut request = event_request(3, false, vec![]);
    request.course_id = 99;
    let err = app.state.events.create_event(f.eric.id, request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = app
        .state
        .events
        .create_event(f.eric.id, event_request(3, true, vec![404]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = app
        .state
        .events
        .create_event(404, event_request(3, false, vec![]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// Invite actions
// ============================================================================

#[tokio::test]
async fn test_last_spot_then_capacity_exceeded() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(2, true, vec![f.julie.id, f.mark.id]))
        .await
        .unwrap();

    let julie_events = app
        .state
        .invites
        .apply_invite(f.julie.id, event.id, InviteStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(julie_events[0].remaining_spots(), 0);
    assert_eq!(julie_events[0].status_of(f.julie.id), Some(InviteStatus::Accepted));

    let err = app
        .state
        .invites
        .apply_invite(f.mark.id, event.id, InviteStatus::Accepted)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CapacityExceeded(_)));

    let stored = app.state.events.get_event(event.id).await.unwrap();
    assert_eq!(stored.status_of(f.mark.id), Some(InviteStatus::Pending));
}

#[tokio::test]
async fn test_decline_after_accept_restores_spot() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(3, false, vec![]))
        .await
        .unwrap();

    app.state.invites.join_event(f.pat.id, event.id).await.unwrap();
    assert_eq!(app.state.events.get_event(event.id).await.unwrap().remaining_spots(), 1);

    let events = app
        .state
        .invites
        .apply_invite(f.pat.id, event.id, InviteStatus::Declined)
        .await
        .unwrap();
    assert_eq!(events[0].remaining_spots(), 2);
    assert_eq!(events[0].status_of(f.pat.id), Some(InviteStatus::Declined));

    // Declined is terminal
    assert_ok!(
        app.state
            .invites
            .apply_invite(f.pat.id, event.id, InviteStatus::Accepted)
            .await
    );
    let stored = app.state.events.get_event(event.id).await.unwrap();
    assert_eq!(stored.status_of(f.pat.id), Some(InviteStatus::Declined));
}

#[tokio::test]
async fn test_apply_invite_rejects_other_statuses() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(3, false, vec![]))
        .await
        .unwrap();

    let err = app
        .state
        .invites
        .apply_invite(f.julie.id, event.id, InviteStatus::Closed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_host_cancel_removes_event_for_everyone() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(4, false, vec![]))
        .await
        .unwrap();
    app.state.invites.join_event(f.julie.id, event.id).await.unwrap();

    let err = app.state.invites.cancel_by_host(event.id, f.julie.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let remaining = app.state.invites.cancel_event(event.id, f.eric.id).await.unwrap();
    assert!(remaining.is_empty());

    for player in [&f.eric, &f.julie, &f.mark, &f.pat] {
        let events = app.state.events.fetch_events(player.id).await.unwrap();
        assert!(!ids(&events).contains(&event.id));
    }
    assert!(app.state.events.get_event(event.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_non_host_cancel_declines() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(4, true, vec![f.julie.id]))
        .await
        .unwrap();

    let events = app.state.invites.cancel_event(event.id, f.julie.id).await.unwrap();
    assert_eq!(events[0].declined(), vec![f.julie.id]);
    assert!(app.state.events.get_event(event.id).await.is_ok());
}

#[tokio::test]
async fn test_join_private_event_is_invalid() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(4, true, vec![f.julie.id]))
        .await
        .unwrap();

    let err = app.state.invites.join_event(f.julie.id, event.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let err = app.state.invites.join_event(f.julie.id, 999).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unknown_player_cannot_take_a_spot() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(2, false, vec![]))
        .await
        .unwrap();

    let err = app.state.invites.join_event(999, event.id).await.unwrap_err();
    assert!(err.is_not_found());
    let err = app
        .state
        .invites
        .apply_invite(999, event.id, InviteStatus::Declined)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let stored = app.state.events.get_event(event.id).await.unwrap();
    assert_eq!(stored.accepted(), vec![f.eric.id]);
    assert_eq!(stored.remaining_spots(), 1);

    let events = app.state.invites.join_event(f.julie.id, event.id).await.unwrap();
    assert_eq!(events[0].status_of(f.julie.id), Some(InviteStatus::Accepted));
}

#[tokio::test]
async fn test_host_removes_participant() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(2, true, vec![f.julie.id, f.mark.id]))
        .await
        .unwrap();
    app.state
        .invites
        .apply_invite(f.julie.id, event.id, InviteStatus::Accepted)
        .await
        .unwrap();

    let updated = app
        .state
        .invites
        .remove_participant(event.id, f.eric.id, f.julie.id)
        .await
        .unwrap();
    assert_eq!(updated.closed(), vec![f.julie.id]);
    assert_eq!(updated.remaining_spots(), 1);

    // The freed spot goes to the next accept
    app.state
        .invites
        .apply_invite(f.mark.id, event.id, InviteStatus::Accepted)
        .await
        .unwrap();

    let err = app
        .state
        .invites
        .remove_participant(event.id, f.mark.id, f.eric.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn test_dashboard_scenario() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    // open_spots 2, host accepted, one spot remaining
    let event = app
        .store
        .insert_event(Event::new(50, f.eric.id, false, 2))
        .await;

    let for_julie = app.state.events.dashboard(f.julie.id).await.unwrap();
    assert_eq!(ids(&for_julie.available), vec![event.id]);
    assert!(for_julie.committed.is_empty());

    let for_eric = app.state.events.dashboard(f.eric.id).await.unwrap();
    assert_eq!(ids(&for_eric.committed), vec![event.id]);
    assert!(for_eric.available.is_empty());
}

#[tokio::test]
async fn test_dashboard_joinable_needs_friendship() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    let event = app
        .state
        .events
        .create_event(f.eric.id, event_request(4, false, vec![]))
        .await
        .unwrap();

    let before = app.state.events.dashboard(f.julie.id).await.unwrap();
    assert!(before.joinable.is_empty());

    app.state.friendships.create_friendship(f.julie.id, f.eric.id).await.unwrap();
    let after = app.state.events.dashboard(f.julie.id).await.unwrap();
    assert_eq!(ids(&after.joinable), vec![event.id]);

    app.state.friendships.remove(f.eric.id, f.julie.id).await.unwrap();
    let removed = app.state.events.dashboard(f.julie.id).await.unwrap();
    assert!(removed.joinable.is_empty());
}

#[tokio::test]
async fn test_dashboard_hides_private_events_without_invite() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    app.state
        .events
        .create_event(f.eric.id, event_request(4, true, vec![f.julie.id]))
        .await
        .unwrap();
    app.state.friendships.create_friendship(f.mark.id, f.eric.id).await.unwrap();

    let for_mark = app.state.events.dashboard(f.mark.id).await.unwrap();
    assert!(for_mark.is_empty());

    let for_julie = app.state.events.dashboard(f.julie.id).await.unwrap();
    assert_eq!(for_julie.available_private().len(), 1);
}

#[tokio::test]
async fn test_dashboard_for_unknown_viewer_is_empty() {
    let app = TestApp::new();
    let f = TestFixtures::create(app.store.as_ref()).await;
    app.state
        .events
        .create_event(f.eric.id, event_request(4, false, vec![]))
        .await
        .unwrap();

    let for_julie = app.state.events.dashboard(f.julie.id).await.unwrap();
    assert_eq!(for_julie.available.len(), 1);

    let for_stranger = app.state.events.dashboard(999).await.unwrap();
    assert!(for_stranger.is_empty());
    assert!(for_stranger.joinable.is_empty());
}

// ============================================================================
// Retry on transient store failures
// ============================================================================

/// Event store that fails the first `failures` invite actions with a
/// connection timeout
struct FlakyStore {
    inner: Arc<MemoryStore>,
    failures: AtomicUsize,
    attempts: AtomicUsize,
}

impl FlakyStore {
    fn new(inner: Arc<MemoryStore>, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EventStore for FlakyStore {
    async fn find_event(&self, id: EventId) -> AppResult<Option<Event>> {
        self.inner.find_event(id).await
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        self.inner.list_events().await
    }

    async fn list_public_events(&self) -> AppResult<Vec<Event>> {
        self.inner.list_public_events().await
    }

    async fn events_for_player(&self, player_id: PlayerId) -> AppResult<Vec<Event>> {
        self.inner.events_for_player(player_id).await
    }

    async fn create_event(&self, draft: &EventDraft) -> AppResult<Event> {
        self.inner.create_event(draft).await
    }

    async fn apply_action(
        &self,
        event_id: EventId,
        actor: PlayerId,
        action: InviteAction,
    ) -> AppResult<ActionOutcome> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::Database(DatabaseError::ConnectionTimeout));
        }
        self.inner.apply_action(event_id, actor, action).await
    }

    async fn list_courses(&self) -> AppResult<Vec<Course>> {
        self.inner.list_courses().await
    }

    async fn find_course(&self, id: CourseId) -> AppResult<Option<Course>> {
        self.inner.find_course(id).await
    }
}

#[tokio::test]
async fn test_transient_failure_is_retried_once() {
    let store = Arc::new(MemoryStore::with_default_courses());
    let f = TestFixtures::create(store.as_ref()).await;
    let event = store.insert_event(Event::new(1, f.eric.id, false, 4)).await;

    let flaky = Arc::new(FlakyStore::new(store.clone(), 1));
    let invites = InviteService::new(flaky.clone());

    let events = invites.join_event(f.julie.id, event.id).await.unwrap();
    assert_eq!(events[0].status_of(f.julie.id), Some(InviteStatus::Accepted));
    assert_eq!(flaky.attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_second_transient_failure_surfaces() {
    let store = Arc::new(MemoryStore::with_default_courses());
    let f = TestFixtures::create(store.as_ref()).await;
    let event = store.insert_event(Event::new(1, f.eric.id, false, 4)).await;

    let flaky = Arc::new(FlakyStore::new(store.clone(), 2));
    let invites = InviteService::new(flaky.clone());

    let err = invites.join_event(f.julie.id, event.id).await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(flaky.attempts.load(Ordering::SeqCst), 2);

    let stored = store.find_event(event.id).await.unwrap().unwrap();
    assert_eq!(stored.status_of(f.julie.id), None);
}

#[tokio::test]
async fn test_rejections_are_not_retried() {
    let store = Arc::new(MemoryStore::with_default_courses());
    let f = TestFixtures::create(store.as_ref()).await;
    let event = store.insert_event(Event::new(1, f.eric.id, false, 1)).await;

    let flaky = Arc::new(FlakyStore::new(store.clone(), 0));
    let invites = InviteService::new(flaky.clone());

    let err = invites.join_event(f.julie.id, event.id).await.unwrap_err();
    assert!(matches!(err, AppError::CapacityExceeded(_)));
    assert_eq!(flaky.attempts.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_never_oversubscribe() {
    let app = TestApp::new();
    let host = create_test_player(app.store.as_ref(), "Host").await;
    let event = app
        .state
        .events
        .create_event(host.id, event_request(3, false, vec![]))
        .await
        .unwrap();

    let mut players = Vec::new();
    for i in 0..8 {
        players.push(create_test_player(app.store.as_ref(), &format!("Golfer{}", i)).await);
    }

    let mut handles = Vec::new();
    for player in players {
        let state = app.state.clone();
        let event_id = event.id;
        handles.push(tokio::spawn(async move {
            state.invites.join_event(player.id, event_id).await
        }));
    }

    let mut joined = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => joined += 1,
            Err(AppError::CapacityExceeded(_)) => full += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(joined, 2);
    assert_eq!(full, 6);
    let stored = app.state.events.get_event(event.id).await.unwrap();
    assert_eq!(stored.accepted().len(), 3);
    assert_eq!(stored.remaining_spots(), 0);
}
