use crate::classifier::{classify, Classification};
use crate::error::{AppError, AppResult};
use crate::models::{Event, EventId, NewEvent, PlayerId};
use crate::services::FriendshipService;
use crate::store::{EventStore, PlayerStore};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Service for creating and reading events
pub struct EventService {
    events: Arc<dyn EventStore>,
    players: Arc<dyn PlayerStore>,
    friendships: Arc<FriendshipService>,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventStore>,
        players: Arc<dyn PlayerStore>,
        friendships: Arc<FriendshipService>,
    ) -> Self {
        Self {
            events,
            players,
            friendships,
        }
    }

    /// Create an event hosted by `host_id`.
    ///
    /// Private events invite the listed players; public events invite every
    /// other player.
    pub async fn create_event(&self, host_id: PlayerId, request: NewEvent) -> AppResult<Event> {
        info!("Creating event: host={}, course={}", host_id, request.course_id);

        let mut draft = request.into_draft(host_id)?;

        if self.players.find_player(host_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Player {} not found", host_id)));
        }
        if self.events.find_course(draft.course_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Course {} does not exist",
                draft.course_id
            )));
        }

        let known: HashSet<PlayerId> = self
            .players
            .list_players()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        if draft.private {
            if let Some(unknown) = draft.invitees.iter().find(|id| !known.contains(*id)) {
                return Err(AppError::Validation(format!(
                    "Invited player {} does not exist",
                    unknown
                )));
            }
        } else {
            draft.invitees = known.into_iter().filter(|id| *id != host_id).collect();
        }

        let event = self.events.create_event(&draft).await?;
        info!(
            "Created event {} at {} with {} invitations",
            event.id,
            event.course_name,
            event.pending().len()
        );
        Ok(event)
    }

    /// Events the viewer hosts or has any status on
    pub async fn fetch_events(&self, viewer_id: PlayerId) -> AppResult<Vec<Event>> {
        self.events.events_for_player(viewer_id).await
    }

    pub async fn all_events(&self) -> AppResult<Vec<Event>> {
        self.events.list_events().await
    }

    pub async fn public_events(&self) -> AppResult<Vec<Event>> {
        self.events.list_public_events().await
    }

    pub async fn get_event(&self, id: EventId) -> AppResult<Event> {
        self.events
            .find_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    /// Classify the viewer's events together with every public event.
    /// Unknown viewers get an empty classification.
    pub async fn dashboard(&self, viewer_id: PlayerId) -> AppResult<Classification> {
        if self.players.find_player(viewer_id).await?.is_none() {
            debug!("Dashboard requested for unknown player {}", viewer_id);
            return Ok(Classification::default());
        }

        let mut events = self.fetch_events(viewer_id).await?;
        let mut seen: HashSet<EventId> = events.iter().map(|e| e.id).collect();
        for event in self.public_events().await? {
            if seen.insert(event.id) {
                events.push(event);
            }
        }
        events.sort_by_key(|e| (e.date, e.tee_time, e.id));

        let friend_ids = self.friendships.friend_ids(viewer_id).await?;
        let classification = classify(&events, viewer_id, &friend_ids);
        debug!(
            "Dashboard for {}: {} committed, {} available, {} joinable, {} hidden",
            viewer_id,
            classification.committed.len(),
            classification.available.len(),
            classification.joinable.len(),
            classification.hidden.len()
        );
        Ok(classification)
    }
}
