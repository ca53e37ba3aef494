use crate::error::{AppError, AppResult};
use crate::invitation::{ActionOutcome, InviteAction, InviteStatus};
use crate::models::{Event, EventId, PlayerId};
use crate::store::EventStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Applies invite actions and hands back the actor's refreshed events
pub struct InviteService {
    events: Arc<dyn EventStore>,
}

impl InviteService {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    /// Run one action through the store, retrying once if the store was
    /// unreachable
    async fn apply(
        &self,
        event_id: EventId,
        actor: PlayerId,
        action: InviteAction,
    ) -> AppResult<ActionOutcome> {
        let outcome = match self.events.apply_action(event_id, actor, action).await {
            Err(e) if e.is_transient() => {
                warn!(
                    "Transient failure applying {:?} to event {} for player {}: {}; retrying",
                    action, event_id, actor, e
                );
                self.events.apply_action(event_id, actor, action).await?
            }
            other => other?,
        };

        match outcome {
            ActionOutcome::Changed { player_id, from, to } => info!(
                "Event {}: player {} {} -> {}",
                event_id,
                player_id,
                from.map_or("none", |s| s.as_str()),
                to
            ),
            ActionOutcome::Deleted => info!("Event {} cancelled by host {}", event_id, actor),
            ActionOutcome::Unchanged => info!(
                "Event {}: {:?} by player {} left the event unchanged",
                event_id, action, actor
            ),
        }
        Ok(outcome)
    }

    async fn refreshed(&self, viewer_id: PlayerId) -> AppResult<Vec<Event>> {
        self.events.events_for_player(viewer_id).await
    }

    /// Accept or decline an invitation
    pub async fn apply_invite(
        &self,
        viewer_id: PlayerId,
        event_id: EventId,
        status: InviteStatus,
    ) -> AppResult<Vec<Event>> {
        let action = match status {
            InviteStatus::Accepted => InviteAction::Accept,
            InviteStatus::Declined => InviteAction::Decline,
            other => {
                return Err(AppError::Validation(format!(
                    "Invite status must be accepted or declined, got {}",
                    other
                )))
            }
        };

        self.apply(event_id, viewer_id, action).await?;
        self.refreshed(viewer_id).await
    }

    /// Take a spot in a public event
    pub async fn join_event(&self, viewer_id: PlayerId, event_id: EventId) -> AppResult<Vec<Event>> {
        self.apply(event_id, viewer_id, InviteAction::Join).await?;
        self.refreshed(viewer_id).await
    }

    /// Hosts delete the event, everyone else declines it
    pub async fn cancel_event(&self, event_id: EventId, viewer_id: PlayerId) -> AppResult<Vec<Event>> {
        let event = self
            .events
            .find_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

        let action = if event.is_host(viewer_id) {
            InviteAction::CancelByHost
        } else {
            InviteAction::Decline
        };

        self.apply(event_id, viewer_id, action).await?;
        self.refreshed(viewer_id).await
    }

    /// Host-only hard delete
    pub async fn cancel_by_host(&self, event_id: EventId, host_id: PlayerId) -> AppResult<Vec<Event>> {
        self.apply(event_id, host_id, InviteAction::CancelByHost).await?;
        self.refreshed(host_id).await
    }

    /// Host removes a participant, closing their invitation
    pub async fn remove_participant(
        &self,
        event_id: EventId,
        host_id: PlayerId,
        player_id: PlayerId,
    ) -> AppResult<Event> {
        self.apply(event_id, host_id, InviteAction::RemoveParticipant { player_id })
            .await?;
        self.events
            .find_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))
    }
}
