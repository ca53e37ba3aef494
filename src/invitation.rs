//! Invitation state model.
//!
//! Every (event, player) pair is in at most one [`InviteStatus`]. The only
//! way to change it is [`apply_action`], which implements the invite state
//! machine:
//!
//! ```text
//!   none ──accept/join (public)──► accepted ──remove (host)──► closed
//!   pending ──accept/join────────► accepted ──decline────────► declined
//!   pending/none ──decline───────► declined
//!   pending ──remove (host)──────► closed
//! ```
//!
//! `declined` and `closed` are terminal: further actions by that player are
//! no-ops. Cancelling an event as its host deletes it outright.

use crate::error::{AppError, AppResult};
use crate::models::{Event, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-player invitation status on an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
    Closed,
}

impl InviteStatus {
    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Declined => "declined",
            InviteStatus::Closed => "closed",
        }
    }

    /// Integer code stored in `player_events.invite_status`
    pub fn code(&self) -> i32 {
        match self {
            InviteStatus::Pending => 0,
            InviteStatus::Accepted => 1,
            InviteStatus::Declined => 2,
            InviteStatus::Closed => 3,
        }
    }

    /// Convert from the stored integer code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(InviteStatus::Pending),
            1 => Some(InviteStatus::Accepted),
            2 => Some(InviteStatus::Declined),
            3 => Some(InviteStatus::Closed),
            _ => None,
        }
    }

    /// Declined and closed players can no longer act on the event
    pub fn is_terminal(&self) -> bool {
        matches!(self, InviteStatus::Declined | InviteStatus::Closed)
    }
}

impl FromStr for InviteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(InviteStatus::Pending),
            "accepted" => Ok(InviteStatus::Accepted),
            "declined" => Ok(InviteStatus::Declined),
            "closed" => Ok(InviteStatus::Closed),
            _ => Err(format!("Invalid invite status: {}", s)),
        }
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The player's status on the event, `None` if they have no entry.
pub fn status_of(event: &Event, player_id: PlayerId) -> Option<InviteStatus> {
    event.status_of(player_id)
}

/// Public events are offered to the whole community.
pub fn is_visible_to_community(event: &Event) -> bool {
    !event.private
}

/// Something a player asks to do with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InviteAction {
    /// Accept a direct invite, or a public event from the community list
    Accept,
    /// Decline an invite, or back out after accepting
    Decline,
    /// Take a spot in a friend's public round
    Join,
    /// Host deletes the event
    CancelByHost,
    /// Host removes a participant without them declining
    RemoveParticipant { player_id: PlayerId },
}

/// Result of applying an [`InviteAction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A player's status changed; the event was updated in place
    Changed {
        player_id: PlayerId,
        from: Option<InviteStatus>,
        to: InviteStatus,
    },
    /// Nothing to do: the player is already where the action would put them
    /// or in a terminal state
    Unchanged,
    /// The event must be deleted
    Deleted,
}

/// Apply `action` by `actor` to `event`.
///
/// On `Changed` the event has already been updated; the caller persists it.
/// On error the event is untouched.
pub fn apply_action(
    event: &mut Event,
    actor: PlayerId,
    action: InviteAction,
) -> AppResult<ActionOutcome> {
    match action {
        InviteAction::Accept => accept(event, actor, false),
        InviteAction::Join => accept(event, actor, true),
        InviteAction::Decline => decline(event, actor),
        InviteAction::CancelByHost => {
            if event.is_host(actor) {
                Ok(ActionOutcome::Deleted)
            } else {
                Err(AppError::Forbidden(format!(
                    "Only the host can cancel event {}",
                    event.id
                )))
            }
        }
        InviteAction::RemoveParticipant { player_id } => remove_participant(event, actor, player_id),
    }
}

fn accept(event: &mut Event, player_id: PlayerId, via_join: bool) -> AppResult<ActionOutcome> {
    let current = event.status_of(player_id);
    match current {
        Some(status) if status.is_terminal() => return Ok(ActionOutcome::Unchanged),
        Some(InviteStatus::Accepted) => return Ok(ActionOutcome::Unchanged),
        _ => {}
    }

    if via_join && event.private {
        return Err(AppError::InvalidTransition(format!(
            "Event {} is private and can't be joined",
            event.id
        )));
    }
    if current.is_none() && !is_visible_to_community(event) {
        return Err(AppError::InvalidTransition(format!(
            "Player {} was not invited to event {}",
            player_id, event.id
        )));
    }
    if event.is_full() {
        return Err(AppError::CapacityExceeded(format!(
            "Event {} has no remaining spots",
            event.id
        )));
    }

    Ok(change(event, player_id, InviteStatus::Accepted))
}

fn decline(event: &mut Event, player_id: PlayerId) -> AppResult<ActionOutcome> {
    let current = event.status_of(player_id);
    if current.map_or(false, |s| s.is_terminal()) {
        return Ok(ActionOutcome::Unchanged);
    }
    if event.is_host(player_id) {
        return Err(AppError::InvalidTransition(format!(
            "The host of event {} must cancel it rather than decline",
            event.id
        )));
    }
    if current.is_none() && !is_visible_to_community(event) {
        return Err(AppError::InvalidTransition(format!(
            "Player {} was not invited to event {}",
            player_id, event.id
        )));
    }

    Ok(change(event, player_id, InviteStatus::Declined))
}

fn remove_participant(
    event: &mut Event,
    host_id: PlayerId,
    player_id: PlayerId,
) -> AppResult<ActionOutcome> {
    if !event.is_host(host_id) {
        return Err(AppError::Forbidden(format!(
            "Only the host can remove players from event {}",
            event.id
        )));
    }
    if player_id == host_id {
        return Err(AppError::InvalidTransition(
            "The host can't remove themselves; cancel the event instead".into(),
        ));
    }

    match event.status_of(player_id) {
        Some(status) if status.is_terminal() => Ok(ActionOutcome::Unchanged),
        Some(_) => Ok(change(event, player_id, InviteStatus::Closed)),
        None => Err(AppError::InvalidTransition(format!(
            "Player {} is not on event {}",
            player_id, event.id
        ))),
    }
}

fn change(event: &mut Event, player_id: PlayerId, to: InviteStatus) -> ActionOutcome {
    let from = event.set_status(player_id, to);
    ActionOutcome::Changed { player_id, from, to }
}
