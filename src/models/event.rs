use super::{CourseId, EventId, PlayerId};
use crate::error::{AppError, AppResult};
use crate::invitation::InviteStatus;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Wire format for dates, e.g. `2026-08-01`
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format for tee times, e.g. `13:20`
pub const TEE_TIME_FORMAT: &str = "%H:%M";

const VALID_HOLES: [&str; 2] = ["9", "18"];

/// A hosted tee time with its capacity and per-player invitation status.
///
/// Each participating player has exactly one [`InviteStatus`]; the accepted,
/// declined, pending and closed lists are views over that single map, so a
/// player can never sit in two of them at once. `remaining_spots` is derived
/// from the accepted count for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EventPayload", into = "EventPayload")]
pub struct Event {
    pub id: EventId,
    pub course_id: CourseId,
    pub course_name: String,
    pub date: NaiveDate,
    pub tee_time: NaiveTime,
    pub number_of_holes: String,
    pub private: bool,
    pub host_id: PlayerId,
    pub host_name: String,
    /// Total players including the host
    pub open_spots: i32,
    pub created_at: NaiveDateTime,
    participants: BTreeMap<PlayerId, InviteStatus>,
}

impl Event {
    /// Create an event with the host already accepted.
    pub fn new(id: EventId, host_id: PlayerId, private: bool, open_spots: i32) -> Self {
        let mut participants = BTreeMap::new();
        participants.insert(host_id, InviteStatus::Accepted);

        Self {
            id,
            course_id: 0,
            course_name: String::new(),
            date: chrono::Utc::now().date_naive(),
            tee_time: NaiveTime::MIN,
            number_of_holes: "18".to_string(),
            private,
            host_id,
            host_name: String::new(),
            open_spots,
            created_at: chrono::Utc::now().naive_utc(),
            participants,
        }
    }

    /// Builder used when loading an event or setting up a scenario
    pub fn with_status(mut self, player_id: PlayerId, status: InviteStatus) -> Self {
        self.set_status(player_id, status);
        self
    }

    /// Get the player's current status, `None` if they have no entry
    pub fn status_of(&self, player_id: PlayerId) -> Option<InviteStatus> {
        self.participants.get(&player_id).copied()
    }

    /// Move a player into `status`, returning the status they left.
    pub(crate) fn set_status(
        &mut self,
        player_id: PlayerId,
        status: InviteStatus,
    ) -> Option<InviteStatus> {
        self.participants.insert(player_id, status)
    }

    /// All players with an entry on this event, in id order
    pub fn participants(&self) -> impl Iterator<Item = (PlayerId, InviteStatus)> + '_ {
        self.participants.iter().map(|(id, status)| (*id, *status))
    }

    /// Player ids currently in `status`, in id order
    pub fn players_with(&self, status: InviteStatus) -> Vec<PlayerId> {
        self.participants
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn accepted(&self) -> Vec<PlayerId> {
        self.players_with(InviteStatus::Accepted)
    }

    pub fn declined(&self) -> Vec<PlayerId> {
        self.players_with(InviteStatus::Declined)
    }

    pub fn pending(&self) -> Vec<PlayerId> {
        self.players_with(InviteStatus::Pending)
    }

    pub fn closed(&self) -> Vec<PlayerId> {
        self.players_with(InviteStatus::Closed)
    }

    /// Open spots minus accepted players, never below zero
    pub fn remaining_spots(&self) -> i32 {
        let accepted = self
            .participants
            .values()
            .filter(|s| **s == InviteStatus::Accepted)
            .count() as i32;
        (self.open_spots - accepted).max(0)
    }

    /// Check if the event has no remaining spots
    pub fn is_full(&self) -> bool {
        self.remaining_spots() == 0
    }

    /// Check if the player hosts this event
    pub fn is_host(&self, player_id: PlayerId) -> bool {
        self.host_id == player_id
    }

    /// Check if the player is the host or has any status on the event
    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.is_host(player_id) || self.participants.contains_key(&player_id)
    }
}

/// Serialized shape of an [`Event`], matching the public API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    pub id: EventId,
    pub course_id: CourseId,
    pub course_name: String,
    pub date: String,
    pub tee_time: String,
    pub open_spots: i32,
    pub number_of_holes: String,
    pub private: bool,
    pub host_id: PlayerId,
    pub host_name: String,
    pub accepted: Vec<PlayerId>,
    pub declined: Vec<PlayerId>,
    pub pending: Vec<PlayerId>,
    pub closed: Vec<PlayerId>,
    /// Derived on the way in; kept on the wire for clients
    #[serde(default)]
    pub remaining_spots: i32,
    pub created_at: NaiveDateTime,
}

impl From<Event> for EventPayload {
    fn from(event: Event) -> Self {
        Self {
            accepted: event.accepted(),
            declined: event.declined(),
            pending: event.pending(),
            closed: event.closed(),
            remaining_spots: event.remaining_spots(),
            id: event.id,
            course_id: event.course_id,
            course_name: event.course_name,
            date: event.date.format(DATE_FORMAT).to_string(),
            tee_time: event.tee_time.format(TEE_TIME_FORMAT).to_string(),
            open_spots: event.open_spots,
            number_of_holes: event.number_of_holes,
            private: event.private,
            host_id: event.host_id,
            host_name: event.host_name,
            created_at: event.created_at,
        }
    }
}

impl TryFrom<EventPayload> for Event {
    type Error = String;

    fn try_from(payload: EventPayload) -> Result<Self, Self::Error> {
        let date = parse_date(&payload.date).map_err(|e| e.to_string())?;
        let tee_time = parse_tee_time(&payload.tee_time).map_err(|e| e.to_string())?;

        let mut participants = BTreeMap::new();
        let groups = [
            (InviteStatus::Accepted, payload.accepted),
            (InviteStatus::Declined, payload.declined),
            (InviteStatus::Pending, payload.pending),
            (InviteStatus::Closed, payload.closed),
        ];
        for (status, ids) in groups {
            for id in ids {
                if let Some(previous) = participants.insert(id, status) {
                    return Err(format!(
                        "player {} is both {} and {} on event {}",
                        id, previous, status, payload.id
                    ));
                }
            }
        }

        Ok(Self {
            id: payload.id,
            course_id: payload.course_id,
            course_name: payload.course_name,
            date,
            tee_time,
            number_of_holes: payload.number_of_holes,
            private: payload.private,
            host_id: payload.host_id,
            host_name: payload.host_name,
            open_spots: payload.open_spots,
            created_at: payload.created_at,
            participants,
        })
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", value)))
}

/// Parse an `HH:MM` or `HH:MM:SS` tee time
pub fn parse_tee_time(value: &str) -> AppResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TEE_TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("Invalid tee time: {}", value)))
}

/// Event creation request as submitted by a host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub course_id: CourseId,
    pub date: String,
    pub tee_time: String,
    pub open_spots: i32,
    pub number_of_holes: String,
    #[serde(default)]
    pub private: bool,
    /// Players to invite; only used for private events
    #[serde(default)]
    pub invitees: Vec<PlayerId>,
}

/// A validated event ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub host_id: PlayerId,
    pub course_id: CourseId,
    pub date: NaiveDate,
    pub tee_time: NaiveTime,
    pub open_spots: i32,
    pub number_of_holes: String,
    pub private: bool,
    pub invitees: BTreeSet<PlayerId>,
}

impl NewEvent {
    /// Validate the request and attach the host
    pub fn into_draft(self, host_id: PlayerId) -> AppResult<EventDraft> {
        if self.course_id <= 0 {
            return Err(AppError::Validation("Course can't be blank".into()));
        }
        if self.open_spots < 1 {
            return Err(AppError::Validation("Open spots must be at least 1".into()));
        }
        let holes = self.number_of_holes.trim();
        if !VALID_HOLES.contains(&holes) {
            return Err(AppError::Validation(format!(
                "Number of holes must be one of {:?}",
                VALID_HOLES
            )));
        }

        let date = parse_date(&self.date)?;
        let tee_time = parse_tee_time(&self.tee_time)?;

        // The host is always accepted, never invited
        let invitees = if self.private {
            self.invitees.into_iter().filter(|id| *id != host_id).collect()
        } else {
            BTreeSet::new()
        };

        Ok(EventDraft {
            host_id,
            course_id: self.course_id,
            date,
            tee_time,
            open_spots: self.open_spots,
            number_of_holes: holes.to_string(),
            private: self.private,
            invitees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event(private: bool, invitees: Vec<PlayerId>) -> NewEvent {
        NewEvent {
            course_id: 1,
            date: "2026-08-01".into(),
            tee_time: "13:20".into(),
            open_spots: 4,
            number_of_holes: "9".into(),
            private,
            invitees,
        }
    }

    #[test]
    fn test_new_event_starts_with_host_accepted() {
        let event = Event::new(1, 7, false, 2);
        assert_eq!(event.accepted(), vec![7]);
        assert_eq!(event.remaining_spots(), 1);
        assert!(event.involves(7));
        assert!(!event.involves(9));
    }

    #[test]
    fn test_status_change_moves_player_between_sets() {
        let mut event = Event::new(1, 7, false, 3).with_status(9, InviteStatus::Pending);
        assert_eq!(event.pending(), vec![9]);

        let previous = event.set_status(9, InviteStatus::Accepted);
        assert_eq!(previous, Some(InviteStatus::Pending));
        assert!(event.pending().is_empty());
        assert_eq!(event.accepted(), vec![7, 9]);
        assert_eq!(event.remaining_spots(), 1);
    }

    #[test]
    fn test_remaining_spots_never_negative() {
        let event = Event::new(1, 7, false, 1).with_status(8, InviteStatus::Accepted);
        assert_eq!(event.remaining_spots(), 0);
        assert!(event.is_full());
    }

    #[test]
    fn test_payload_lists_each_status() {
        let event = Event::new(3, 1, true, 4)
            .with_status(2, InviteStatus::Pending)
            .with_status(3, InviteStatus::Declined)
            .with_status(4, InviteStatus::Closed);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["accepted"], serde_json::json!([1]));
        assert_eq!(json["pending"], serde_json::json!([2]));
        assert_eq!(json["declined"], serde_json::json!([3]));
        assert_eq!(json["closed"], serde_json::json!([4]));
        assert_eq!(json["remaining_spots"], 3);
        assert_eq!(json["tee_time"], "00:00");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_payload_with_player_in_two_sets_is_rejected() {
        let mut payload = EventPayload::from(Event::new(3, 1, false, 4));
        payload.pending = vec![1];

        let json = serde_json::to_value(&payload).unwrap();
        let err = serde_json::from_value::<Event>(json).unwrap_err();
        assert!(err.to_string().contains("player 1"));
    }

    #[test]
    fn test_draft_drops_host_from_private_invitees() {
        let draft = new_event(true, vec![5, 2, 5, 9]).into_draft(5).unwrap();
        assert_eq!(draft.invitees.into_iter().collect::<Vec<_>>(), vec![2, 9]);
        assert_eq!(draft.tee_time, NaiveTime::from_hms_opt(13, 20, 0).unwrap());
    }

    #[test]
    fn test_draft_ignores_invitees_for_public_events() {
        let draft = new_event(false, vec![2, 3]).into_draft(1).unwrap();
        assert!(draft.invitees.is_empty());
    }

    #[test]
    fn test_draft_validation() {
        let mut request = new_event(false, vec![]);
        request.open_spots = 0;
        assert!(matches!(request.into_draft(1), Err(AppError::Validation(_))));

        let mut request = new_event(false, vec![]);
        request.number_of_holes = "12".into();
        assert!(matches!(request.into_draft(1), Err(AppError::Validation(_))));

        let mut request = new_event(false, vec![]);
        request.date = "08-01-2021".into();
        assert!(matches!(request.into_draft(1), Err(AppError::Validation(_))));
    }
}
