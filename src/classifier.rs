//! Viewer-relative event classification.
//!
//! Nothing here is stored: the buckets are recomputed from the events and the
//! viewer's friend ids every time a dashboard is built.

use crate::invitation::{is_visible_to_community, status_of, InviteStatus};
use crate::models::{Event, PlayerId};
use serde::Serialize;
use std::collections::HashSet;

/// Events sorted into the buckets shown on a viewer's dashboard.
///
/// `committed`, `available` and `hidden` partition the input. `joinable` is
/// an additional view and may repeat events from `available`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub committed: Vec<Event>,
    pub available: Vec<Event>,
    pub joinable: Vec<Event>,
    pub hidden: Vec<Event>,
}

impl Classification {
    /// Available events the viewer was personally invited to
    pub fn available_private(&self) -> Vec<&Event> {
        self.available.iter().filter(|e| e.private).collect()
    }

    /// Available events open to the whole community
    pub fn available_public(&self) -> Vec<&Event> {
        self.available.iter().filter(|e| !e.private).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
            && self.available.is_empty()
            && self.joinable.is_empty()
            && self.hidden.is_empty()
    }
}

/// Classify `events` for `viewer_id`, keeping input order in each bucket.
pub fn classify(
    events: &[Event],
    viewer_id: PlayerId,
    friend_ids: &HashSet<PlayerId>,
) -> Classification {
    let mut classification = Classification::default();

    for event in events {
        let status = status_of(event, viewer_id);

        if is_joinable(event, status, friend_ids) {
            classification.joinable.push(event.clone());
        }

        match status {
            Some(InviteStatus::Accepted) => classification.committed.push(event.clone()),
            _ if is_available(event, status) => classification.available.push(event.clone()),
            _ => classification.hidden.push(event.clone()),
        }
    }

    classification
}

fn is_available(event: &Event, status: Option<InviteStatus>) -> bool {
    let offered = match status {
        Some(InviteStatus::Pending) => true,
        None => is_visible_to_community(event),
        Some(_) => false,
    };
    offered && event.remaining_spots() > 0
}

fn is_joinable(event: &Event, status: Option<InviteStatus>, friend_ids: &HashSet<PlayerId>) -> bool {
    friend_ids.contains(&event.host_id)
        && is_visible_to_community(event)
        && event.remaining_spots() > 0
        && matches!(status, None | Some(InviteStatus::Pending))
}
