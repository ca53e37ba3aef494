//! Domain models for the ForeFinder backend.
//!
//! This module contains the entities of the tee-time platform: players,
//! courses, events with their invitation lists, friendships, and the
//! community feed.

pub mod course;
pub mod event;
pub mod friendship;
pub mod player;
pub mod post;

pub type PlayerId = i64;
pub type EventId = i64;
pub type CourseId = i64;
pub type PostId = i64;

// Re-export all models for convenient access
pub use course::Course;
pub use event::{Event, EventDraft, EventPayload, NewEvent};
pub use friendship::{Friend, Friendship};
pub use player::{NewPlayer, Player, PlayerProfile};
pub use post::{Post, PostRecord, Reaction, Reply};
