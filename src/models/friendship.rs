use super::PlayerId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Directed friendship edge: `follower_id` lists `followee_id` as a friend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Friendship {
    pub id: i64,
    pub follower_id: PlayerId,
    pub followee_id: PlayerId,
    pub created_at: NaiveDateTime,
}

impl Friendship {
    /// Check if the edge connects the two players in either direction
    pub fn connects(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.follower_id == a && self.followee_id == b)
            || (self.follower_id == b && self.followee_id == a)
    }
}

/// A friend as shown in the viewer's friend list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: PlayerId,
    pub name: String,
}
