use super::{PlayerId, PostId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Post row joined with its author's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PostRecord {
    pub id: PostId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}

/// Emoji reaction on a post; unique per (post, player, emoji)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Reaction {
    pub id: i64,
    #[serde(skip)]
    pub post_id: PostId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub emoji: String,
}

/// Reply to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Reply {
    pub id: i64,
    #[serde(skip)]
    pub post_id: PostId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}

/// Community feed post with its reactions and replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub reactions: Vec<Reaction>,
    pub replies: Vec<Reply>,
}

impl Post {
    /// Assemble a post from its row and the reactions/replies belonging to it
    pub fn from_parts(record: PostRecord, reactions: Vec<Reaction>, replies: Vec<Reply>) -> Self {
        Self {
            id: record.id,
            player_id: record.player_id,
            player_name: record.player_name,
            body: record.body,
            created_at: record.created_at,
            reactions: reactions.into_iter().filter(|r| r.post_id == record.id).collect(),
            replies: replies.into_iter().filter(|r| r.post_id == record.id).collect(),
        }
    }
}
