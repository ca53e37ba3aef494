use crate::error::{AppError, AppResult};
use crate::models::{Friend, Friendship, PlayerId};
use crate::store::PlayerStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Resolves and edits the friendship graph.
///
/// Friend ids are always re-derived from the stored edges, so a removed
/// friendship never lingers in a viewer's friend set.
pub struct FriendshipService {
    players: Arc<dyn PlayerStore>,
}

impl FriendshipService {
    pub fn new(players: Arc<dyn PlayerStore>) -> Self {
        Self { players }
    }

    /// Ids the viewer follows that still belong to a known player
    pub async fn friend_ids(&self, viewer_id: PlayerId) -> AppResult<HashSet<PlayerId>> {
        let known: HashSet<PlayerId> = self
            .players
            .list_players()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        Ok(self
            .players
            .followee_ids(viewer_id)
            .await?
            .into_iter()
            .filter(|id| known.contains(id))
            .collect())
    }

    /// The viewer's friends with their names, in id order
    pub async fn friends(&self, viewer_id: PlayerId) -> AppResult<Vec<Friend>> {
        let friend_ids = self.friend_ids(viewer_id).await?;
        Ok(self
            .players
            .list_players()
            .await?
            .into_iter()
            .filter(|p| friend_ids.contains(&p.id))
            .map(|p| Friend { id: p.id, name: p.name })
            .collect())
    }

    /// Add `followee` to `follower`'s friends, returning the existing edge if
    /// there is one
    pub async fn create_friendship(
        &self,
        follower_id: PlayerId,
        followee_id: PlayerId,
    ) -> AppResult<Friendship> {
        if follower_id == followee_id {
            return Err(AppError::Validation("Players can't befriend themselves".into()));
        }
        for id in [follower_id, followee_id] {
            if self.players.find_player(id).await?.is_none() {
                return Err(AppError::NotFound(format!("Player {} not found", id)));
            }
        }

        let friendship = self
            .players
            .find_or_create_friendship(follower_id, followee_id)
            .await?;
        info!("Friendship {} -> {} ({})", follower_id, followee_id, friendship.id);
        Ok(friendship)
    }

    /// Remove the relationship in both directions
    pub async fn remove(&self, viewer_id: PlayerId, friend_id: PlayerId) -> AppResult<()> {
        let removed = self.players.delete_friendship(viewer_id, friend_id).await?;
        if removed == 0 {
            return Err(AppError::NotFound(format!(
                "Player {} is not friends with {}",
                viewer_id, friend_id
            )));
        }

        info!("Removed friendship between {} and {}", viewer_id, friend_id);
        Ok(())
    }
}
