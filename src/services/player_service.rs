use crate::error::{AppError, AppResult};
use crate::invitation::InviteStatus;
use crate::models::{Course, NewPlayer, Player, PlayerId, PlayerProfile};
use crate::services::FriendshipService;
use crate::store::{EventStore, PlayerStore};
use std::sync::Arc;
use tracing::info;

/// Service for player profiles and the course catalogue
pub struct PlayerService {
    players: Arc<dyn PlayerStore>,
    events: Arc<dyn EventStore>,
    friendships: Arc<FriendshipService>,
}

impl PlayerService {
    pub fn new(
        players: Arc<dyn PlayerStore>,
        events: Arc<dyn EventStore>,
        friendships: Arc<FriendshipService>,
    ) -> Self {
        Self {
            players,
            events,
            friendships,
        }
    }

    pub async fn list_players(&self) -> AppResult<Vec<Player>> {
        self.players.list_players().await
    }

    /// A player with their friend ids and the events they accepted
    pub async fn get_player(&self, id: PlayerId) -> AppResult<PlayerProfile> {
        let player = self
            .players
            .find_player(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Player {} not found", id)))?;

        let mut friends: Vec<PlayerId> = self.friendships.friend_ids(id).await?.into_iter().collect();
        friends.sort_unstable();

        let events = self
            .events
            .events_for_player(id)
            .await?
            .into_iter()
            .filter(|e| e.status_of(id) == Some(InviteStatus::Accepted))
            .map(|e| e.id)
            .collect();

        Ok(PlayerProfile {
            player,
            friends,
            events,
        })
    }

    /// Create a player after normalizing and validating the request
    pub async fn create_player(&self, request: NewPlayer) -> AppResult<Player> {
        let request = request.normalized()?;
        let player = self.players.create_player(&request).await?;
        info!("Created player {} ({})", player.username, player.id);
        Ok(player)
    }

    pub async fn list_courses(&self) -> AppResult<Vec<Course>> {
        self.events.list_courses().await
    }
}
