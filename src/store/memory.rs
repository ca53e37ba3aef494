use super::{EventStore, PlayerStore, PostStore};
use crate::error::{AppError, AppResult};
use crate::invitation::{self, ActionOutcome, InviteAction, InviteStatus};
use crate::models::{
    Course, CourseId, Event, EventDraft, EventId, Friendship, NewPlayer, Player, PlayerId, Post,
    PostId, PostRecord, Reaction, Reply,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Sequences {
    player: i64,
    course: i64,
    event: i64,
    friendship: i64,
    post: i64,
    reaction: i64,
    reply: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Default)]
struct Inner {
    players: BTreeMap<PlayerId, Player>,
    courses: BTreeMap<CourseId, Course>,
    events: BTreeMap<EventId, Event>,
    friendships: Vec<Friendship>,
    posts: BTreeMap<PostId, PostRecord>,
    reactions: Vec<Reaction>,
    replies: Vec<Reply>,
    ids: Sequences,
}

impl Inner {
    fn player_name(&self, id: PlayerId) -> AppResult<String> {
        self.players
            .get(&id)
            .map(|p| p.name.clone())
            .ok_or_else(|| AppError::NotFound(format!("Player {} not found", id)))
    }

    fn assemble_post(&self, record: &PostRecord) -> Post {
        Post::from_parts(record.clone(), self.reactions.clone(), self.replies.clone())
    }
}

/// In-process store used in development without a database and in tests.
///
/// A single lock guards all tables, so every trait call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the seeded course catalogue
    pub fn with_default_courses() -> Self {
        let seed = [
            ("Green Valley Ranch Golf Club", "4900 Himalaya Road", "Denver", "80249", "303.371.3131", "80"),
            ("City Park Golf Course", "3181 E. 23rd Avenue", "Denver", "80205", "720.865.3410", "65"),
            ("Riverdale Golf Club", "13300 Riverdale Road", "Brighton", "80602", "303.659.4700", "74"),
            ("Willis Case Golf Course", "4999 Vrain Street", "Denver", "80212", "720.865.0700", "58"),
        ];

        let mut inner = Inner::default();
        for (name, street, city, zip_code, phone, cost) in seed {
            let id = next(&mut inner.ids.course);
            inner.courses.insert(
                id,
                Course {
                    id,
                    name: name.to_string(),
                    street: street.to_string(),
                    city: city.to_string(),
                    state: "Colorado".to_string(),
                    zip_code: zip_code.to_string(),
                    phone: phone.to_string(),
                    cost: cost.to_string(),
                },
            );
        }

        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Store an already-built event as is, keeping its id and statuses
    pub async fn insert_event(&self, event: Event) -> Event {
        let mut inner = self.inner.write().await;
        inner.ids.event = inner.ids.event.max(event.id);
        inner.events.insert(event.id, event.clone());
        event
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn find_event(&self, id: EventId) -> AppResult<Option<Event>> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        Ok(self.inner.read().await.events.values().cloned().collect())
    }

    async fn list_public_events(&self) -> AppResult<Vec<Event>> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .values()
            .filter(|e| invitation::is_visible_to_community(e))
            .cloned()
            .collect())
    }

    async fn events_for_player(&self, player_id: PlayerId) -> AppResult<Vec<Event>> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .values()
            .filter(|e| e.involves(player_id))
            .cloned()
            .collect())
    }

    async fn create_event(&self, draft: &EventDraft) -> AppResult<Event> {
        let mut inner = self.inner.write().await;

        let course_name = inner
            .courses
            .get(&draft.course_id)
            .map(|c| c.name.clone())
            .ok_or_else(|| AppError::Validation(format!("Course {} does not exist", draft.course_id)))?;
        let host_name = inner
            .player_name(draft.host_id)
            .map_err(|_| AppError::Validation(format!("Player {} does not exist", draft.host_id)))?;
        if let Some(missing) = draft.invitees.iter().find(|id| !inner.players.contains_key(*id)) {
            return Err(AppError::Validation(format!("Player {} does not exist", missing)));
        }

        let id = next(&mut inner.ids.event);
        let mut event = Event::new(id, draft.host_id, draft.private, draft.open_spots);
        event.course_id = draft.course_id;
        event.course_name = course_name;
        event.host_name = host_name;
        event.date = draft.date;
        event.tee_time = draft.tee_time;
        event.number_of_holes = draft.number_of_holes.clone();
        for invitee in &draft.invitees {
            event.set_status(*invitee, InviteStatus::Pending);
        }

        inner.events.insert(id, event.clone());
        Ok(event)
    }

    async fn apply_action(
        &self,
        event_id: EventId,
        actor: PlayerId,
        action: InviteAction,
    ) -> AppResult<ActionOutcome> {
        let mut inner = self.inner.write().await;
        if !inner.players.contains_key(&actor) {
            return Err(AppError::NotFound(format!("Player {} not found", actor)));
        }
        let event = inner
            .events
            .get_mut(&event_id)
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

        let outcome = invitation::apply_action(event, actor, action)?;
        if outcome == ActionOutcome::Deleted {
            inner.events.remove(&event_id);
        }
        Ok(outcome)
    }

    async fn list_courses(&self) -> AppResult<Vec<Course>> {
        Ok(self.inner.read().await.courses.values().cloned().collect())
    }

    async fn find_course(&self, id: CourseId) -> AppResult<Option<Course>> {
        Ok(self.inner.read().await.courses.get(&id).cloned())
    }
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn list_players(&self) -> AppResult<Vec<Player>> {
        Ok(self.inner.read().await.players.values().cloned().collect())
    }

    async fn find_player(&self, id: PlayerId) -> AppResult<Option<Player>> {
        Ok(self.inner.read().await.players.get(&id).cloned())
    }

    async fn create_player(&self, player: &NewPlayer) -> AppResult<Player> {
        let mut inner = self.inner.write().await;

        for existing in inner.players.values() {
            if existing.email == player.email {
                return Err(AppError::Validation(format!(
                    "Duplicate: email {} is already taken",
                    player.email
                )));
            }
            if existing.username == player.username {
                return Err(AppError::Validation(format!(
                    "Duplicate: username {} is already taken",
                    player.username
                )));
            }
        }

        let id = next(&mut inner.ids.player);
        let created = Player {
            id,
            name: player.name.clone(),
            phone: player.phone.clone(),
            email: player.email.clone(),
            username: player.username.clone(),
            created_at: Utc::now().naive_utc(),
        };
        inner.players.insert(id, created.clone());
        Ok(created)
    }

    async fn followee_ids(&self, player_id: PlayerId) -> AppResult<Vec<PlayerId>> {
        let inner = self.inner.read().await;
        Ok(inner
            .friendships
            .iter()
            .filter(|f| f.follower_id == player_id)
            .map(|f| f.followee_id)
            .collect())
    }

    async fn find_or_create_friendship(
        &self,
        follower_id: PlayerId,
        followee_id: PlayerId,
    ) -> AppResult<Friendship> {
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner
            .friendships
            .iter()
            .find(|f| f.follower_id == follower_id && f.followee_id == followee_id)
        {
            return Ok(existing.clone());
        }

        for id in [follower_id, followee_id] {
            if !inner.players.contains_key(&id) {
                return Err(AppError::Validation(format!("Player {} does not exist", id)));
            }
        }

        let friendship = Friendship {
            id: next(&mut inner.ids.friendship),
            follower_id,
            followee_id,
            created_at: Utc::now().naive_utc(),
        };
        inner.friendships.push(friendship.clone());
        Ok(friendship)
    }

    async fn delete_friendship(&self, a: PlayerId, b: PlayerId) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.friendships.len();
        inner.friendships.retain(|f| !f.connects(a, b));
        Ok((before - inner.friendships.len()) as u64)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn create_post(&self, player_id: PlayerId, body: &str) -> AppResult<Post> {
        let mut inner = self.inner.write().await;
        let player_name = inner.player_name(player_id)?;

        let record = PostRecord {
            id: next(&mut inner.ids.post),
            player_id,
            player_name,
            body: body.to_string(),
            created_at: Utc::now().naive_utc(),
        };
        inner.posts.insert(record.id, record.clone());
        Ok(Post::from_parts(record, Vec::new(), Vec::new()))
    }

    async fn list_posts(&self, limit: i64, offset: i64) -> AppResult<Vec<Post>> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .values()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|record| inner.assemble_post(record))
            .collect())
    }

    async fn find_post(&self, id: PostId) -> AppResult<Option<Post>> {
        let inner = self.inner.read().await;
        Ok(inner.posts.get(&id).map(|record| inner.assemble_post(record)))
    }

    async fn delete_post(&self, id: PostId, player_id: PlayerId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let is_author = inner.posts.get(&id).map_or(false, |p| p.player_id == player_id);
        if !is_author {
            return Ok(false);
        }

        inner.posts.remove(&id);
        inner.reactions.retain(|r| r.post_id != id);
        inner.replies.retain(|r| r.post_id != id);
        Ok(true)
    }

    async fn toggle_reaction(
        &self,
        post_id: PostId,
        player_id: PlayerId,
        emoji: &str,
    ) -> AppResult<Vec<Reaction>> {
        let mut inner = self.inner.write().await;
        if !inner.posts.contains_key(&post_id) {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }
        let player_name = inner.player_name(player_id)?;

        let existing = inner
            .reactions
            .iter()
            .position(|r| r.post_id == post_id && r.player_id == player_id && r.emoji == emoji);
        match existing {
            Some(index) => {
                inner.reactions.remove(index);
            }
            None => {
                let reaction = Reaction {
                    id: next(&mut inner.ids.reaction),
                    post_id,
                    player_id,
                    player_name,
                    emoji: emoji.to_string(),
                };
                inner.reactions.push(reaction);
            }
        }

        Ok(inner
            .reactions
            .iter()
            .filter(|r| r.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn create_reply(
        &self,
        post_id: PostId,
        player_id: PlayerId,
        body: &str,
    ) -> AppResult<Reply> {
        let mut inner = self.inner.write().await;
        if !inner.posts.contains_key(&post_id) {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }
        let player_name = inner.player_name(player_id)?;

        let reply = Reply {
            id: next(&mut inner.ids.reply),
            post_id,
            player_id,
            player_name,
            body: body.to_string(),
            created_at: Utc::now().naive_utc(),
        };
        inner.replies.push(reply.clone());
        Ok(reply)
    }

    async fn delete_reply(
        &self,
        post_id: PostId,
        reply_id: i64,
        player_id: PlayerId,
    ) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.replies.len();
        inner
            .replies
            .retain(|r| !(r.id == reply_id && r.post_id == post_id && r.player_id == player_id));
        Ok(inner.replies.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::BTreeSet;

    fn new_player(name: &str) -> NewPlayer {
        NewPlayer {
            name: name.to_string(),
            phone: "555-0100".to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            username: name.to_lowercase(),
        }
    }

    fn draft(host_id: PlayerId, private: bool, invitees: &[PlayerId]) -> EventDraft {
        EventDraft {
            host_id,
            course_id: 1,
            date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            tee_time: NaiveTime::from_hms_opt(13, 20, 0).unwrap(),
            open_spots: 2,
            number_of_holes: "18".to_string(),
            private,
            invitees: invitees.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    #[tokio::test]
    async fn test_create_event_fills_names_and_invites() {
        let store = MemoryStore::with_default_courses();
        let host = store.create_player(&new_player("Eric")).await.unwrap();
        let guest = store.create_player(&new_player("Julie")).await.unwrap();

        let event = store.create_event(&draft(host.id, true, &[guest.id])).await.unwrap();
        assert_eq!(event.course_name, "Green Valley Ranch Golf Club");
        assert_eq!(event.host_name, "Eric");
        assert_eq!(event.accepted(), vec![host.id]);
        assert_eq!(event.pending(), vec![guest.id]);

        assert_eq!(store.events_for_player(guest.id).await.unwrap().len(), 1);
        assert!(store.list_public_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_event_rejects_unknown_invitee() {
        let store = MemoryStore::with_default_courses();
        let host = store.create_player(&new_player("Eric")).await.unwrap();
        let err = store.create_event(&draft(host.id, true, &[99])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.list_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_apply_action_persists_and_deletes() {
        let store = MemoryStore::with_default_courses();
        let host = store.create_player(&new_player("Eric")).await.unwrap();
        let guest = store.create_player(&new_player("Julie")).await.unwrap();
        let event = store.create_event(&draft(host.id, false, &[])).await.unwrap();

        store.apply_action(event.id, guest.id, InviteAction::Join).await.unwrap();
        let stored = store.find_event(event.id).await.unwrap().unwrap();
        assert_eq!(stored.remaining_spots(), 0);

        let outcome = store
            .apply_action(event.id, host.id, InviteAction::CancelByHost)
            .await
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Deleted);
        assert!(store.find_event(event.id).await.unwrap().is_none());

        let err = store
            .apply_action(event.id, guest.id, InviteAction::Accept)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_player_is_rejected() {
        let store = MemoryStore::new();
        store.create_player(&new_player("Eric")).await.unwrap();
        let err = store.create_player(&new_player("Eric")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_friendship_find_or_create_and_symmetric_delete() {
        let store = MemoryStore::new();
        let a = store.create_player(&new_player("Eric")).await.unwrap();
        let b = store.create_player(&new_player("Julie")).await.unwrap();

        let first = store.find_or_create_friendship(a.id, b.id).await.unwrap();
        let again = store.find_or_create_friendship(a.id, b.id).await.unwrap();
        assert_eq!(first, again);
        store.find_or_create_friendship(b.id, a.id).await.unwrap();

        assert_eq!(store.delete_friendship(b.id, a.id).await.unwrap(), 2);
        assert!(store.followee_ids(a.id).await.unwrap().is_empty());
        assert!(store.followee_ids(b.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reaction_toggles() {
        let store = MemoryStore::new();
        let author = store.create_player(&new_player("Eric")).await.unwrap();
        let post = store.create_post(author.id, "Anyone for 9 holes?").await.unwrap();

        let reactions = store.toggle_reaction(post.id, author.id, "⛳").await.unwrap();
        assert_eq!(reactions.len(), 1);
        let reactions = store.toggle_reaction(post.id, author.id, "⛳").await.unwrap();
        assert!(reactions.is_empty());
    }
}
