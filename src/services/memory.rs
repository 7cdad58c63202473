use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::core::state::PairSnapshot;
use crate::models::{Like, Match, MatchId, Message, MessageId, NewUser, PairKey, User, UserId};
use crate::services::store::{RelationshipStore, StoreError, StoreResult, StoreTransaction};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    likes: BTreeMap<(UserId, UserId), Like>,
    matches: BTreeMap<MatchId, Match>,
    pair_matches: HashMap<PairKey, MatchId>,
    messages: BTreeMap<MessageId, Message>,
    next_user_id: UserId,
    next_match_id: MatchId,
    next_message_id: MessageId,
    last_message_at: Option<DateTime<Utc>>,
}

impl MemoryState {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn matches_of(&self, user: UserId) -> Vec<Match> {
        let mut matches: Vec<Match> = self
            .matches
            .values()
            .filter(|m| m.has_member(user))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        matches
    }

    fn snapshot(&self, key: PairKey) -> PairSnapshot {
        PairSnapshot {
            key,
            low_likes_high: self.likes.contains_key(&(key.low(), key.high())),
            high_likes_low: self.likes.contains_key(&(key.high(), key.low())),
            matched: self
                .pair_matches
                .get(&key)
                .and_then(|id| self.matches.get(id))
                .cloned(),
        }
    }

    fn remove_match(&mut self, id: MatchId) -> bool {
        let Some(removed) = self.matches.remove(&id) else {
            return false;
        };
        if let Some(key) = removed.pair() {
            self.pair_matches.remove(&key);
        }
        // messages are owned by their match
        self.messages.retain(|_, m| m.match_id != id);
        true
    }
}

/// In-process backend for development and tests
///
/// A transaction holds the single write lock for its whole lifetime and
/// works on a copy of the state that replaces the shared one on commit, so
/// units are serializable and a dropped transaction leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let guard = self.state.clone().write_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let id = MemoryState::next_id(&mut state.next_user_id);
        let created = User {
            id,
            name: user.name,
            is_active: user.is_active,
            is_banned: false,
            is_staff: user.is_staff,
            gender: user.gender,
            age: user.age,
            description: user.description,
            avatar: user.avatar,
            preference: user.preference,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn candidate_pool(&self, viewer: UserId) -> StoreResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.is_visible() && u.id != viewer)
            .filter(|u| !state.likes.contains_key(&(viewer, u.id)))
            .cloned()
            .collect())
    }

    async fn liked_targets(&self, liker: UserId) -> StoreResult<Vec<UserId>> {
        let state = self.state.read().await;
        Ok(state
            .likes
            .keys()
            .filter(|(from, _)| *from == liker)
            .map(|(_, to)| *to)
            .collect())
    }

    async fn likes_of(&self, liker: UserId) -> StoreResult<Vec<Like>> {
        let state = self.state.read().await;
        let mut likes: Vec<Like> = state
            .likes
            .values()
            .filter(|l| l.liker_id == liker)
            .cloned()
            .collect();
        likes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(likes)
    }

    async fn get_match(&self, id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.state.read().await.matches.get(&id).cloned())
    }

    async fn matches_of(&self, user: UserId) -> StoreResult<Vec<Match>> {
        Ok(self.state.read().await.matches_of(user))
    }

    async fn messages_of(&self, match_id: MatchId) -> StoreResult<Vec<Message>> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .values()
            .filter(|m| m.match_id == match_id)
            .cloned()
            .collect())
    }

    async fn last_message_of(&self, match_id: MatchId) -> StoreResult<Option<Message>> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .values()
            .filter(|m| m.match_id == match_id)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
            .cloned())
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}

pub struct MemoryTransaction {
    guard: OwnedRwLockWriteGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_pair(&mut self, _key: PairKey) -> StoreResult<()> {
        // the write guard already excludes every other writer
        Ok(())
    }

    async fn user_for_share(&mut self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn user_for_update(&mut self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn update_profile(&mut self, user: &User) -> StoreResult<User> {
        let stored = self
            .working
            .users
            .get_mut(&user.id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user.id)))?;

        stored.name = user.name.clone();
        stored.gender = user.gender;
        stored.age = user.age;
        stored.description = user.description.clone();
        stored.avatar = user.avatar.clone();
        stored.preference = user.preference.clone();
        stored.is_active = user.is_active;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn pair_snapshot(&mut self, key: PairKey) -> StoreResult<PairSnapshot> {
        Ok(self.working.snapshot(key))
    }

    async fn match_for_share(&mut self, id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.working.matches.get(&id).cloned())
    }

    async fn matches_of(&mut self, user: UserId) -> StoreResult<Vec<Match>> {
        Ok(self.working.matches_of(user))
    }

    async fn insert_like(&mut self, liker: UserId, target: UserId) -> StoreResult<Like> {
        if liker == target {
            return Err(StoreError::InvalidInput("self like".to_string()));
        }
        if self.working.likes.contains_key(&(liker, target)) {
            return Err(StoreError::UniqueViolation(format!("like {} -> {}", liker, target)));
        }
        let like = Like {
            liker_id: liker,
            target_id: target,
            created_at: Utc::now(),
        };
        self.working.likes.insert((liker, target), like.clone());
        Ok(like)
    }

    async fn delete_like(&mut self, liker: UserId, target: UserId) -> StoreResult<bool> {
        Ok(self.working.likes.remove(&(liker, target)).is_some())
    }

    async fn get_or_create_match(&mut self, key: PairKey) -> StoreResult<(Match, bool)> {
        if let Some(existing) = self
            .working
            .pair_matches
            .get(&key)
            .and_then(|id| self.working.matches.get(id))
        {
            return Ok((existing.clone(), false));
        }

        let id = MemoryState::next_id(&mut self.working.next_match_id);
        let created = Match {
            id,
            user_id: key.low(),
            match_user_id: key.high(),
            created_at: Utc::now(),
        };
        self.working.matches.insert(id, created.clone());
        self.working.pair_matches.insert(key, id);
        Ok((created, true))
    }

    async fn delete_match(&mut self, id: MatchId) -> StoreResult<bool> {
        Ok(self.working.remove_match(id))
    }

    async fn set_banned(&mut self, id: UserId, banned: bool) -> StoreResult<User> {
        let user = self
            .working
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        user.is_banned = banned;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_likes_of(&mut self, id: UserId) -> StoreResult<u64> {
        let before = self.working.likes.len();
        self.working
            .likes
            .retain(|(liker, target), _| *liker != id && *target != id);
        Ok((before - self.working.likes.len()) as u64)
    }

    async fn delete_user(&mut self, id: UserId) -> StoreResult<bool> {
        if self.working.matches.values().any(|m| m.has_member(id)) {
            return Err(StoreError::InvalidInput(format!("user {} still has matches", id)));
        }
        Ok(self.working.users.remove(&id).is_some())
    }

    async fn insert_message(
        &mut self,
        match_id: MatchId,
        sender: UserId,
        content: &str,
    ) -> StoreResult<Message> {
        if !self.working.matches.contains_key(&match_id) {
            return Err(StoreError::NotFound(format!("match {}", match_id)));
        }

        // never hand out a timestamp older than the previous message
        let now = Utc::now();
        let created_at = match self.working.last_message_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.working.last_message_at = Some(created_at);

        let id = MemoryState::next_id(&mut self.working.next_message_id);
        let message = Message {
            id,
            match_id,
            sender_id: sender,
            content: content.to_string(),
            created_at,
        };
        self.working.messages.insert(id, message.clone());
        Ok(message)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
