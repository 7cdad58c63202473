use async_trait::async_trait;
use thiserror::Error;

use crate::core::state::PairSnapshot;
use crate::models::{Like, Match, MatchId, Message, NewUser, PairKey, User, UserId};

/// Errors that can occur in a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Serialization failure or deadlock; the unit can be replayed
    #[error("Serialization failure: {0}")]
    SerializationFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable home of users, likes, matches and messages
///
/// Plain reads run at read-committed isolation without locks. Every write
/// goes through a [`StoreTransaction`] obtained from [`begin`](Self::begin).
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>>;

    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Active, unbanned users other than `viewer` that `viewer` has not liked
    async fn candidate_pool(&self, viewer: UserId) -> StoreResult<Vec<User>>;

    async fn liked_targets(&self, liker: UserId) -> StoreResult<Vec<UserId>>;

    async fn likes_of(&self, liker: UserId) -> StoreResult<Vec<Like>>;

    async fn get_match(&self, id: MatchId) -> StoreResult<Option<Match>>;

    /// Matches involving `user`, newest first
    async fn matches_of(&self, user: UserId) -> StoreResult<Vec<Match>>;

    async fn messages_of(&self, match_id: MatchId) -> StoreResult<Vec<Message>>;

    /// Newest message of a match by (created_at, id)
    async fn last_message_of(&self, match_id: MatchId) -> StoreResult<Option<Message>>;

    async fn health_check(&self) -> StoreResult<bool>;
}

/// One atomic unit of work
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards
/// every change made through it.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Serialize all writers of `key` until this transaction ends
    async fn lock_pair(&mut self, key: PairKey) -> StoreResult<()>;

    /// Read a user and keep it from being modified until this transaction ends
    async fn user_for_share(&mut self, id: UserId) -> StoreResult<Option<User>>;

    /// Read a user and lock it against other writers
    ///
    /// The lock does not block foreign-key checks of rows referencing the
    /// user, so message inserts by the user are not held up by it.
    async fn user_for_update(&mut self, id: UserId) -> StoreResult<Option<User>>;

    /// Overwrite profile, preference and active fields (not the ban flag)
    async fn update_profile(&mut self, user: &User) -> StoreResult<User>;

    async fn pair_snapshot(&mut self, key: PairKey) -> StoreResult<PairSnapshot>;

    /// Read a match and keep it from being deleted until this transaction ends
    async fn match_for_share(&mut self, id: MatchId) -> StoreResult<Option<Match>>;

    async fn matches_of(&mut self, user: UserId) -> StoreResult<Vec<Match>>;

    async fn insert_like(&mut self, liker: UserId, target: UserId) -> StoreResult<Like>;

    async fn delete_like(&mut self, liker: UserId, target: UserId) -> StoreResult<bool>;

    /// Returns the pair's match and whether this call created it
    async fn get_or_create_match(&mut self, key: PairKey) -> StoreResult<(Match, bool)>;

    async fn delete_match(&mut self, id: MatchId) -> StoreResult<bool>;

    async fn set_banned(&mut self, id: UserId, banned: bool) -> StoreResult<User>;

    /// Remove every like given or received by `id`
    async fn delete_likes_of(&mut self, id: UserId) -> StoreResult<u64>;

    /// Remove the user row; the user's matches must already be gone
    async fn delete_user(&mut self, id: UserId) -> StoreResult<bool>;

    async fn insert_message(
        &mut self,
        match_id: MatchId,
        sender: UserId,
        content: &str,
    ) -> StoreResult<Message>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
