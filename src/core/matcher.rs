use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use crate::core::{
    error::MatchError,
    filters::{filter_candidates, is_candidate, CompatibilityPolicy},
    state::{plan_ban, plan_like, plan_revoke, PairEffect, RevokePolicy},
};
use crate::models::{
    Like, Match, MatchId, MatchSummary, PairKey, ProfileSummary, User, UserId,
};
use crate::services::{RelationshipStore, StoreTransaction};

/// Tunables of the like/match rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPolicy {
    pub compatibility: CompatibilityPolicy,
    pub revoke: RevokePolicy,
    /// Extra attempts granted to an atomic unit that lost a race
    pub race_retries: u8,
}

impl Default for MatchingPolicy {
    fn default() -> Self {
        Self {
            compatibility: CompatibilityPolicy::Symmetric,
            revoke: RevokePolicy::ClearBoth,
            race_retries: 1,
        }
    }
}

/// Result of `create_like`
#[derive(Debug, Clone)]
pub struct LikeOutcome {
    pub like: Like,
    /// The pair's match when the like completed reciprocity
    pub matched: Option<Match>,
    pub match_created: bool,
}

/// Result of `revoke_like`
#[derive(Debug, Clone, Default)]
pub struct RevokeOutcome {
    pub like_removed: bool,
    pub dissolved: Option<MatchId>,
    /// The other party's like was removed along with the match
    pub counterpart_removed: bool,
}

/// Result of `ban`
#[derive(Debug, Clone)]
pub struct BanOutcome {
    pub user: User,
    pub dissolved: Vec<MatchId>,
}

/// Result of `delete_account`
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub user: UserId,
    pub dissolved: Vec<MatchId>,
    pub likes_removed: u64,
}

/// Rows touched while applying a pair plan
#[derive(Debug, Default)]
struct Applied {
    like: Option<Like>,
    matched: Option<(Match, bool)>,
    dissolved: Option<MatchId>,
    removed_likes: Vec<(UserId, UserId)>,
}

async fn apply_effects(
    tx: &mut Box<dyn StoreTransaction>,
    key: PairKey,
    effects: &[PairEffect],
) -> Result<Applied, MatchError> {
    let mut applied = Applied::default();

    for effect in effects {
        match *effect {
            PairEffect::InsertLike { liker, target } => {
                applied.like = Some(tx.insert_like(liker, target).await?);
            }
            PairEffect::DeleteLike { liker, target } => {
                if tx.delete_like(liker, target).await? {
                    applied.removed_likes.push((liker, target));
                }
            }
            PairEffect::CreateMatch => {
                applied.matched = Some(tx.get_or_create_match(key).await?);
            }
            PairEffect::DeleteMatch(id) => {
                if tx.delete_match(id).await? {
                    applied.dissolved = Some(id);
                }
            }
        }
    }

    Ok(applied)
}

/// Like ledger and match engine
///
/// Every write runs as one storage transaction: the like insert, the
/// reciprocity test and the conditional match creation commit together, as
/// do a revoke and the dissolution it triggers.
#[derive(Clone)]
pub struct Matcher {
    store: Arc<dyn RelationshipStore>,
    policy: MatchingPolicy,
}

impl Matcher {
    pub fn new(store: Arc<dyn RelationshipStore>, policy: MatchingPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> MatchingPolicy {
        self.policy
    }

    /// Replay `unit` while it reports `RaceLost`, up to the configured budget
    async fn retrying<T, F, Fut>(&self, operation: &str, mut unit: F) -> Result<T, MatchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, MatchError>>,
    {
        let mut attempt: u8 = 0;
        loop {
            match unit().await {
                Err(MatchError::RaceLost(reason)) if attempt < self.policy.race_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "{} lost a race ({}), retrying (attempt {})",
                        operation,
                        reason,
                        attempt
                    );
                }
                result => return result,
            }
        }
    }

    async fn existing_user(&self, id: UserId) -> Result<User, MatchError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("user {}", id)))
    }

    /// Users `viewer` may currently like
    pub async fn candidates(&self, viewer: UserId) -> Result<Vec<User>, MatchError> {
        let viewer = self.existing_user(viewer).await?;

        let pool = self.store.candidate_pool(viewer.id).await?;
        let liked: HashSet<UserId> = self.store.liked_targets(viewer.id).await?.into_iter().collect();
        let total = pool.len();

        let candidates = filter_candidates(&viewer, pool, &liked, self.policy.compatibility);

        tracing::debug!(
            "User {} has {} candidates (from a pool of {})",
            viewer.id,
            candidates.len(),
            total
        );

        Ok(candidates)
    }

    /// Record `liker -> target` and materialize the match if it is mutual
    pub async fn create_like(&self, liker: UserId, target: UserId) -> Result<LikeOutcome, MatchError> {
        self.retrying("create_like", || self.try_create_like(liker, target))
            .await
    }

    async fn try_create_like(&self, liker: UserId, target: UserId) -> Result<LikeOutcome, MatchError> {
        let key = PairKey::new(liker, target)
            .ok_or_else(|| MatchError::InvalidOperation("a user cannot like themselves".to_string()))?;

        let mut tx = self.store.begin().await?;
        tx.lock_pair(key).await?;

        // Row locks are always taken lower id first
        let low = tx.user_for_share(key.low()).await?;
        let high = tx.user_for_share(key.high()).await?;
        let (liker_user, target_user) = if liker == key.low() { (low, high) } else { (high, low) };

        let liker_user =
            liker_user.ok_or_else(|| MatchError::NotFound(format!("user {}", liker)))?;
        let target_user =
            target_user.ok_or_else(|| MatchError::NotFound(format!("user {}", target)))?;

        if !liker_user.is_visible() {
            return Err(MatchError::Forbidden(format!(
                "user {} is inactive or banned",
                liker
            )));
        }

        let snapshot = tx.pair_snapshot(key).await?;
        let effects = plan_like(&snapshot, liker, target)?;

        // Eligibility is re-checked under the pair lock, never trusted from a prior read
        if !is_candidate(&liker_user, &target_user, false, self.policy.compatibility) {
            return Err(MatchError::NotEligible(format!(
                "user {} is not a candidate for user {}",
                target, liker
            )));
        }

        let applied = apply_effects(&mut tx, key, &effects).await?;
        tx.commit().await?;

        let like = applied
            .like
            .ok_or_else(|| MatchError::InvalidOperation(format!("like {} -> {} was not recorded", liker, target)))?;
        let (matched, match_created) = match applied.matched {
            Some((m, created)) => (Some(m), created),
            None => (None, false),
        };

        if let (Some(m), true) = (&matched, match_created) {
            tracing::info!("Match {} created for pair {}", m.id, key);
        } else {
            tracing::debug!("Recorded like {} -> {}", liker, target);
        }

        Ok(LikeOutcome {
            like,
            matched,
            match_created,
        })
    }

    /// Remove `liker -> target` and dissolve the pair's match
    ///
    /// Revoking a like that does not exist is a successful no-op.
    pub async fn revoke_like(&self, liker: UserId, target: UserId) -> Result<RevokeOutcome, MatchError> {
        self.retrying("revoke_like", || self.try_revoke_like(liker, target))
            .await
    }

    async fn try_revoke_like(&self, liker: UserId, target: UserId) -> Result<RevokeOutcome, MatchError> {
        let Some(key) = PairKey::new(liker, target) else {
            return Ok(RevokeOutcome::default());
        };

        let mut tx = self.store.begin().await?;
        tx.lock_pair(key).await?;

        let snapshot = tx.pair_snapshot(key).await?;
        let effects = plan_revoke(&snapshot, liker, target, self.policy.revoke);
        if effects.is_empty() {
            return Ok(RevokeOutcome::default());
        }

        let applied = apply_effects(&mut tx, key, &effects).await?;
        tx.commit().await?;

        let outcome = RevokeOutcome {
            like_removed: applied.removed_likes.contains(&(liker, target)),
            dissolved: applied.dissolved,
            counterpart_removed: applied.removed_likes.contains(&(target, liker)),
        };

        if let Some(id) = outcome.dissolved {
            tracing::info!(
                "Match {} for pair {} dissolved by unlike ({} like(s) removed)",
                id,
                key,
                applied.removed_likes.len()
            );
        }

        Ok(outcome)
    }

    /// Likes given by `user`, newest first
    pub async fn list_likes_of(&self, user: UserId) -> Result<Vec<Like>, MatchError> {
        self.existing_user(user).await?;
        Ok(self.store.likes_of(user).await?)
    }

    /// Ban a user and dissolve every match they are part of
    ///
    /// Likes are left untouched. Banning an already banned user succeeds.
    pub async fn ban(&self, user: UserId) -> Result<BanOutcome, MatchError> {
        self.retrying("ban", || self.try_ban(user)).await
    }

    async fn try_ban(&self, user: UserId) -> Result<BanOutcome, MatchError> {
        let mut tx = self.store.begin().await?;

        let current = tx
            .user_for_update(user)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("user {}", user)))?;

        let matches = tx.matches_of(user).await?;
        let mut dissolved = Vec::new();
        for id in plan_ban(user, &matches) {
            if tx.delete_match(id).await? {
                dissolved.push(id);
            }
        }

        let banned = if current.is_banned {
            current
        } else {
            tx.set_banned(user, true).await?
        };

        tx.commit().await?;

        tracing::info!("User {} banned, {} match(es) dissolved", user, dissolved.len());

        Ok(BanOutcome {
            user: banned,
            dissolved,
        })
    }

    /// Lift a ban; nothing lost to the ban is restored
    pub async fn unban(&self, user: UserId) -> Result<User, MatchError> {
        self.retrying("unban", || self.try_unban(user)).await
    }

    async fn try_unban(&self, user: UserId) -> Result<User, MatchError> {
        let mut tx = self.store.begin().await?;

        let current = tx
            .user_for_update(user)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("user {}", user)))?;

        if !current.is_banned {
            return Ok(current);
        }

        let unbanned = tx.set_banned(user, false).await?;
        tx.commit().await?;

        tracing::info!("User {} unbanned", user);
        Ok(unbanned)
    }

    /// Delete an account together with its matches, messages and likes
    ///
    /// Runs as one unit: the user row is locked first so no new like or
    /// match can involve the user, then every match is dissolved the same
    /// way a ban does it before the likes and the user row go.
    pub async fn delete_account(&self, user: UserId) -> Result<DeleteOutcome, MatchError> {
        self.retrying("delete_account", || self.try_delete_account(user))
            .await
    }

    async fn try_delete_account(&self, user: UserId) -> Result<DeleteOutcome, MatchError> {
        let mut tx = self.store.begin().await?;

        tx.user_for_update(user)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("user {}", user)))?;

        let matches = tx.matches_of(user).await?;
        let mut dissolved = Vec::new();
        for id in plan_ban(user, &matches) {
            if tx.delete_match(id).await? {
                dissolved.push(id);
            }
        }

        let likes_removed = tx.delete_likes_of(user).await?;
        tx.delete_user(user).await?;
        tx.commit().await?;

        tracing::info!(
            "User {} deleted, {} match(es) dissolved, {} like(s) removed",
            user,
            dissolved.len(),
            likes_removed
        );

        Ok(DeleteOutcome {
            user,
            dissolved,
            likes_removed,
        })
    }

    async fn summarize(&self, viewer: UserId, m: Match) -> Result<MatchSummary, MatchError> {
        let other = m
            .counterpart(viewer)
            .ok_or_else(|| MatchError::NotFound(format!("match {}", m.id)))?;
        let other = self.existing_user(other).await?;

        let last_message = self.store.last_message_of(m.id).await?;

        Ok(MatchSummary {
            id: m.id,
            user_target: ProfileSummary::from(&other),
            last_message,
            created_at: m.created_at,
        })
    }

    /// Matches of `user`, newest first
    pub async fn matches_for(&self, user: UserId) -> Result<Vec<MatchSummary>, MatchError> {
        self.existing_user(user).await?;

        let matches = self.store.matches_of(user).await?;
        let mut summaries = Vec::with_capacity(matches.len());
        for m in matches {
            summaries.push(self.summarize(user, m).await?);
        }
        Ok(summaries)
    }

    /// A single match; absent and foreign matches are indistinguishable
    pub async fn get_match(&self, viewer: UserId, match_id: MatchId) -> Result<MatchSummary, MatchError> {
        let found = self
            .store
            .get_match(match_id)
            .await?
            .filter(|m| m.has_member(viewer))
            .ok_or_else(|| MatchError::NotFound(format!("match {}", match_id)))?;

        self.summarize(viewer, found).await
    }
}
