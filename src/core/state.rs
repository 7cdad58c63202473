//! Per-pair relationship state machine
//!
//! The storage layer loads a [`PairSnapshot`] inside the pair's atomic unit,
//! the planners below decide which rows change, and the caller applies the
//! resulting [`PairEffect`]s in order before committing.

use serde::{Deserialize, Serialize};

use crate::core::error::MatchError;
use crate::models::{Match, MatchId, PairKey, UserId};

/// What happens to the other party's like when a match is dissolved by an unlike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokePolicy {
    /// Both likes are removed and the pair returns to `NoRelation`
    #[default]
    ClearBoth,
    /// The other party's like survives and the pair becomes one-sided
    KeepCounterpart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    NoRelation,
    OneSidedLike { liker: UserId, target: UserId },
    Matched(MatchId),
    /// Both likes exist without a match, left behind by a ban
    Dormant,
}

/// Rows that exist for one unordered pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSnapshot {
    pub key: PairKey,
    pub low_likes_high: bool,
    pub high_likes_low: bool,
    pub matched: Option<Match>,
}

impl PairSnapshot {
    pub fn empty(key: PairKey) -> Self {
        Self {
            key,
            low_likes_high: false,
            high_likes_low: false,
            matched: None,
        }
    }

    pub fn has_like(&self, liker: UserId, target: UserId) -> bool {
        if liker == self.key.low() && target == self.key.high() {
            self.low_likes_high
        } else if liker == self.key.high() && target == self.key.low() {
            self.high_likes_low
        } else {
            false
        }
    }

    pub fn state(&self) -> PairState {
        if let Some(m) = &self.matched {
            return PairState::Matched(m.id);
        }
        match (self.low_likes_high, self.high_likes_low) {
            (false, false) => PairState::NoRelation,
            (true, false) => PairState::OneSidedLike {
                liker: self.key.low(),
                target: self.key.high(),
            },
            (false, true) => PairState::OneSidedLike {
                liker: self.key.high(),
                target: self.key.low(),
            },
            (true, true) => PairState::Dormant,
        }
    }
}

/// A single row change inside a pair's atomic unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairEffect {
    InsertLike { liker: UserId, target: UserId },
    DeleteLike { liker: UserId, target: UserId },
    /// Get-or-create the match for the pair
    CreateMatch,
    DeleteMatch(MatchId),
}

/// Plan `create_like(liker -> target)` against the current pair rows
///
/// Eligibility is checked separately; this only handles the like/match
/// transitions.
pub fn plan_like(
    snapshot: &PairSnapshot,
    liker: UserId,
    target: UserId,
) -> Result<Vec<PairEffect>, MatchError> {
    if liker == target {
        return Err(MatchError::InvalidOperation("a user cannot like themselves".to_string()));
    }

    if snapshot.has_like(liker, target) {
        return Err(MatchError::Conflict(format!(
            "user {} already likes user {}",
            liker, target
        )));
    }

    let mut effects = vec![PairEffect::InsertLike { liker, target }];

    // Reciprocity: the second half of a mutual like materializes the match
    if snapshot.has_like(target, liker) && snapshot.matched.is_none() {
        effects.push(PairEffect::CreateMatch);
    }

    Ok(effects)
}

/// Plan `revoke_like(liker -> target)`
///
/// The match, if any, is dissolved before any like is removed. A missing
/// like yields no like deletion, so revoking twice is harmless.
pub fn plan_revoke(
    snapshot: &PairSnapshot,
    liker: UserId,
    target: UserId,
    policy: RevokePolicy,
) -> Vec<PairEffect> {
    let mut effects = Vec::new();

    if let Some(m) = &snapshot.matched {
        effects.push(PairEffect::DeleteMatch(m.id));
    }

    if snapshot.has_like(liker, target) {
        effects.push(PairEffect::DeleteLike { liker, target });
    }

    if snapshot.matched.is_some()
        && policy == RevokePolicy::ClearBoth
        && snapshot.has_like(target, liker)
    {
        effects.push(PairEffect::DeleteLike {
            liker: target,
            target: liker,
        });
    }

    effects
}

/// Matches a ban of `user` must dissolve
pub fn plan_ban(user: UserId, matches: &[Match]) -> Vec<MatchId> {
    matches
        .iter()
        .filter(|m| m.has_member(user))
        .map(|m| m.id)
        .collect()
}
