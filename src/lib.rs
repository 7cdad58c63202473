//! Lume Relations - relationship-consistency engine for the Lume dating app
//!
//! Decides who may like whom, records likes, turns mutual likes into matches,
//! dissolves matches on unlike or ban, and keeps per-match conversations in a
//! total order. Every cascade commits as a single storage transaction.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    CompatibilityPolicy, ConversationLog, MatchError, Matcher, MatchingPolicy, ProfileDirectory,
    RevokePolicy,
};
pub use models::{Gender, Like, Match, Message, NewUser, PairKey, Preference, User, UserId};
pub use services::{MemoryStore, PostgresStore, RelationshipStore};
