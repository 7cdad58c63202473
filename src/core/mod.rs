// Core relationship logic exports
pub mod conversation;
pub mod error;
pub mod filters;
pub mod matcher;
pub mod profiles;
pub mod state;

pub use conversation::{order_history, ConversationLog};
pub use error::MatchError;
pub use filters::{filter_candidates, is_candidate, is_compatible, CompatibilityPolicy};
pub use matcher::{BanOutcome, DeleteOutcome, LikeOutcome, Matcher, MatchingPolicy, RevokeOutcome};
pub use profiles::ProfileDirectory;
pub use state::{PairEffect, PairSnapshot, PairState, RevokePolicy};
