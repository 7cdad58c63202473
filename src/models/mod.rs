// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Criteria, Gender, Like, Match, MatchId, MatchSummary, Message, MessageId, NewUser, PairKey,
    Preference, ProfileSummary, User, UserId, MAX_MESSAGE_LEN, MIN_AGE,
};
pub use requests::{PostMessageRequest, ProfileUpdateRequest};
pub use responses::{CandidatesResponse, ErrorResponse, HealthResponse, LikeResponse, ModerationResponse};
