use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Criteria, Gender};

/// Partial profile update sent by the current user
///
/// Missing fields keep their stored value. Nested preference fields follow
/// the same rule; `clearAgeFrom` / `clearAgeTo` reset a bound to open.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub gender: Option<Gender>,
    #[validate(range(min = 18))]
    pub age: Option<u8>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub avatar: Option<String>,
    #[serde(rename = "wantedGenders")]
    pub wanted_genders: Option<Vec<Gender>>,
    #[serde(rename = "ageFrom")]
    pub age_from: Option<u8>,
    #[serde(rename = "ageTo")]
    pub age_to: Option<u8>,
    #[serde(rename = "clearAgeFrom", default)]
    pub clear_age_from: bool,
    #[serde(rename = "clearAgeTo", default)]
    pub clear_age_to: bool,
    #[serde(rename = "wantedCriteria")]
    pub wanted_criteria: Option<Vec<Criteria>>,
}

/// Message posted into a match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostMessageRequest {
    #[validate(length(min = 1, max = 255))]
    #[serde(alias = "message")]
    pub content: String,
}
