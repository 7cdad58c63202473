use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type MatchId = i64;
pub type MessageId = i64;

/// Youngest age a profile may declare
pub const MIN_AGE: u8 = 18;

/// Longest message body accepted by the conversation log
pub const MAX_MESSAGE_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            "O" => Ok(Gender::Other),
            other => Err(format!("unknown gender code '{}'", other)),
        }
    }
}

/// What a user says they are looking for beyond demographics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Criteria {
    #[serde(rename = "A")]
    Appearances,
    #[serde(rename = "F")]
    FirstSightLove,
    #[serde(rename = "L")]
    Alchemy,
    #[serde(rename = "U")]
    Undecided,
}

impl Criteria {
    pub fn code(&self) -> &'static str {
        match self {
            Criteria::Appearances => "A",
            Criteria::FirstSightLove => "F",
            Criteria::Alchemy => "L",
            Criteria::Undecided => "U",
        }
    }
}

impl FromStr for Criteria {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(Criteria::Appearances),
            "F" => Ok(Criteria::FirstSightLove),
            "L" => Ok(Criteria::Alchemy),
            "U" => Ok(Criteria::Undecided),
            other => Err(format!("unknown criteria code '{}'", other)),
        }
    }
}

/// Partner preferences stated by a user
///
/// An empty gender list admits every gender; a missing age bound is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    #[serde(rename = "wantedGenders", default)]
    pub genders: Vec<Gender>,
    #[serde(rename = "ageFrom", default)]
    pub age_from: Option<u8>,
    #[serde(rename = "ageTo", default)]
    pub age_to: Option<u8>,
    #[serde(rename = "wantedCriteria", default)]
    pub criteria: Vec<Criteria>,
}

impl Preference {
    pub fn wants_gender(&self, gender: Gender) -> bool {
        self.genders.is_empty() || self.genders.contains(&gender)
    }

    pub fn admits_age(&self, age: u8) -> bool {
        self.age_from.map_or(true, |from| age >= from) && self.age_to.map_or(true, |to| age <= to)
    }

    /// `age_from <= age_to` whenever both are set
    pub fn has_valid_range(&self) -> bool {
        match (self.age_from, self.age_to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }
}

/// A registered user as held by the profile store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "isBanned")]
    pub is_banned: bool,
    #[serde(rename = "isStaff")]
    pub is_staff: bool,
    pub gender: Gender,
    pub age: u8,
    pub description: String,
    pub avatar: String,
    pub preference: Preference,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Active and not banned
    pub fn is_visible(&self) -> bool {
        self.is_active && !self.is_banned
    }
}

/// Profile data supplied when a collaborator registers a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub gender: Gender,
    pub age: u8,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default)]
    pub preference: Preference,
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
    #[serde(rename = "isStaff", default)]
    pub is_staff: bool,
}

pub fn default_avatar() -> String {
    "neutral.png".to_string()
}

/// Directed "liker likes target" fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    #[serde(rename = "likerId")]
    pub liker_id: UserId,
    #[serde(rename = "targetId")]
    pub target_id: UserId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Canonical key for an unordered pair of distinct users
///
/// The lower id always sits in `low`, so `{a, b}` and `{b, a}` produce the
/// same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    low: UserId,
    high: UserId,
}

impl PairKey {
    /// Returns `None` when both ids are the same user
    pub fn new(a: UserId, b: UserId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> UserId {
        self.low
    }

    pub fn high(&self) -> UserId {
        self.high
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.low == user || self.high == user
    }

    pub fn other(&self, user: UserId) -> Option<UserId> {
        if user == self.low {
            Some(self.high)
        } else if user == self.high {
            Some(self.low)
        } else {
            None
        }
    }

    /// 64-bit lock identifier for advisory locking
    ///
    /// Collisions only over-serialize unrelated pairs.
    pub fn lock_id(&self) -> i64 {
        self.low
            .wrapping_mul(0x9E37_79B9_7F4A_7C15_u64 as i64)
            .rotate_left(29)
            ^ self.high
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.low, self.high)
    }
}

/// Mutual like materialized between two users
///
/// `user_id` is always the lower id of the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "matchUserId")]
    pub match_user_id: UserId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn pair(&self) -> Option<PairKey> {
        PairKey::new(self.user_id, self.match_user_id)
    }

    pub fn has_member(&self, user: UserId) -> bool {
        self.user_id == user || self.match_user_id == user
    }

    /// The member that is not `user`
    pub fn counterpart(&self, user: UserId) -> Option<UserId> {
        if self.user_id == user {
            Some(self.match_user_id)
        } else if self.match_user_id == user {
            Some(self.user_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(rename = "matchId")]
    pub match_id: MatchId,
    #[serde(rename = "senderId")]
    pub sender_id: UserId,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Public view of a profile shown in candidate lists and matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: UserId,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub description: String,
    pub avatar: String,
    pub preference: Preference,
}

impl From<&User> for ProfileSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            age: user.age,
            gender: user.gender,
            description: user.description.clone(),
            avatar: user.avatar.clone(),
            preference: user.preference.clone(),
        }
    }
}

/// A match seen from one of its members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub id: MatchId,
    #[serde(rename = "userTarget")]
    pub user_target: ProfileSummary,
    #[serde(rename = "lastMessage")]
    pub last_message: Option<Message>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_canonical() {
        let ab = PairKey::new(7, 3).unwrap();
        let ba = PairKey::new(3, 7).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.low(), 3);
        assert_eq!(ab.high(), 7);
        assert_eq!(ab.lock_id(), ba.lock_id());
        assert_eq!(ab.other(3), Some(7));
        assert_eq!(ab.other(9), None);
    }

    #[test]
    fn test_pair_key_rejects_self_pair() {
        assert!(PairKey::new(4, 4).is_none());
    }

    #[test]
    fn test_preference_defaults_admit_everyone() {
        let pref = Preference::default();
        assert!(pref.wants_gender(Gender::Other));
        assert!(pref.admits_age(18));
        assert!(pref.admits_age(99));
    }

    #[test]
    fn test_preference_range() {
        let pref = Preference {
            genders: vec![Gender::Female],
            age_from: Some(20),
            age_to: Some(30),
            criteria: vec![],
        };
        assert!(pref.admits_age(20));
        assert!(pref.admits_age(30));
        assert!(!pref.admits_age(31));
        assert!(!pref.wants_gender(Gender::Male));

        let inverted = Preference {
            age_from: Some(40),
            age_to: Some(30),
            ..Preference::default()
        };
        assert!(!inverted.has_valid_range());
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::Female);
        assert!("X".parse::<Gender>().is_err());
        assert_eq!(Criteria::Alchemy.code(), "L");
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"M\"");
    }

    #[test]
    fn test_match_counterpart() {
        let m = Match {
            id: 1,
            user_id: 2,
            match_user_id: 5,
            created_at: Utc::now(),
        };
        assert_eq!(m.counterpart(2), Some(5));
        assert_eq!(m.counterpart(5), Some(2));
        assert_eq!(m.counterpart(9), None);
        assert!(!m.has_member(9));
    }
}
