use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{User, UserId};

/// Which side's stated preferences must admit the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityPolicy {
    /// Both users' preferences admit each other
    #[default]
    Symmetric,
    /// Only the viewer's preferences are checked against the candidate
    OneWay,
}

/// Does `seeker` want someone like `other`?
#[inline]
pub fn admits(seeker: &User, other: &User) -> bool {
    seeker.preference.wants_gender(other.gender) && seeker.preference.admits_age(other.age)
}

/// Demographic compatibility between a viewer and a candidate under `policy`
#[inline]
pub fn is_compatible(viewer: &User, candidate: &User, policy: CompatibilityPolicy) -> bool {
    match policy {
        CompatibilityPolicy::Symmetric => admits(viewer, candidate) && admits(candidate, viewer),
        CompatibilityPolicy::OneWay => admits(viewer, candidate),
    }
}

/// Full candidate predicate
///
/// `already_liked` tells whether `viewer` already has a like on `candidate`.
#[inline]
pub fn is_candidate(
    viewer: &User,
    candidate: &User,
    already_liked: bool,
    policy: CompatibilityPolicy,
) -> bool {
    // Skip hidden profiles
    if !candidate.is_visible() {
        return false;
    }

    if candidate.id == viewer.id || already_liked {
        return false;
    }

    is_compatible(viewer, candidate, policy)
}

/// Apply the candidate predicate to a pool, ordered by user id
pub fn filter_candidates(
    viewer: &User,
    pool: Vec<User>,
    liked: &HashSet<UserId>,
    policy: CompatibilityPolicy,
) -> Vec<User> {
    let mut candidates: Vec<User> = pool
        .into_iter()
        .filter(|candidate| is_candidate(viewer, candidate, liked.contains(&candidate.id), policy))
        .collect();

    candidates.sort_by_key(|user| user.id);
    candidates.dedup_by_key(|user| user.id);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Preference};
    use chrono::Utc;

    fn create_test_user(id: UserId, gender: Gender, age: u8, wants: &[Gender], from: u8, to: u8) -> User {
        User {
            id,
            name: format!("User {}", id),
            is_active: true,
            is_banned: false,
            is_staff: false,
            gender,
            age,
            description: String::new(),
            avatar: "neutral.png".to_string(),
            preference: Preference {
                genders: wants.to_vec(),
                age_from: Some(from),
                age_to: Some(to),
                criteria: vec![],
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_mutually_compatible_pair() {
        let a = create_test_user(1, Gender::Male, 25, &[Gender::Female], 20, 30);
        let b = create_test_user(2, Gender::Female, 22, &[], 18, 30);

        assert!(is_candidate(&a, &b, false, CompatibilityPolicy::Symmetric));
        assert!(is_candidate(&b, &a, false, CompatibilityPolicy::Symmetric));
    }

    #[test]
    fn test_symmetric_requires_both_sides() {
        let a = create_test_user(1, Gender::Male, 25, &[Gender::Female], 20, 30);
        // b only wants people aged 18-21
        let b = create_test_user(2, Gender::Female, 22, &[], 18, 21);

        assert!(!is_candidate(&a, &b, false, CompatibilityPolicy::Symmetric));
        assert!(is_candidate(&a, &b, false, CompatibilityPolicy::OneWay));
    }

    #[test]
    fn test_self_liked_and_hidden_are_excluded() {
        let a = create_test_user(1, Gender::Male, 25, &[], 18, 99);
        let mut b = create_test_user(2, Gender::Female, 22, &[], 18, 99);

        assert!(!is_candidate(&a, &a, false, CompatibilityPolicy::OneWay));
        assert!(!is_candidate(&a, &b, true, CompatibilityPolicy::OneWay));

        b.is_banned = true;
        assert!(!is_candidate(&a, &b, false, CompatibilityPolicy::OneWay));

        b.is_banned = false;
        b.is_active = false;
        assert!(!is_candidate(&a, &b, false, CompatibilityPolicy::OneWay));
    }

    #[test]
    fn test_filter_candidates_orders_and_skips_liked() {
        let viewer = create_test_user(1, Gender::Male, 25, &[], 18, 99);
        let pool = vec![
            create_test_user(9, Gender::Female, 30, &[], 18, 99),
            create_test_user(4, Gender::Other, 40, &[], 18, 99),
            create_test_user(6, Gender::Female, 22, &[], 18, 99),
            viewer.clone(),
        ];
        let liked: HashSet<UserId> = [6].into_iter().collect();

        let result = filter_candidates(&viewer, pool, &liked, CompatibilityPolicy::Symmetric);
        let ids: Vec<UserId> = result.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![4, 9]);
    }
}
