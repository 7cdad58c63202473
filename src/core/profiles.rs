use std::sync::Arc;

use crate::core::error::MatchError;
use crate::models::{NewUser, Preference, ProfileUpdateRequest, User, UserId, MIN_AGE};
use crate::services::RelationshipStore;

/// Check the profile invariants shared by registration and updates
pub fn check_profile(name: &str, age: u8, preference: &Preference) -> Result<(), MatchError> {
    if name.trim().is_empty() {
        return Err(MatchError::InvalidOperation("name is required".to_string()));
    }
    if age < MIN_AGE {
        return Err(MatchError::InvalidOperation(format!(
            "age must be at least {}",
            MIN_AGE
        )));
    }
    if !preference.has_valid_range() {
        return Err(MatchError::InvalidOperation(
            "wanted age range must not end before it starts".to_string(),
        ));
    }
    Ok(())
}

/// Merge a partial update into a stored user
pub fn apply_update(mut user: User, update: ProfileUpdateRequest) -> User {
    if let Some(name) = update.name {
        user.name = name;
    }
    if let Some(gender) = update.gender {
        user.gender = gender;
    }
    if let Some(age) = update.age {
        user.age = age;
    }
    if let Some(description) = update.description {
        user.description = description;
    }
    if let Some(avatar) = update.avatar {
        user.avatar = avatar;
    }
    if let Some(genders) = update.wanted_genders {
        user.preference.genders = genders;
    }
    if let Some(criteria) = update.wanted_criteria {
        user.preference.criteria = criteria;
    }

    if update.clear_age_from {
        user.preference.age_from = None;
    } else if update.age_from.is_some() {
        user.preference.age_from = update.age_from;
    }
    if update.clear_age_to {
        user.preference.age_to = None;
    } else if update.age_to.is_some() {
        user.preference.age_to = update.age_to;
    }

    user
}

/// Profile store operations the core exposes to collaborators
#[derive(Clone)]
pub struct ProfileDirectory {
    store: Arc<dyn RelationshipStore>,
}

impl ProfileDirectory {
    pub fn new(store: Arc<dyn RelationshipStore>) -> Self {
        Self { store }
    }

    pub async fn register_user(&self, user: NewUser) -> Result<User, MatchError> {
        check_profile(&user.name, user.age, &user.preference)?;

        let created = self.store.create_user(user).await?;
        tracing::info!("Registered user {}", created.id);
        Ok(created)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, MatchError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("user {}", id)))
    }

    /// Apply a partial profile update and re-validate the result
    ///
    /// The merge happens under the user's row lock, so concurrent updates
    /// (including `set_active`) never overwrite each other's fields.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdateRequest,
    ) -> Result<User, MatchError> {
        self.modify(id, |user| {
            let updated = apply_update(user, update);
            check_profile(&updated.name, updated.age, &updated.preference)?;
            Ok(updated)
        })
        .await
    }

    /// Toggle the account's active flag (account verification lives elsewhere)
    pub async fn set_active(&self, id: UserId, active: bool) -> Result<User, MatchError> {
        self.modify(id, |mut user| {
            user.is_active = active;
            Ok(user)
        })
        .await
    }

    async fn modify<F>(&self, id: UserId, change: F) -> Result<User, MatchError>
    where
        F: FnOnce(User) -> Result<User, MatchError>,
    {
        let mut tx = self.store.begin().await?;

        let current = tx
            .user_for_update(id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("user {}", id)))?;

        let saved = tx.update_profile(&change(current)?).await?;
        tx.commit().await?;

        tracing::debug!("Profile of user {} updated", id);
        Ok(saved)
    }
}
