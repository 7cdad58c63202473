use std::sync::Arc;

use crate::core::error::MatchError;
use crate::models::{Match, MatchId, Message, UserId, MAX_MESSAGE_LEN};
use crate::services::RelationshipStore;

/// Total order over a match's messages: timestamp, then insertion id
pub fn order_history(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    messages
}

/// Reject empty or oversized message bodies
pub fn check_content(content: &str) -> Result<(), MatchError> {
    if content.trim().is_empty() {
        return Err(MatchError::InvalidOperation("message content is empty".to_string()));
    }
    let len = content.chars().count();
    if len > MAX_MESSAGE_LEN {
        return Err(MatchError::InvalidOperation(format!(
            "message content is {} characters, limit is {}",
            len, MAX_MESSAGE_LEN
        )));
    }
    Ok(())
}

/// Messages scoped to a match
#[derive(Clone)]
pub struct ConversationLog {
    store: Arc<dyn RelationshipStore>,
}

impl ConversationLog {
    pub fn new(store: Arc<dyn RelationshipStore>) -> Self {
        Self { store }
    }

    /// Append a message to a match
    ///
    /// The match row is share-locked for the duration, so a concurrent
    /// dissolution either waits for the post or makes it fail with `NotFound`.
    pub async fn post_message(
        &self,
        match_id: MatchId,
        sender: UserId,
        content: &str,
    ) -> Result<Message, MatchError> {
        check_content(content)?;

        let mut tx = self.store.begin().await?;

        let found = tx
            .match_for_share(match_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("match {}", match_id)))?;

        if !found.has_member(sender) {
            return Err(MatchError::Forbidden(format!(
                "user {} is not a member of match {}",
                sender, match_id
            )));
        }

        let message = tx.insert_message(match_id, sender, content).await?;
        tx.commit().await?;

        tracing::debug!("Message {} posted to match {} by {}", message.id, match_id, sender);

        Ok(message)
    }

    /// All messages of a match in ascending order
    pub async fn history(&self, viewer: UserId, match_id: MatchId) -> Result<Vec<Message>, MatchError> {
        self.member_match(viewer, match_id).await?;

        let messages = self.store.messages_of(match_id).await?;
        Ok(order_history(messages))
    }

    /// Most recent message of a match, if any
    pub async fn last_message(
        &self,
        viewer: UserId,
        match_id: MatchId,
    ) -> Result<Option<Message>, MatchError> {
        self.member_match(viewer, match_id).await?;
        Ok(self.store.last_message_of(match_id).await?)
    }

    async fn member_match(&self, viewer: UserId, match_id: MatchId) -> Result<Match, MatchError> {
        let found = self
            .store
            .get_match(match_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("match {}", match_id)))?;

        if !found.has_member(viewer) {
            return Err(MatchError::Forbidden(format!(
                "user {} is not a member of match {}",
                viewer, match_id
            )));
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn message(id: i64, offset_ms: i64) -> Message {
        Message {
            id,
            match_id: 1,
            sender_id: if id % 2 == 0 { 1 } else { 2 },
            content: format!("m{}", id),
            created_at: Utc::now().date_naive().and_hms_opt(12, 0, 0).unwrap().and_utc()
                + Duration::milliseconds(offset_ms),
        }
    }

    #[test]
    fn test_history_orders_by_time_then_id() {
        // arrival order differs from creation order, 3 and 4 share a timestamp
        let shuffled = vec![message(4, 20), message(1, 0), message(3, 20), message(2, 5)];

        let ordered = order_history(shuffled);
        let ids: Vec<i64> = ordered.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(ordered.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn test_content_bounds() {
        assert!(check_content("hi").is_ok());
        assert!(matches!(check_content("   "), Err(MatchError::InvalidOperation(_))));
        assert!(check_content(&"x".repeat(MAX_MESSAGE_LEN)).is_ok());
        assert!(check_content(&"x".repeat(MAX_MESSAGE_LEN + 1)).is_err());
    }
}
