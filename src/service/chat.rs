//! Team chat on the single general channel.

use super::{default_avatar, new_id, normalize_email, now, Dashboard, SEED_ADMIN_EMAIL};
use crate::errors::AppError;
use crate::events::Collection;
use crate::join::join_messages;
use crate::models::{AccessLevel, Message, MessageView, SendMessageRequest, User, GENERAL_CHANNEL};

pub const BOT_NAME: &str = "StaffNet Bot";
pub const BOT_EMAIL: &str = "bot@staffnet.com";

impl Dashboard {
    /// All messages joined with their senders, oldest first.
    pub async fn list_messages(&self) -> Result<Vec<MessageView>, AppError> {
        let messages = self.store.list_messages().await?;
        let staff = self.store.list_users().await?;
        Ok(join_messages(messages, &staff))
    }

    /// Post a message. Blank content is ignored and returns `None`; anything
    /// else is stored exactly as sent.
    ///
    /// The sender is the session user when it still exists; otherwise the
    /// message is attributed to a fallback sender so it is never lost.
    pub async fn send_message(
        &self,
        session_user_id: Option<&str>,
        request: SendMessageRequest,
    ) -> Result<Option<MessageView>, AppError> {
        if request.content.trim().is_empty() {
            return Ok(None);
        }

        let sender = self.resolve_sender(session_user_id).await?;
        let message = Message {
            id: new_id(),
            content: request.content,
            sender_id: sender.id.clone(),
            channel_id: request
                .channel_id
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| GENERAL_CHANNEL.to_string()),
            created_at: now(),
        };

        self.store.insert_message(&message).await?;
        tracing::debug!(message_id = %message.id, sender_id = %sender.id, "Message sent");
        self.publish(Collection::Messages).await;

        Ok(join_messages(vec![message], std::slice::from_ref(&sender)).pop())
    }

    /// Session user, then the seeded admin, then anyone, then a bot account
    /// created on the spot.
    async fn resolve_sender(&self, session_user_id: Option<&str>) -> Result<User, AppError> {
        if let Some(id) = session_user_id {
            if let Some(user) = self.store.get_user(id).await? {
                return Ok(user);
            }
            tracing::warn!(user_id = %id, "Session user missing, using fallback sender");
        }

        if let Some(admin) = self.store.find_user_by_email(SEED_ADMIN_EMAIL).await? {
            return Ok(admin);
        }
        if let Some(user) = self.store.list_users().await?.into_iter().next() {
            return Ok(user);
        }

        let id = new_id();
        let bot = User {
            avatar_url: default_avatar(&id),
            id,
            full_name: BOT_NAME.to_string(),
            email: normalize_email(BOT_EMAIL),
            password: new_id(),
            access_level: AccessLevel::Staff,
            role: Some(AccessLevel::Staff.as_str().to_string()),
            job_title: None,
            status: "Active".to_string(),
            created_at: now(),
        };
        self.store.insert_user(&bot).await?;
        tracing::warn!(user_id = %bot.id, "No users available, created chat bot sender");
        self.publish(Collection::Staff).await;
        Ok(bot)
    }
}
