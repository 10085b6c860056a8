//! The view of a guild that commands need from the chat platform.

use async_trait::async_trait;
use common::{ChannelId, GuildId, RoleId, UserId};

/// The kind of a channel, as far as quorum rules are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// A text channel, which can carry a channel-scoped rule.
    Text,
    /// A category grouping other channels, which can carry a category-scoped
    /// rule.
    Category,
    /// Voice channels, threads, forums and anything else.
    Other,
}

/// Lookups against the live state of a guild.
///
/// Implemented by the gateway on top of its cache of guild state.
#[async_trait]
pub trait Guild
where
    Self: Send + Sync,
{
    /// The identifier of the guild.
    fn id(&self) -> GuildId;

    /// The kind of the given channel, or `None` if the guild has no such
    /// channel.
    async fn channel_kind(&self, channel_id: ChannelId) -> Option<ChannelKind>;

    /// The display name of the given channel, or `None` if the guild has no
    /// such channel.
    async fn channel_name(&self, channel_id: ChannelId) -> Option<String>;

    /// Number of members holding the given role, or `None` if the guild has
    /// no such role.
    async fn role_member_count(&self, role_id: RoleId) -> Option<u64>;

    /// Test if the guild has the given role.
    async fn has_role(&self, role_id: RoleId) -> bool {
        self.role_member_count(role_id).await.is_some()
    }
}

/// An incoming guild message.
#[derive(Debug, Clone)]
pub struct Message {
    /// Channel the message was sent in.
    pub channel_id: ChannelId,
    /// Kind of the channel the message was sent in.
    pub channel_kind: ChannelKind,
    /// Category of the channel, if it's in one.
    pub category_id: Option<ChannelId>,
    /// The author of the message.
    pub author_id: UserId,
    /// Whether the author is a bot. Bots are never answered.
    pub author_is_bot: bool,
    /// The text of the message.
    pub content: String,
}
