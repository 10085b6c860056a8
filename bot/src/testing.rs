//! A guild and a dispatcher backed by an in-memory database, for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use common::{ChannelId, GuildId, Prefix, Proportion, RoleId, ScopeType, UserId};

use crate::guild::{ChannelKind, Guild, Message};
use crate::Dispatcher;

pub(crate) const GUILD: GuildId = GuildId::new(1000);
/// Text channel in [`LOBBY`].
pub(crate) const GENERAL: ChannelId = ChannelId::new(10);
/// Category.
pub(crate) const LOBBY: ChannelId = ChannelId::new(20);
/// Voice channel in [`LOBBY`].
pub(crate) const VOICE: ChannelId = ChannelId::new(30);
/// Text channel outside of any category.
pub(crate) const LOOSE: ChannelId = ChannelId::new(40);
/// Role with 10 members.
pub(crate) const STAFF: RoleId = RoleId::new(100);
/// Role which doesn't exist in the guild.
pub(crate) const MISSING_ROLE: RoleId = RoleId::new(999);
/// Author of all messages.
pub(crate) const USER: UserId = UserId::new(500);

struct Channel {
    kind: ChannelKind,
    name: &'static str,
    parent: Option<ChannelId>,
}

pub(crate) struct TestGuild {
    pub(crate) id: GuildId,
    channels: HashMap<ChannelId, Channel>,
    roles: HashMap<RoleId, u64>,
}

impl TestGuild {
    fn new() -> Self {
        let mut channels = HashMap::new();

        channels.insert(
            GENERAL,
            Channel {
                kind: ChannelKind::Text,
                name: "general",
                parent: Some(LOBBY),
            },
        );

        channels.insert(
            LOBBY,
            Channel {
                kind: ChannelKind::Category,
                name: "Lobby",
                parent: None,
            },
        );

        channels.insert(
            VOICE,
            Channel {
                kind: ChannelKind::Other,
                name: "voice",
                parent: Some(LOBBY),
            },
        );

        channels.insert(
            LOOSE,
            Channel {
                kind: ChannelKind::Text,
                name: "loose",
                parent: None,
            },
        );

        let mut roles = HashMap::new();
        roles.insert(STAFF, 10);

        Self {
            id: GUILD,
            channels,
            roles,
        }
    }
}

#[async_trait]
impl Guild for TestGuild {
    fn id(&self) -> GuildId {
        self.id
    }

    async fn channel_kind(&self, channel_id: ChannelId) -> Option<ChannelKind> {
        Some(self.channels.get(&channel_id)?.kind)
    }

    async fn channel_name(&self, channel_id: ChannelId) -> Option<String> {
        Some(self.channels.get(&channel_id)?.name.to_owned())
    }

    async fn role_member_count(&self, role_id: RoleId) -> Option<u64> {
        self.roles.get(&role_id).copied()
    }
}

pub(crate) struct Harness {
    pub(crate) db: db::Database,
    pub(crate) guild: TestGuild,
    pub(crate) prefixes: db::Prefixes,
    pub(crate) quorum_scopes: db::QuorumScopes,
    pub(crate) dispatcher: Dispatcher,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let db = db::Database::memory().unwrap();
        let prefixes = db::Prefixes::new(db.clone(), Prefix::default());
        let quorum_scopes = db::QuorumScopes::new(db.clone());
        let dispatcher = Dispatcher::new(prefixes.clone(), quorum_scopes.clone());

        Self {
            db,
            guild: TestGuild::new(),
            prefixes,
            quorum_scopes,
            dispatcher,
        }
    }

    /// A message sent by a user in the given channel.
    pub(crate) fn message(&self, channel_id: ChannelId, content: &str) -> Message {
        let channel = &self.guild.channels[&channel_id];

        Message {
            channel_id,
            channel_kind: channel.kind,
            category_id: channel.parent,
            author_id: USER,
            author_is_bot: false,
            content: content.to_owned(),
        }
    }

    /// Say something in [`GENERAL`], returning the text of all responses.
    pub(crate) async fn say(&self, content: &str) -> Vec<String> {
        self.say_in(GENERAL, content).await
    }

    /// Say something in the given channel, returning the text of all
    /// responses.
    pub(crate) async fn say_in(&self, channel_id: ChannelId, content: &str) -> Vec<String> {
        let message = self.message(channel_id, content);

        self.dispatcher
            .process_message(&self.guild, &message)
            .await
            .into_iter()
            .map(|response| response.text)
            .collect()
    }

    pub(crate) async fn add_rule(
        &self,
        scope_type: ScopeType,
        scope_id: ChannelId,
        role_id: RoleId,
        proportion: Proportion,
    ) {
        let outcome = self
            .quorum_scopes
            .add(GUILD, scope_type, scope_id, role_id, proportion)
            .await
            .unwrap();

        assert_eq!(db::AddOutcome::Created, outcome);
    }
}
