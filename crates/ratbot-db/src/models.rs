use common::{ChannelId, GuildId, Proportion, RoleId, ScopeType};

use crate::schema::{guild_configs, quorum_scope_configs};

#[derive(Debug, Clone, PartialEq, Eq, diesel::Queryable, diesel::Insertable)]
#[diesel(table_name = guild_configs)]
pub struct GuildConfig {
    pub guild_id: GuildId,
    /// The raw prefix. Rows are only written through validated prefixes, but
    /// this is what's on disk.
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, diesel::Queryable, diesel::Insertable)]
#[diesel(table_name = quorum_scope_configs)]
pub struct QuorumScopeConfig {
    pub guild_id: GuildId,
    pub scope_type: ScopeType,
    /// The channel or category the rule applies to.
    pub scope_id: ChannelId,
    /// The role whose members make up the quorum denominator.
    pub role_id: RoleId,
    pub quorum_proportion: Proportion,
}
