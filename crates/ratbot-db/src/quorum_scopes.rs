use std::fmt;

use common::{ChannelId, GuildId, Proportion, RoleId, ScopeType};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as QueryError};
use serde::Serialize;

use crate::models;
use crate::StoreError;

/// Outcome of adding a quorum rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum AddOutcome {
    Created,
    /// A rule already exists for the scope and was left as it is.
    AlreadyExists,
}

/// Outcome of updating a quorum rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum UpdateOutcome {
    Updated,
    NotFound,
}

/// Outcome of deleting a quorum rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// A quorum rule for a single channel or category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuorumRule {
    pub guild_id: GuildId,
    pub scope_type: ScopeType,
    pub scope_id: ChannelId,
    pub role_id: RoleId,
    pub proportion: Proportion,
}

impl QuorumRule {
    fn from_db(config: models::QuorumScopeConfig) -> Self {
        Self {
            guild_id: config.guild_id,
            scope_type: config.scope_type,
            scope_id: config.scope_id,
            role_id: config.role_id,
            proportion: config.quorum_proportion,
        }
    }

    /// Number of members required for quorum given the number of members
    /// currently holding the role.
    pub fn quorum_count(&self, members: u64) -> u64 {
        self.proportion.quorum_count(members)
    }
}

impl fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: role {}, proportion {}",
            self.scope_type, self.scope_id, self.role_id, self.proportion
        )
    }
}

/// Local database wrapper.
#[derive(Clone)]
struct Database(crate::Database);

impl Database {
    async fn get(
        &self,
        guild_id: GuildId,
        scope_type: ScopeType,
        scope_id: ChannelId,
    ) -> Result<Option<models::QuorumScopeConfig>, StoreError> {
        self.0
            .asyncify(move |c| Ok(fetch(c, guild_id, scope_type, scope_id)?))
            .await
    }

    /// List all rules of a guild, ordered by scope type and then scope id.
    async fn list(&self, guild_id: GuildId) -> Result<Vec<models::QuorumScopeConfig>, StoreError> {
        use crate::schema::quorum_scope_configs::dsl;

        let mut rules = self
            .0
            .asyncify(move |c| {
                Ok::<_, StoreError>(
                    dsl::quorum_scope_configs
                        .filter(dsl::guild_id.eq(guild_id))
                        .order((dsl::scope_type.asc(), dsl::scope_id.asc()))
                        .load::<models::QuorumScopeConfig>(c)?,
                )
            })
            .await?;

        // SQL sorts ids as signed integers.
        rules.sort_by_key(|r| (r.scope_type, r.scope_id));
        Ok(rules)
    }

    /// Insert the given rule unless one exists for its scope. Returns `false`
    /// if one did.
    async fn insert(&self, config: models::QuorumScopeConfig) -> Result<bool, StoreError> {
        use crate::schema::quorum_scope_configs::dsl;

        self.0
            .asyncify(move |c| {
                if fetch(c, config.guild_id, config.scope_type, config.scope_id)?.is_some() {
                    return Ok(false);
                }

                match diesel::insert_into(dsl::quorum_scope_configs)
                    .values(&config)
                    .execute(c)
                {
                    Ok(..) => Ok(true),
                    Err(QueryError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                        Ok(false)
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    async fn update(
        &self,
        guild_id: GuildId,
        scope_type: ScopeType,
        scope_id: ChannelId,
        role_id: RoleId,
        proportion: Proportion,
    ) -> Result<bool, StoreError> {
        use crate::schema::quorum_scope_configs::dsl;

        self.0
            .asyncify(move |c| {
                let count = diesel::update(
                    dsl::quorum_scope_configs.filter(
                        dsl::guild_id
                            .eq(guild_id)
                            .and(dsl::scope_type.eq(scope_type))
                            .and(dsl::scope_id.eq(scope_id)),
                    ),
                )
                .set((
                    dsl::role_id.eq(role_id),
                    dsl::quorum_proportion.eq(proportion),
                ))
                .execute(c)?;

                Ok(count == 1)
            })
            .await
    }

    async fn delete(
        &self,
        guild_id: GuildId,
        scope_type: ScopeType,
        scope_id: ChannelId,
    ) -> Result<bool, StoreError> {
        use crate::schema::quorum_scope_configs::dsl;

        self.0
            .asyncify(move |c| {
                let count = diesel::delete(
                    dsl::quorum_scope_configs.filter(
                        dsl::guild_id
                            .eq(guild_id)
                            .and(dsl::scope_type.eq(scope_type))
                            .and(dsl::scope_id.eq(scope_id)),
                    ),
                )
                .execute(c)?;

                Ok(count == 1)
            })
            .await
    }
}

fn fetch(
    c: &mut SqliteConnection,
    guild_id: GuildId,
    scope_type: ScopeType,
    scope_id: ChannelId,
) -> QueryResult<Option<models::QuorumScopeConfig>> {
    use crate::schema::quorum_scope_configs::dsl;

    dsl::quorum_scope_configs
        .filter(
            dsl::guild_id
                .eq(guild_id)
                .and(dsl::scope_type.eq(scope_type))
                .and(dsl::scope_id.eq(scope_id)),
        )
        .first::<models::QuorumScopeConfig>(c)
        .optional()
}

/// Quorum rules scoped to channels and categories.
///
/// Rules are not cached, every lookup goes to the store.
#[derive(Clone)]
pub struct QuorumScopes {
    db: Database,
}

impl QuorumScopes {
    pub fn new(db: crate::Database) -> Self {
        Self { db: Database(db) }
    }

    /// Resolve the rule which applies to a channel.
    ///
    /// A rule for the channel itself always wins over a rule for its category,
    /// the category is only consulted if the channel has no rule.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        category_id: Option<ChannelId>,
    ) -> Result<Option<QuorumRule>, StoreError> {
        if let Some(config) = self.db.get(guild_id, ScopeType::Channel, channel_id).await? {
            tracing::trace!("Resolved to channel rule");
            return Ok(Some(QuorumRule::from_db(config)));
        }

        let Some(category_id) = category_id else {
            return Ok(None);
        };

        let config = self
            .db
            .get(guild_id, ScopeType::Category, category_id)
            .await?;

        Ok(config.map(QuorumRule::from_db))
    }

    /// Get the rule for exactly the given scope.
    pub async fn get(
        &self,
        guild_id: GuildId,
        scope_type: ScopeType,
        scope_id: ChannelId,
    ) -> Result<Option<QuorumRule>, StoreError> {
        let config = self.db.get(guild_id, scope_type, scope_id).await?;
        Ok(config.map(QuorumRule::from_db))
    }

    /// List all rules of a guild, channel rules first and each kind ordered by
    /// id.
    pub async fn list(&self, guild_id: GuildId) -> Result<Vec<QuorumRule>, StoreError> {
        let rules = self.db.list(guild_id).await?;
        Ok(rules.into_iter().map(QuorumRule::from_db).collect())
    }

    /// Add a rule for the given scope.
    ///
    /// An existing rule for the same scope is never overwritten, it has to be
    /// updated explicitly.
    #[tracing::instrument(skip(self))]
    pub async fn add(
        &self,
        guild_id: GuildId,
        scope_type: ScopeType,
        scope_id: ChannelId,
        role_id: RoleId,
        proportion: Proportion,
    ) -> Result<AddOutcome, StoreError> {
        let config = models::QuorumScopeConfig {
            guild_id,
            scope_type,
            scope_id,
            role_id,
            quorum_proportion: proportion,
        };

        if !self.db.insert(config).await? {
            tracing::info!("Rule already exists");
            return Ok(AddOutcome::AlreadyExists);
        }

        tracing::info!("Added rule");
        Ok(AddOutcome::Created)
    }

    /// Replace the role and proportion of an existing rule.
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        guild_id: GuildId,
        scope_type: ScopeType,
        scope_id: ChannelId,
        role_id: RoleId,
        proportion: Proportion,
    ) -> Result<UpdateOutcome, StoreError> {
        if !self
            .db
            .update(guild_id, scope_type, scope_id, role_id, proportion)
            .await?
        {
            return Ok(UpdateOutcome::NotFound);
        }

        tracing::info!("Updated rule");
        Ok(UpdateOutcome::Updated)
    }

    /// Delete the rule for the given scope.
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        guild_id: GuildId,
        scope_type: ScopeType,
        scope_id: ChannelId,
    ) -> Result<DeleteOutcome, StoreError> {
        if !self.db.delete(guild_id, scope_type, scope_id).await? {
            return Ok(DeleteOutcome::NotFound);
        }

        tracing::info!("Deleted rule");
        Ok(DeleteOutcome::Deleted)
    }
}
