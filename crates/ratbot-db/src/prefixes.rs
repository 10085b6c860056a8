use std::collections::HashMap;
use std::sync::Arc;

use common::{GuildId, Prefix};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as QueryError};
use parking_lot::Mutex;
use tokio::sync::OnceCell;

use crate::models::GuildConfig;
use crate::StoreError;

/// Local database wrapper.
#[derive(Clone)]
struct Database(crate::Database);

impl Database {
    /// Fetch the configuration of a guild, creating it with the given prefix
    /// if it doesn't exist.
    async fn get_or_create(
        &self,
        guild_id: GuildId,
        prefix: &Prefix,
    ) -> Result<GuildConfig, StoreError> {
        let config = GuildConfig {
            guild_id,
            prefix: prefix.to_string(),
        };

        self.0
            .asyncify(move |c| {
                if let Some(existing) = fetch(c, guild_id)? {
                    return Ok(existing);
                }

                Ok(insert_or_fetch(c, config)?)
            })
            .await
    }

    /// Insert or replace the prefix of a guild.
    async fn set(&self, guild_id: GuildId, prefix: &Prefix) -> Result<(), StoreError> {
        use crate::schema::guild_configs::dsl;

        let prefix = prefix.to_string();

        self.0
            .asyncify(move |c| {
                diesel::insert_into(dsl::guild_configs)
                    .values((dsl::guild_id.eq(guild_id), dsl::prefix.eq(&prefix)))
                    .on_conflict(dsl::guild_id)
                    .do_update()
                    .set(dsl::prefix.eq(&prefix))
                    .execute(c)?;

                Ok(())
            })
            .await
    }
}

fn fetch(c: &mut SqliteConnection, guild_id: GuildId) -> QueryResult<Option<GuildConfig>> {
    use crate::schema::guild_configs::dsl;

    dsl::guild_configs
        .filter(dsl::guild_id.eq(guild_id))
        .first::<GuildConfig>(c)
        .optional()
}

/// Insert the given configuration. If someone else got there first, their
/// row is what we use.
fn insert_or_fetch(c: &mut SqliteConnection, config: GuildConfig) -> QueryResult<GuildConfig> {
    use crate::schema::guild_configs::dsl;

    match diesel::insert_into(dsl::guild_configs)
        .values(&config)
        .execute(c)
    {
        Ok(..) => Ok(config),
        Err(QueryError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            fetch(c, config.guild_id)?.ok_or(QueryError::NotFound)
        }
        Err(e) => Err(e),
    }
}

/// Command prefixes of guilds, loaded on first use and kept for the lifetime
/// of the process.
///
/// Looking up a guild which has never been seen before creates its
/// configuration with the default prefix.
#[derive(Clone)]
pub struct Prefixes {
    inner: Arc<Mutex<HashMap<GuildId, Arc<OnceCell<Prefix>>>>>,
    db: Database,
    default: Prefix,
}

impl Prefixes {
    /// Construct an empty prefix cache.
    pub fn new(db: crate::Database, default: Prefix) -> Prefixes {
        Prefixes {
            inner: Arc::new(Mutex::new(HashMap::new())),
            db: Database(db),
            default,
        }
    }

    /// The prefix used for guilds which haven't configured one.
    pub fn default_prefix(&self) -> &Prefix {
        &self.default
    }

    /// Get the prefix of the given guild.
    ///
    /// Concurrent lookups of a guild that isn't loaded yet share a single
    /// load, while other guilds are unaffected.
    pub async fn get(&self, guild_id: GuildId) -> Result<Prefix, StoreError> {
        let cell = self.inner.lock().entry(guild_id).or_default().clone();
        let prefix = cell.get_or_try_init(|| self.load(guild_id)).await?;
        Ok(prefix.clone())
    }

    /// Set the prefix of the given guild.
    ///
    /// The store is written first, so a failure leaves the cache untouched.
    #[tracing::instrument(skip(self))]
    pub async fn set(&self, guild_id: GuildId, prefix: Prefix) -> Result<(), StoreError> {
        self.db.set(guild_id, &prefix).await?;

        let cell = Arc::new(OnceCell::new_with(Some(prefix)));
        self.inner.lock().insert(guild_id, cell);
        tracing::info!("Updated prefix");
        Ok(())
    }

    /// Load the prefixes of all the given guilds.
    ///
    /// Failing to load one guild is logged, and doesn't prevent the others from
    /// loading.
    pub async fn warm<I>(&self, guilds: I)
    where
        I: IntoIterator<Item = GuildId>,
    {
        let mut loaded = 0usize;

        for guild_id in guilds {
            match self.get(guild_id).await {
                Ok(..) => loaded += 1,
                Err(e) => {
                    common::log_warn!(e, "Failed to load prefix of guild {}", guild_id);
                }
            }
        }

        tracing::info!("Loaded prefixes of {} guild(s)", loaded);
    }

    #[tracing::instrument(skip(self))]
    async fn load(&self, guild_id: GuildId) -> Result<Prefix, StoreError> {
        let config = self.db.get_or_create(guild_id, &self.default).await?;

        match Prefix::new(&config.prefix) {
            Ok(prefix) => {
                tracing::trace!(%prefix, "Loaded prefix");
                Ok(prefix)
            }
            Err(e) => {
                tracing::warn!(
                    "Stored prefix `{}` is unusable ({}), using `{}`",
                    config.prefix,
                    e,
                    self.default
                );
                Ok(self.default.clone())
            }
        }
    }
}
