//! Administration of guild configuration from the command line, operating
//! directly on the database.

use std::fmt;
use std::str;

use anyhow::{anyhow, bail, Context, Result};
use common::{ChannelId, GuildId, Prefix, Proportion, RoleId, ScopeType};
use db::{AddOutcome, DeleteOutcome, UpdateOutcome};
use serde::Serialize;

/// Usage of administrative commands.
pub const USAGE: &str = "\
Commands:
  prefix get <guild>
  prefix set <guild> <prefix>
  quorum add <guild> <channel|category> <scope> <role> <proportion>
  quorum update <guild> <channel|category> <scope> <role> <proportion>
  quorum delete <guild> <channel|category> <scope>
  quorum list <guild>
  quorum resolve <guild> <channel> [<category>]
  quorum count <members> <proportion>
  warm <guild>...";

/// How command output is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Administrative commands.
pub struct Admin {
    prefixes: db::Prefixes,
    quorum_scopes: db::QuorumScopes,
}

impl Admin {
    pub fn new(prefixes: db::Prefixes, quorum_scopes: db::QuorumScopes) -> Self {
        Self {
            prefixes,
            quorum_scopes,
        }
    }

    /// Run the command made up of the given words, returning its output.
    pub async fn run(&self, args: &[String], format: Format) -> Result<String> {
        let mut it = Words::new(args);

        let output = match it.next() {
            Some("prefix") => match it.next() {
                Some("get") => {
                    let guild_id = it.next_parse::<GuildId>("<guild>")?;
                    it.finish()?;
                    let prefix = self.prefixes.get(guild_id).await?;
                    render(format, &GuildPrefix { guild_id, prefix })?
                }
                Some("set") => {
                    let guild_id = it.next_parse::<GuildId>("<guild>")?;
                    let prefix = it.next_parse::<Prefix>("<prefix>")?;
                    it.finish()?;
                    self.prefixes.set(guild_id, prefix.clone()).await?;
                    render(format, &GuildPrefix { guild_id, prefix })?
                }
                _ => bail!("Expected: prefix get, or prefix set"),
            },
            Some("quorum") => self.quorum(&mut it, format).await?,
            Some("warm") => {
                let mut guilds = Vec::new();

                while it.peek().is_some() {
                    guilds.push(it.next_parse::<GuildId>("<guild>")?);
                }

                if guilds.is_empty() {
                    bail!("Expected <guild>...");
                }

                self.prefixes.warm(guilds).await;
                String::new()
            }
            Some(other) => bail!("Unknown command `{}`\n\n{}", other, USAGE),
            None => bail!("Expected a command\n\n{}", USAGE),
        };

        Ok(output)
    }

    async fn quorum(&self, it: &mut Words<'_>, format: Format) -> Result<String> {
        let output = match it.next() {
            Some("add") => {
                let (guild_id, scope_type, scope_id) = scope_arguments(it)?;
                let role_id = it.next_parse::<RoleId>("<role>")?;
                let proportion = it.next_parse::<Proportion>("<proportion>")?;
                it.finish()?;

                let outcome = self
                    .quorum_scopes
                    .add(guild_id, scope_type, scope_id, role_id, proportion)
                    .await?;

                let outcome = match outcome {
                    AddOutcome::Created => "created",
                    AddOutcome::AlreadyExists => "already-exists",
                };

                render(format, &Outcome(outcome))?
            }
            Some("update") => {
                let (guild_id, scope_type, scope_id) = scope_arguments(it)?;
                let role_id = it.next_parse::<RoleId>("<role>")?;
                let proportion = it.next_parse::<Proportion>("<proportion>")?;
                it.finish()?;

                let outcome = self
                    .quorum_scopes
                    .update(guild_id, scope_type, scope_id, role_id, proportion)
                    .await?;

                let outcome = match outcome {
                    UpdateOutcome::Updated => "updated",
                    UpdateOutcome::NotFound => "not-found",
                };

                render(format, &Outcome(outcome))?
            }
            Some("delete") => {
                let (guild_id, scope_type, scope_id) = scope_arguments(it)?;
                it.finish()?;

                let outcome = self
                    .quorum_scopes
                    .delete(guild_id, scope_type, scope_id)
                    .await?;

                let outcome = match outcome {
                    DeleteOutcome::Deleted => "deleted",
                    DeleteOutcome::NotFound => "not-found",
                };

                render(format, &Outcome(outcome))?
            }
            Some("list") => {
                let guild_id = it.next_parse::<GuildId>("<guild>")?;
                it.finish()?;

                let rules = self.quorum_scopes.list(guild_id).await?;

                match format {
                    Format::Json => serde_json::to_string_pretty(&rules)?,
                    Format::Text if rules.is_empty() => String::from("No quorum rules"),
                    Format::Text => rules
                        .iter()
                        .map(|rule| rule.to_string())
                        .collect::<Vec<_>>()
                        .join("\n"),
                }
            }
            Some("resolve") => {
                let guild_id = it.next_parse::<GuildId>("<guild>")?;
                let channel_id = it.next_parse::<ChannelId>("<channel>")?;

                let category_id = match it.peek() {
                    Some(..) => Some(it.next_parse::<ChannelId>("<category>")?),
                    None => None,
                };

                it.finish()?;

                let rule = self
                    .quorum_scopes
                    .resolve(guild_id, channel_id, category_id)
                    .await?;

                match (format, rule) {
                    (Format::Json, rule) => serde_json::to_string_pretty(&rule)?,
                    (Format::Text, Some(rule)) => rule.to_string(),
                    (Format::Text, None) => String::from("No quorum rule applies"),
                }
            }
            Some("count") => {
                let members = it.next_parse::<u64>("<members>")?;
                let proportion = it.next_parse::<Proportion>("<proportion>")?;
                it.finish()?;
                proportion.quorum_count(members).to_string()
            }
            _ => bail!("Expected: quorum add, update, delete, list, resolve, or count"),
        };

        Ok(output)
    }
}

/// Parse `<guild> <channel|category> <scope>`.
fn scope_arguments(it: &mut Words<'_>) -> Result<(GuildId, ScopeType, ChannelId)> {
    let guild_id = it.next_parse::<GuildId>("<guild>")?;
    let scope_type = it.next_parse::<ScopeType>("<channel|category>")?;
    let scope_id = it.next_parse::<ChannelId>("<scope>")?;
    Ok((guild_id, scope_type, scope_id))
}

fn render<T>(format: Format, value: &T) -> Result<String>
where
    T: Serialize + fmt::Display,
{
    Ok(match format {
        Format::Text => value.to_string(),
        Format::Json => serde_json::to_string_pretty(value)?,
    })
}

#[derive(Serialize)]
struct GuildPrefix {
    guild_id: GuildId,
    prefix: Prefix,
}

impl fmt::Display for GuildPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.prefix.fmt(f)
    }
}

#[derive(Serialize)]
struct Outcome(&'static str);

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command-line words being consumed.
struct Words<'a> {
    it: std::iter::Peekable<std::slice::Iter<'a, String>>,
}

impl<'a> Words<'a> {
    fn new(args: &'a [String]) -> Self {
        Self {
            it: args.iter().peekable(),
        }
    }

    fn peek(&mut self) -> Option<&'a str> {
        self.it.peek().copied().map(String::as_str)
    }

    fn next(&mut self) -> Option<&'a str> {
        self.it.next().map(String::as_str)
    }

    fn next_parse<T>(&mut self, m: &str) -> Result<T>
    where
        T: str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let s = self.next().ok_or_else(|| anyhow!("Expected {}", m))?;
        str::parse(s).with_context(|| anyhow!("Bad argument {}: {}", m, s))
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(extra) = self.next() {
            bail!("Unexpected argument `{}`", extra);
        }

        Ok(())
    }
}
