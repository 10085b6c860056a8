use anyhow::Result;
use async_trait::async_trait;
use common::{ChannelId, Proportion, RoleId, ScopeType};
use db::{AddOutcome, DeleteOutcome, QuorumRule, UpdateOutcome};

use crate::command;
use crate::guild::ChannelKind;

/// Handler for the `quorum` command.
pub struct Quorum {
    quorum_scopes: db::QuorumScopes,
}

impl Quorum {
    pub fn new(quorum_scopes: db::QuorumScopes) -> Self {
        Self { quorum_scopes }
    }

    /// Count the members needed for quorum in the current channel.
    async fn count(&self, ctx: &mut command::Context<'_>) -> Result<()> {
        if ctx.message.channel_kind != ChannelKind::Text {
            ctx.respond_ephemeral("This command can only be used in a text channel.");
            return Ok(());
        }

        let channel_id = ctx.message.channel_id;

        let rule = self
            .quorum_scopes
            .resolve(ctx.guild.id(), channel_id, ctx.message.category_id)
            .await?;

        let Some(rule) = rule else {
            let prefix = ctx.prefix.clone();
            ctx.respond_ephemeral(format!(
                "No quorum config found for this channel or category. Please use `{prefix}quorum config add` to add one."
            ));
            return Ok(());
        };

        // a role which has since been removed has no members.
        let members = ctx
            .guild
            .role_member_count(rule.role_id)
            .await
            .unwrap_or_default();

        let count = rule.quorum_count(members);
        tracing::trace!(?rule, members, count, "Counted quorum");
        ctx.respond(format!(
            "Quorum count for {}: {}",
            channel_id.mention(),
            count
        ));
        Ok(())
    }

    async fn config(&self, ctx: &mut command::Context<'_>) -> Result<()> {
        match ctx.next() {
            Some("add") => {
                let (scope_type, scope_id, role_id, proportion) = rule_arguments(ctx).await?;

                let outcome = self
                    .quorum_scopes
                    .add(ctx.guild.id(), scope_type, scope_id, role_id, proportion)
                    .await?;

                let scope = describe_scope(ctx, scope_type, scope_id).await;

                match outcome {
                    AddOutcome::Created => {
                        ctx.respond_ephemeral(format!(
                            "Quorum config added in {scope} with role {} and proportion {proportion}.",
                            role_id.mention(),
                        ));
                    }
                    AddOutcome::AlreadyExists => {
                        let prefix = ctx.prefix.clone();
                        ctx.respond_ephemeral(format!(
                            "A quorum config already exists for {scope}. Use `{prefix}quorum config update` to change it."
                        ));
                    }
                }
            }
            Some("update") => {
                let (scope_type, scope_id, role_id, proportion) = rule_arguments(ctx).await?;

                let outcome = self
                    .quorum_scopes
                    .update(ctx.guild.id(), scope_type, scope_id, role_id, proportion)
                    .await?;

                let scope = describe_scope(ctx, scope_type, scope_id).await;

                match outcome {
                    UpdateOutcome::Updated => {
                        ctx.respond_ephemeral(format!(
                            "Quorum config updated in {scope} with role {} and proportion {proportion}.",
                            role_id.mention(),
                        ));
                    }
                    UpdateOutcome::NotFound => {
                        ctx.respond_ephemeral(format!("No quorum config found for {scope}."));
                    }
                }
            }
            Some("delete") => {
                let scope_id = ctx.next_str("<scope id>")?;

                let Ok(scope_id) = str::parse::<ChannelId>(scope_id) else {
                    respond_bail!("Invalid scope ID provided. Please provide a valid ID.");
                };

                let scope_type = scope_type(ctx, scope_id).await?;

                let outcome = self
                    .quorum_scopes
                    .delete(ctx.guild.id(), scope_type, scope_id)
                    .await?;

                let scope = describe_scope(ctx, scope_type, scope_id).await;

                match outcome {
                    DeleteOutcome::Deleted => {
                        ctx.respond_ephemeral(format!("Quorum config removed from {scope}."));
                    }
                    DeleteOutcome::NotFound => {
                        ctx.respond_ephemeral(format!("No quorum config found for {scope}."));
                    }
                }
            }
            Some("list") => {
                let rules = self.quorum_scopes.list(ctx.guild.id()).await?;
                ctx.respond_lines(rules.iter().map(RuleLine), "No quorum configs.");
            }
            _ => {
                ctx.respond("Expected: add, update, delete, or list.");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl command::Handler for Quorum {
    async fn handle(&self, ctx: &mut command::Context<'_>) -> Result<()> {
        match ctx.next() {
            Some("count") => self.count(ctx).await,
            Some("config") => self.config(ctx).await,
            _ => {
                ctx.respond("Expected: count or config.");
                Ok(())
            }
        }
    }
}

/// Parse and validate `<scope id> <role id> <proportion>` against the guild.
async fn rule_arguments(
    ctx: &mut command::Context<'_>,
) -> Result<(ScopeType, ChannelId, RoleId, Proportion)> {
    const EXPECTED: &str = "<scope id> <role id> <proportion>";

    let scope_id = ctx.next_str(EXPECTED)?;
    let role_id = ctx.next_str(EXPECTED)?;
    let proportion = ctx.next_str(EXPECTED)?;

    let (Ok(scope_id), Ok(role_id)) = (
        str::parse::<ChannelId>(scope_id),
        str::parse::<RoleId>(role_id),
    ) else {
        respond_bail!("Invalid scope or role ID provided. Please provide valid IDs.");
    };

    let proportion = match str::parse::<Proportion>(proportion) {
        Ok(proportion) => proportion,
        Err(e) => respond_bail!("Invalid proportion provided: {e}."),
    };

    let kind = ctx.guild.channel_kind(scope_id).await;

    if kind.is_none() {
        respond_bail!("Invalid scope ID provided.");
    }

    if !ctx.guild.has_role(role_id).await {
        respond_bail!("Invalid role ID provided.");
    }

    let scope_type = match kind {
        Some(ChannelKind::Text) => ScopeType::Channel,
        Some(ChannelKind::Category) => ScopeType::Category,
        _ => respond_bail!("Invalid channel type for quorum config."),
    };

    Ok((scope_type, scope_id, role_id, proportion))
}

/// The scope type of an existing channel in the guild.
async fn scope_type(ctx: &command::Context<'_>, scope_id: ChannelId) -> Result<ScopeType> {
    match ctx.guild.channel_kind(scope_id).await {
        Some(ChannelKind::Text) => Ok(ScopeType::Channel),
        Some(ChannelKind::Category) => Ok(ScopeType::Category),
        Some(ChannelKind::Other) => respond_bail!("Invalid channel type for quorum config."),
        None => respond_bail!("Invalid scope ID provided."),
    }
}

/// Describe a scope the way users see it.
async fn describe_scope(
    ctx: &command::Context<'_>,
    scope_type: ScopeType,
    scope_id: ChannelId,
) -> String {
    match scope_type {
        ScopeType::Channel => format!("channel {}", scope_id.mention()),
        ScopeType::Category => match ctx.guild.channel_name(scope_id).await {
            Some(name) => format!("category \"{name}\""),
            None => format!("category {scope_id}"),
        },
    }
}

/// A quorum rule rendered for chat.
struct RuleLine<'a>(&'a QuorumRule);

impl std::fmt::Display for RuleLine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = self.0;

        let scope = match rule.scope_type {
            ScopeType::Channel => rule.scope_id.mention().to_string(),
            ScopeType::Category => rule.scope_id.to_string(),
        };

        write!(
            f,
            "{} {}: role {}, proportion {}",
            rule.scope_type,
            scope,
            rule.role_id.mention(),
            rule.proportion
        )
    }
}

#[cfg(test)]
mod tests {
    use common::{Proportion, ScopeType};

    use crate::testing::{Harness, GENERAL, LOBBY, LOOSE, MISSING_ROLE, STAFF, VOICE};

    fn p(s: &str) -> Proportion {
        str::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_count_unconfigured() {
        let harness = Harness::new();

        assert_eq!(
            vec!["No quorum config found for this channel or category. Please use `?quorum config add` to add one."],
            harness.say("?quorum count").await
        );
    }

    #[tokio::test]
    async fn test_count_channel_and_category() {
        let harness = Harness::new();

        // 10 members in staff, category rule applies to channels in it.
        harness
            .add_rule(ScopeType::Category, LOBBY, STAFF, p("0.5"))
            .await;

        assert_eq!(
            vec!["Quorum count for <#10>: 5"],
            harness.say("?quorum count").await
        );

        // channel rule wins over the category.
        harness
            .add_rule(ScopeType::Channel, GENERAL, STAFF, p("0.3412"))
            .await;

        assert_eq!(
            vec!["Quorum count for <#10>: 4"],
            harness.say("?quorum count").await
        );

        // not in the category.
        assert_eq!(1, harness.say_in(LOOSE, "?quorum count").await.len());
        assert!(harness.say_in(LOOSE, "?quorum count").await[0].starts_with("No quorum config"));
    }

    #[tokio::test]
    async fn test_count_missing_role() {
        let harness = Harness::new();

        harness
            .add_rule(ScopeType::Channel, GENERAL, MISSING_ROLE, p("0.5"))
            .await;

        assert_eq!(
            vec!["Quorum count for <#10>: 0"],
            harness.say("?quorum count").await
        );
    }

    #[tokio::test]
    async fn test_count_outside_text_channel() {
        let harness = Harness::new();

        assert_eq!(
            vec!["This command can only be used in a text channel."],
            harness.say_in(VOICE, "?quorum count").await
        );
    }

    #[tokio::test]
    async fn test_add() {
        let harness = Harness::new();

        assert_eq!(
            vec!["Quorum config added in channel <#10> with role <@&100> and proportion 0.5."],
            harness.say("?quorum config add 10 100 0.5").await
        );
        assert_eq!(
            vec!["Quorum config added in category \"Lobby\" with role <@&100> and proportion 0.25."],
            harness.say("?quorum config add 20 100 .25").await
        );
        assert_eq!(
            vec!["A quorum config already exists for channel <#10>. Use `?quorum config update` to change it."],
            harness.say("?quorum config add 10 100 1").await
        );

        let rule = harness
            .quorum_scopes
            .get(harness.guild.id, ScopeType::Channel, GENERAL)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(p("0.5"), rule.proportion);
    }

    #[tokio::test]
    async fn test_add_invalid() {
        let harness = Harness::new();

        let cases = [
            (
                "?quorum config add 10 100",
                "Expected <scope id> <role id> <proportion>",
            ),
            (
                "?quorum config add ten 100 0.5",
                "Invalid scope or role ID provided. Please provide valid IDs.",
            ),
            (
                "?quorum config add 10 -1 0.5",
                "Invalid scope or role ID provided. Please provide valid IDs.",
            ),
            ("?quorum config add 99 100 0.5", "Invalid scope ID provided."),
            ("?quorum config add 10 999 0.5", "Invalid role ID provided."),
            (
                "?quorum config add 30 100 0.5",
                "Invalid channel type for quorum config.",
            ),
            (
                "?quorum config add 10 100 0",
                "Invalid proportion provided: proportion must be greater than 0 and at most 1.",
            ),
            (
                "?quorum config add 10 100 1.5",
                "Invalid proportion provided: proportion must be greater than 0 and at most 1.",
            ),
            (
                "?quorum config add 10 100 lots",
                "Invalid proportion provided: `lots` is not a number.",
            ),
        ];

        for (input, expected) in cases {
            assert_eq!(vec![expected], harness.say(input).await, "{input}");
        }

        assert!(harness
            .quorum_scopes
            .list(harness.guild.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let harness = Harness::new();

        assert_eq!(
            vec!["No quorum config found for channel <#10>."],
            harness.say("?quorum config update 10 100 0.5").await
        );

        harness
            .add_rule(ScopeType::Channel, GENERAL, STAFF, p("0.5"))
            .await;

        assert_eq!(
            vec!["Quorum config updated in channel <#10> with role <@&100> and proportion 0.75."],
            harness.say("?quorum config update 10 100 0.75").await
        );
        assert_eq!(
            vec!["Quorum count for <#10>: 8"],
            harness.say("?quorum count").await
        );

        assert_eq!(
            vec!["Quorum config removed from channel <#10>."],
            harness.say("?quorum config delete 10").await
        );
        assert_eq!(
            vec!["No quorum config found for channel <#10>."],
            harness.say("?quorum config delete 10").await
        );
        assert_eq!(
            vec!["Invalid scope ID provided."],
            harness.say("?quorum config delete 99").await
        );
    }

    #[tokio::test]
    async fn test_list() {
        let harness = Harness::new();

        assert_eq!(
            vec!["No quorum configs."],
            harness.say("?quorum config list").await
        );

        harness
            .add_rule(ScopeType::Category, LOBBY, STAFF, p("0.25"))
            .await;
        harness
            .add_rule(ScopeType::Channel, LOOSE, STAFF, p("1"))
            .await;
        harness
            .add_rule(ScopeType::Channel, GENERAL, STAFF, p("0.5"))
            .await;

        assert_eq!(
            vec![
                "channel <#10>: role <@&100>, proportion 0.5\nchannel <#40>: role <@&100>, proportion 1\ncategory 20: role <@&100>, proportion 0.25"
            ],
            harness.say("?quorum config list").await
        );
    }

    #[tokio::test]
    async fn test_unknown_subcommand() {
        let harness = Harness::new();

        assert_eq!(
            vec!["Expected: count or config."],
            harness.say("?quorum").await
        );
        assert_eq!(
            vec!["Expected: add, update, delete, or list."],
            harness.say("?quorum config").await
        );
    }
}
