use anyhow::Result;
use async_trait::async_trait;

use crate::command;

/// Handler for the `prefix` command.
pub struct Prefix {
    prefixes: db::Prefixes,
}

impl Prefix {
    pub fn new(prefixes: db::Prefixes) -> Self {
        Self { prefixes }
    }
}

#[async_trait]
impl command::Handler for Prefix {
    async fn handle(&self, ctx: &mut command::Context<'_>) -> Result<()> {
        match ctx.next() {
            None => {
                let prefix = ctx.prefix.clone();
                ctx.respond(format!("The prefix is `{prefix}`."));
            }
            Some("set") => {
                let prefix = ctx.next_parse::<common::Prefix, _>("<prefix>")?;
                self.prefixes.set(ctx.guild.id(), prefix.clone()).await?;
                ctx.respond(format!("Prefix set to `{prefix}`."));
            }
            Some(..) => {
                ctx.respond("Expected: set.");
            }
        }

        Ok(())
    }
}
