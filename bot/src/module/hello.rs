use anyhow::Result;
use async_trait::async_trait;

use crate::command;

/// Handler for the `hello` command.
pub struct Hello;

#[async_trait]
impl command::Handler for Hello {
    async fn handle(&self, ctx: &mut command::Context<'_>) -> Result<()> {
        let user = ctx.message.author_id;
        tracing::info!(%user, "Received hello command");
        ctx.respond_ephemeral(format!("Hello, {}!", user.mention()));
        Ok(())
    }
}
