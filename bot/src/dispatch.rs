use common::GuildId;

use crate::command::{self, Respond, Response};
use crate::guild::{Guild, Message};
use crate::module::Handlers;

/// Routes guild messages to command handlers.
#[derive(Clone)]
pub struct Dispatcher {
    prefixes: db::Prefixes,
    handlers: Handlers,
}

impl Dispatcher {
    /// Construct a dispatcher for all commands of the bot.
    pub fn new(prefixes: db::Prefixes, quorum_scopes: db::QuorumScopes) -> Self {
        let handlers = Handlers::new(prefixes.clone(), quorum_scopes);
        Self::with_handlers(prefixes, handlers)
    }

    /// Construct a dispatcher with a custom set of handlers.
    pub fn with_handlers(prefixes: db::Prefixes, handlers: Handlers) -> Self {
        Self { prefixes, handlers }
    }

    /// Called once the gateway knows which guilds the bot is in, to load
    /// their prefixes ahead of the first message.
    pub async fn ready<I>(&self, guilds: I)
    where
        I: IntoIterator<Item = GuildId>,
    {
        self.prefixes.warm(guilds).await;
    }

    /// Process a single guild message, returning the responses to deliver.
    ///
    /// Errors are logged and answered, they never escape to the gateway.
    #[tracing::instrument(skip_all, fields(guild = %guild.id(), channel = %message.channel_id))]
    pub async fn process_message(&self, guild: &dyn Guild, message: &Message) -> Vec<Response> {
        if message.author_is_bot {
            return Vec::new();
        }

        let prefix = match self.prefixes.get(guild.id()).await {
            Ok(prefix) => prefix,
            Err(e) => {
                common::log_error!(e, "Failed to resolve prefix, dropping message");
                return Vec::new();
            }
        };

        let Some(rest) = prefix.strip(&message.content) else {
            return Vec::new();
        };

        let mut it = rest.split_whitespace();

        let Some(command) = it.next() else {
            return Vec::new();
        };

        let Some(handler) = self.handlers.get(command) else {
            tracing::trace!("Unknown command: {}", command);
            return Vec::new();
        };

        let mut ctx = command::Context::new(guild, message, prefix, it);

        if let Err(error) = handler.handle(&mut ctx).await {
            if let Some(Respond(m)) = error.downcast_ref::<Respond>() {
                let m = m.clone();
                ctx.respond_ephemeral(m);
            } else {
                ctx.respond_ephemeral("Sorry, something went wrong :(");
                common::log_error!(error, "Error when processing command");
            }
        }

        ctx.into_responses()
    }
}
