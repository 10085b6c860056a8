use std::collections::HashMap;
use std::sync::Arc;

use crate::command;

pub mod hello;
pub mod prefix;
pub mod quorum;

/// Collection of command handlers, keyed by command name.
#[derive(Default, Clone)]
pub struct Handlers {
    handlers: HashMap<String, Arc<dyn command::Handler>>,
}

impl Handlers {
    /// Set up the handlers for all commands of the bot.
    pub fn new(prefixes: db::Prefixes, quorum_scopes: db::QuorumScopes) -> Self {
        let mut handlers = Self::default();
        handlers.insert("hello", hello::Hello);
        handlers.insert("prefix", prefix::Prefix::new(prefixes));
        handlers.insert("quorum", quorum::Quorum::new(quorum_scopes));
        handlers
    }

    /// Insert the given handler.
    pub fn insert(&mut self, command: impl AsRef<str>, handler: impl command::Handler) {
        self.handlers
            .insert(command.as_ref().to_lowercase(), Arc::new(handler));
    }

    /// Lookup the given command, ignoring case.
    pub(crate) fn get(&self, command: &str) -> Option<&dyn command::Handler> {
        self.handlers
            .get(&command.to_lowercase())
            .map(|h| h.as_ref())
    }
}
