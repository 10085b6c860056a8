//! Guild command prefixes and quorum rules for a Discord community bot.
//!
//! The gateway connection lives outside of this crate. It hands incoming
//! messages to a [`Dispatcher`] through a [`Guild`] view of the guild they
//! were sent in, and delivers the [`Response`]s that come back.
//!
//! A command-line administration tool operating directly on the database is
//! available through [`cli::main`].

#[macro_use]
mod macros;

pub mod admin;
pub mod cli;
pub mod command;
pub mod config;
mod dispatch;
pub mod guild;
pub mod module;
mod panic_logger;

#[cfg(test)]
mod testing;

pub use self::command::Response;
pub use self::dispatch::Dispatcher;
pub use self::guild::{ChannelKind, Guild, Message};

/// Version of the bot.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
