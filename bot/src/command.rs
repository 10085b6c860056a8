//! Traits and shared plumbing for text commands (e.g. `?quorum count`)

use std::borrow::Cow;
use std::fmt;
use std::str;

use anyhow::Result;
use async_trait::async_trait;
use common::Prefix;
use thiserror::Error;

use crate::guild::{Guild, Message};

#[async_trait]
/// The handler trait for a given command.
pub trait Handler
where
    Self: 'static + Send + Sync,
{
    /// Handle the command.
    async fn handle(&self, ctx: &mut Context<'_>) -> Result<()>;
}

/// An error we can propagate to generate a response to the user, which is
/// useful for aborting commands on bad input.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Respond(pub Cow<'static, str>);

/// A reply produced by a command, to be delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The text of the reply.
    pub text: String,
    /// Whether the reply should only be visible to the user who issued the
    /// command.
    pub ephemeral: bool,
}

/// Context for a single command invocation.
pub struct Context<'a> {
    /// The guild the command was issued in.
    pub guild: &'a dyn Guild,
    /// The message carrying the command.
    pub message: &'a Message,
    /// The prefix the command was issued with.
    pub prefix: Prefix,
    it: str::SplitWhitespace<'a>,
    responses: Vec<Response>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        guild: &'a dyn Guild,
        message: &'a Message,
        prefix: Prefix,
        it: str::SplitWhitespace<'a>,
    ) -> Self {
        Self {
            guild,
            message,
            prefix,
            it,
            responses: Vec::new(),
        }
    }

    /// Respond to the user with a message.
    pub fn respond(&mut self, m: impl fmt::Display) {
        self.responses.push(Response {
            text: m.to_string(),
            ephemeral: false,
        });
    }

    /// Respond with a message only visible to the user.
    pub fn respond_ephemeral(&mut self, m: impl fmt::Display) {
        self.responses.push(Response {
            text: m.to_string(),
            ephemeral: true,
        });
    }

    /// Render an iterable of results as one line each, or `empty` if there
    /// are none.
    pub fn respond_lines<I>(&mut self, results: I, empty: &str)
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        let lines = results
            .into_iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>();

        if lines.is_empty() {
            self.respond(empty);
        } else {
            self.respond(lines.join("\n"));
        }
    }

    /// Get the next argument.
    pub fn next(&mut self) -> Option<&'a str> {
        self.it.next()
    }

    /// Take the next parameter.
    pub fn next_str<M>(&mut self, m: M) -> Result<&'a str>
    where
        M: fmt::Display,
    {
        Ok(self.next().ok_or_else(|| respond_err!("Expected {}", m))?)
    }

    /// Take the next parameter and parse as the given type.
    pub fn next_parse<T, M>(&mut self, m: M) -> Result<T>
    where
        T: str::FromStr,
        T::Err: fmt::Display,
        M: fmt::Display,
    {
        let s = self.next_str(m)?;

        match str::parse(s) {
            Ok(v) => Ok(v),
            Err(e) => respond_bail!("Bad argument: {}: {}", s, e),
        }
    }

    /// Take the responses collected so far.
    pub(crate) fn into_responses(self) -> Vec<Response> {
        self.responses
    }
}
