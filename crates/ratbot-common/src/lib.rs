//! Types shared between the bot and its database layer.

#[macro_use]
mod macros;

mod id;
pub use self::id::{ChannelId, GuildId, IdError, RoleId, UserId};

mod scope;
pub use self::scope::{ScopeType, ScopeTypeError};

mod proportion;
pub use self::proportion::{Proportion, ProportionError};

mod prefix;
pub use self::prefix::{Prefix, PrefixError};

#[doc(hidden)]
pub use anyhow as __anyhow;
#[doc(hidden)]
pub use tracing as __tracing;
