use std::fmt;
use std::num::ParseIntError;
use std::str;

use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::BigInt;
use diesel::sqlite::Sqlite;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An identifier supplied by a caller which doesn't have the shape of a
/// platform identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id `{input}`")]
pub struct IdError {
    kind: &'static str,
    input: String,
    #[source]
    error: ParseIntError,
}

impl IdError {
    /// The kind of identifier that failed to parse, like `role`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

/// Define a platform identifier (snowflake).
///
/// Snowflakes are unsigned 64-bit values, but SQLite only knows about signed
/// integers. They are stored bit-for-bit in a `BIGINT` column, so values at or
/// above 2^63 come back out of the database unchanged but sort as negative
/// numbers inside of SQL.
macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            AsExpression, FromSqlRow,
        )]
        #[diesel(sql_type = BigInt)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Construct from a raw platform identifier.
            #[inline]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw platform identifier.
            #[inline]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl str::FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().parse::<u64>() {
                    Ok(id) => Ok(Self(id)),
                    Err(error) => Err(IdError {
                        kind: $kind,
                        input: s.to_owned(),
                        error,
                    }),
                }
            }
        }

        impl ToSql<BigInt, Sqlite> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                out.set_value(self.0 as i64);
                Ok(IsNull::No)
            }
        }

        impl FromSql<BigInt, Sqlite> for $name {
            fn from_sql(value: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
                let id = <i64 as FromSql<BigInt, Sqlite>>::from_sql(value)?;
                Ok(Self(id as u64))
            }
        }
    };
}

snowflake! {
    /// The identifier of a guild (a community server).
    GuildId, "guild"
}

snowflake! {
    /// The identifier of a channel. Categories are channels as well.
    ChannelId, "channel"
}

snowflake! {
    /// The identifier of a role.
    RoleId, "role"
}

snowflake! {
    /// The identifier of a user.
    UserId, "user"
}

impl ChannelId {
    /// Format the channel as a chat mention.
    pub fn mention(self) -> impl fmt::Display {
        Mention("#", self.0)
    }
}

impl RoleId {
    /// Format the role as a chat mention.
    pub fn mention(self) -> impl fmt::Display {
        Mention("@&", self.0)
    }
}

impl UserId {
    /// Format the user as a chat mention.
    pub fn mention(self) -> impl fmt::Display {
        Mention("@", self.0)
    }
}

struct Mention(&'static str, u64);

impl fmt::Display for Mention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}{}>", self.0, self.1)
    }
}
