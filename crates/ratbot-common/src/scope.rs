use std::fmt;
use std::str;

use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Integer;
use diesel::sqlite::Sqlite;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad scope type `{0}`, expected one of: channel, category")]
pub struct ScopeTypeError(String);

/// The kind of location a quorum rule applies to.
///
/// The declaration order is the listing order: channel rules sort before
/// category rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Integer)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    Channel,
    Category,
}

impl ScopeType {
    fn to_i32(self) -> i32 {
        match self {
            ScopeType::Channel => 0,
            ScopeType::Category => 1,
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeType::Channel => f.write_str("channel"),
            ScopeType::Category => f.write_str("category"),
        }
    }
}

impl str::FromStr for ScopeType {
    type Err = ScopeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "channel" => Ok(ScopeType::Channel),
            "category" => Ok(ScopeType::Category),
            _ => Err(ScopeTypeError(s.to_owned())),
        }
    }
}

impl ToSql<Integer, Sqlite> for ScopeType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.to_i32());
        Ok(IsNull::No)
    }
}

impl FromSql<Integer, Sqlite> for ScopeType {
    fn from_sql(value: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        match <i32 as FromSql<Integer, Sqlite>>::from_sql(value)? {
            0 => Ok(ScopeType::Channel),
            1 => Ok(ScopeType::Category),
            n => Err(format!("unknown scope type {n} in database").into()),
        }
    }
}
