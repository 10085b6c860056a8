use std::fmt;
use std::str;

use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Integer;
use diesel::sqlite::Sqlite;
use diesel::{AsExpression, FromSqlRow};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Number of units in a whole, giving four decimal digits of precision.
const SCALE: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProportionError {
    /// The input is not a decimal number.
    #[error("`{0}` is not a number")]
    NotANumber(String),
    /// The proportion is zero, negative or larger than one.
    #[error("proportion must be greater than 0 and at most 1")]
    OutOfRange,
}

/// The fraction of role holders required to reach quorum.
///
/// Stored as a fixed-point number of ten-thousandths in the range `(0, 1]`,
/// which makes it exact in storage and in the quorum arithmetic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Integer)]
pub struct Proportion(u16);

impl Proportion {
    /// The whole group.
    pub const ONE: Proportion = Proportion(SCALE as u16);

    /// Construct a proportion out of a number of ten-thousandths.
    pub fn from_units(units: u32) -> Result<Self, ProportionError> {
        if units == 0 || units > SCALE {
            return Err(ProportionError::OutOfRange);
        }

        Ok(Self(units as u16))
    }

    /// Construct a proportion from a float, rounding to four decimal digits.
    pub fn from_f64(value: f64) -> Result<Self, ProportionError> {
        if !value.is_finite() {
            return Err(ProportionError::NotANumber(value.to_string()));
        }

        let units = (value * SCALE as f64).round();

        if units < 1.0 || units > SCALE as f64 {
            return Err(ProportionError::OutOfRange);
        }

        Ok(Self(units as u16))
    }

    /// Number of ten-thousandths.
    pub fn units(self) -> u32 {
        u32::from(self.0)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / SCALE as f64
    }

    /// Number of members required for quorum out of `members` role holders.
    ///
    /// This is the ceiling of `members * proportion`, so any fractional member
    /// counts as a whole one. No members means a quorum of zero.
    pub fn quorum_count(self, members: u64) -> u64 {
        let product = u128::from(members) * u128::from(self.0);
        product.div_ceil(u128::from(SCALE)) as u64
    }
}

impl str::FromStr for Proportion {
    type Err = ProportionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|_| ProportionError::NotANumber(s.to_owned()))?;

        Self::from_f64(value)
    }
}

impl fmt::Display for Proportion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.units();
        write!(f, "{}", units / SCALE)?;

        let fraction = units % SCALE;

        if fraction != 0 {
            let digits = format!("{fraction:04}");
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }

        Ok(())
    }
}

impl fmt::Debug for Proportion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for Proportion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}

impl ToSql<Integer, Sqlite> for Proportion {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(i32::from(self.0));
        Ok(IsNull::No)
    }
}

impl FromSql<Integer, Sqlite> for Proportion {
    fn from_sql(value: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let units = <i32 as FromSql<Integer, Sqlite>>::from_sql(value)?;
        Ok(Proportion::from_units(u32::try_from(units)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{Proportion, ProportionError};

    #[test]
    fn test_quorum_count() -> Result<(), ProportionError> {
        let p = str::parse::<Proportion>("0.3412")?;
        assert_eq!(3412, p.units());
        assert_eq!(4, p.quorum_count(10));

        let half = str::parse::<Proportion>("0.5")?;
        assert_eq!(5, half.quorum_count(10));
        assert_eq!(6, half.quorum_count(11));
        assert_eq!(0, half.quorum_count(0));

        assert_eq!(7, Proportion::ONE.quorum_count(7));
        assert_eq!(1, Proportion::from_units(1)?.quorum_count(1));
        Ok(())
    }

    #[test]
    fn test_range() {
        assert_eq!(
            Err(ProportionError::OutOfRange),
            str::parse::<Proportion>("0")
        );
        assert_eq!(
            Err(ProportionError::OutOfRange),
            str::parse::<Proportion>("1.0001")
        );
        assert_eq!(
            Err(ProportionError::OutOfRange),
            str::parse::<Proportion>("-0.5")
        );
        assert_eq!(
            Err(ProportionError::OutOfRange),
            str::parse::<Proportion>("0.00004")
        );
        assert!(matches!(
            str::parse::<Proportion>("half"),
            Err(ProportionError::NotANumber(..))
        ));
        assert!(matches!(
            str::parse::<Proportion>("NaN"),
            Err(ProportionError::NotANumber(..))
        ));
    }

    #[test]
    fn test_display() -> Result<(), ProportionError> {
        assert_eq!("0.5", str::parse::<Proportion>("0.50")?.to_string());
        assert_eq!("0.3412", str::parse::<Proportion>("0.34119")?.to_string());
        assert_eq!("0.005", str::parse::<Proportion>("0.005")?.to_string());
        assert_eq!("1", Proportion::ONE.to_string());
        Ok(())
    }

    #[test]
    fn test_serialize() -> Result<(), Box<dyn std::error::Error>> {
        let p = str::parse::<Proportion>("0.25")?;
        assert_eq!("0.25", serde_json::to_string(&p)?);
        Ok(())
    }
}
