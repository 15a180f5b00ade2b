use std::{
    fmt::{self, Display},
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{de, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// The number of minor units in one loyalty point.
pub const POINTS_SCALE: i64 = 100;

//--------------------------------------       Points        ---------------------------------------------------------
/// A loyalty point amount, stored as an integer number of hundredths of a point.
///
/// All ledger arithmetic happens on the integer representation. The JSON representation is a decimal number of whole
/// points (e.g. `729.98`), and conversion from JSON rounds to the nearest hundredth.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[sqlx(transparent)]
pub struct Points(i64);

op!(binary Points, Add, add);
op!(binary Points, Sub, sub);
op!(inplace Points, AddAssign, add_assign);
op!(inplace Points, SubAssign, sub_assign);
op!(unary Points, Neg, neg);

impl Sum for Points {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented as loyalty points: {0}")]
pub struct PointsConversionError(String);

/// Creates a `Points` value from a raw number of hundredths.
impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<f64> for Points {
    type Error = PointsConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let scaled = (value * POINTS_SCALE as f64).round();
        if !scaled.is_finite() || scaled >= i64::MAX as f64 || scaled < i64::MIN as f64 {
            return Err(PointsConversionError(format!("{value} is out of range")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(scaled as i64))
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = POINTS_SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / scale, abs % scale)
    }
}

impl Points {
    pub fn zero() -> Self {
        Self(0)
    }

    /// The raw value, in hundredths of a point.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_whole(points: i64) -> Self {
        Self(points * POINTS_SCALE)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / POINTS_SCALE as f64
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PointsVisitor)
    }
}

struct PointsVisitor;

impl<'de> Visitor<'de> for PointsVisitor {
    type Value = Points;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number of loyalty points")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        v.checked_mul(POINTS_SCALE).map(Points).ok_or_else(|| E::custom(format!("{v} is out of range")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let v = i64::try_from(v).map_err(|_| E::custom(format!("{v} is out of range")))?;
        self.visit_i64(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Points::try_from(v).map_err(E::custom)
    }
}
