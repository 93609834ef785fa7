//! Reducers that collapse a whole stack into a single value.

use crate::rpc::CalcError;
use std::str::FromStr;

/// One of the four operators accepted by `push_operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Min,
    Max,
    Gcd,
    Lcm,
}

impl Reducer {
    pub fn name(self) -> &'static str {
        match self {
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::Gcd => "gcd",
            Reducer::Lcm => "lcm",
        }
    }

    /// Folds `values` left to right. `Ok(None)` for an empty slice.
    ///
    /// A single value is returned unchanged by every reducer. With two or
    /// more values, `gcd` and `lcm` are computed on magnitudes, so the result
    /// does not depend on the order of the values. Any zero makes `lcm` zero.
    pub fn reduce(self, values: &[i64]) -> Result<Option<i64>, CalcError> {
        let Some((&first, rest)) = values.split_first() else {
            return Ok(None);
        };
        if rest.is_empty() {
            return Ok(Some(first));
        }
        let overflow = || CalcError::Overflow {
            operator: self.name().to_string(),
        };

        let result = match self {
            Reducer::Min => rest.iter().copied().fold(first, i64::min),
            Reducer::Max => rest.iter().copied().fold(first, i64::max),
            Reducer::Gcd => {
                let acc = rest
                    .iter()
                    .fold(first.unsigned_abs(), |acc, &v| gcd(acc, v.unsigned_abs()));
                i64::try_from(acc).map_err(|_| overflow())?
            }
            // A zero anywhere wins before any prefix gets a chance to overflow.
            Reducer::Lcm if values.contains(&0) => 0,
            Reducer::Lcm => {
                let mut acc = first.unsigned_abs();
                for &v in rest {
                    acc = lcm(acc, v.unsigned_abs()).ok_or_else(overflow)?;
                }
                i64::try_from(acc).map_err(|_| overflow())?
            }
        };

        Ok(Some(result))
    }
}

impl FromStr for Reducer {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(Reducer::Min),
            "max" => Ok(Reducer::Max),
            "gcd" => Ok(Reducer::Gcd),
            "lcm" => Ok(Reducer::Lcm),
            other => Err(CalcError::UnknownOperator {
                operator: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Reducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Euclid's algorithm. `gcd(x, 0) == x`.
pub fn gcd(mut x: u64, mut y: u64) -> u64 {
    while y != 0 {
        let r = x % y;
        x = y;
        y = r;
    }
    x
}

/// `x * y / gcd(x, y)`, with any zero operand giving 0.
/// `None` on overflow.
pub fn lcm(x: u64, y: u64) -> Option<u64> {
    if x == 0 || y == 0 {
        return Some(0);
    }
    (x / gcd(x, y)).checked_mul(y)
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
