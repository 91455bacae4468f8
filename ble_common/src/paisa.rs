use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const INR_CURRENCY_CODE: &str = "INR";
pub const INR_CURRENCY_CODE_LOWER: &str = "inr";

//--------------------------------------       Paisa        ----------------------------------------------------------
/// Money as an integral number of paise (1/100 INR). All ledger arithmetic happens in this type; rupee-decimal
/// representations only exist at the gateway boundary.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Paisa(i64);

op!(binary Paisa, Add, add);
op!(binary Paisa, Sub, sub);
op!(inplace Paisa, SubAssign, sub_assign);
op!(unary Paisa, Neg, neg);

impl Mul<i64> for Paisa {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Paisa {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in paise: {0}")]
pub struct PaisaConversionError(String);

impl From<i64> for Paisa {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Paisa {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Paisa {}

impl TryFrom<u64> for Paisa {
    type Error = PaisaConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(PaisaConversionError(format!("Value {} is too large to convert to Paisa", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Paisa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.abs() < 100 {
            write!(f, "{}p", self.0)
        } else {
            let rupees = self.0 as f64 / 100.0;
            write!(f, "₹{rupees:0.2}")
        }
    }
}

impl Paisa {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_rupees(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    /// Integer percentage of this amount, truncating toward zero.
    pub fn percent(&self, pct: i64) -> Self {
        Self(self.0 * pct / 100)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Paisa::from(45).to_string(), "45p");
        assert_eq!(Paisa::from(14200).to_string(), "₹142.00");
        assert_eq!(Paisa::from(-5050).to_string(), "₹-50.50");
    }

    #[test]
    fn percent_truncates_toward_zero() {
        assert_eq!(Paisa::from(14200).percent(1), Paisa::from(142));
        assert_eq!(Paisa::from(199).percent(1), Paisa::from(1));
        assert_eq!(Paisa::from(99).percent(1), Paisa::from(0));
        assert_eq!(Paisa::from(-199).percent(1), Paisa::from(-1));
    }

    #[test]
    fn arithmetic() {
        let total: Paisa = [Paisa::from(5000), Paisa::from(-1200), Paisa::from(300)].into_iter().sum();
        assert_eq!(total, Paisa::from(4100));
        assert_eq!(Paisa::from_rupees(142) - Paisa::from(142), Paisa::from(14058));
        assert_eq!(-Paisa::from(100), Paisa::from(-100));
    }
}
