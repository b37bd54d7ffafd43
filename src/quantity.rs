pub mod electric;
pub mod energy;
pub mod power;

use ordered_float::OrderedFloat;

/// Physical quantity tagged with its dimension exponents.
///
/// The exponents make `current × voltage × time` type-checked: amperes times volts produce watts,
/// and watts times a duration produce watt-seconds.
#[derive(
    Clone,
    Copy,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[from(i32, f64, OrderedFloat<f64>)]
#[must_use]
pub struct Quantity<const CURRENT: isize, const VOLTAGE: isize, const TIME: isize>(
    pub OrderedFloat<f64>,
);

impl<const CURRENT: isize, const VOLTAGE: isize, const TIME: isize>
    Quantity<CURRENT, VOLTAGE, TIME>
{
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.0.0.is_finite()
    }
}

impl<const CURRENT: isize, const VOLTAGE: isize, const TIME: isize> From<Quantity<CURRENT, VOLTAGE, TIME>>
    for f64
{
    fn from(quantity: Quantity<CURRENT, VOLTAGE, TIME>) -> Self {
        quantity.0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Bare = Quantity<0, 0, 0>;

    #[test]
    fn test_is_finite() {
        assert!(Bare::from(1.5).is_finite());
        assert!(!Bare::from(f64::NAN).is_finite());
        assert!(!Bare::from(f64::INFINITY).is_finite());
    }
}
