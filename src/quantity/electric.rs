use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::quantity::{Quantity, power::Watts};

/// Signed battery current, positive while charging.
pub type Amperes = Quantity<1, 0, 0>;

pub type Volts = Quantity<0, 1, 0>;

impl Display for Amperes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} A", self.0.0)
    }
}

impl Debug for Amperes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}A", self.0.0)
    }
}

impl Display for Volts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} V", self.0.0)
    }
}

impl Debug for Volts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}V", self.0.0)
    }
}

impl Mul<Volts> for Amperes {
    type Output = Watts;

    fn mul(self, rhs: Volts) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn current_times_voltage_is_power() {
        assert_abs_diff_eq!(f64::from(Amperes::from(10.0) * Volts::from(48.0)), 480.0);
        assert_abs_diff_eq!(f64::from(Amperes::from(-2.5) * Volts::from(52.0)), -130.0);
    }
}
