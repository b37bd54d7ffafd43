use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
    time::Duration,
};

use crate::quantity::{Quantity, energy::WattSeconds};

pub type Watts = Quantity<1, 1, 0>;

impl Display for Watts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} W", self.0.0)
    }
}

impl Debug for Watts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}W", self.0.0)
    }
}

impl Mul<Duration> for Watts {
    type Output = WattSeconds;

    fn mul(self, rhs: Duration) -> Self::Output {
        Quantity(self.0 * rhs.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn power_times_duration_is_energy() {
        let energy = Watts::from(480.0) * Duration::from_millis(100);
        assert_abs_diff_eq!(f64::from(energy), 48.0, epsilon = 1e-12);
    }
}
