use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

pub type WattSeconds = Quantity<1, 1, 1>;

impl WattSeconds {
    pub const PER_KILOWATT_HOUR: f64 = 3_600_000.0;
}

impl Display for WattSeconds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} Ws", self.0.0)
    }
}

impl Debug for WattSeconds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}Ws", self.0.0)
    }
}

/// Unit the running totals are kept, published and persisted in.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum EnergyUnit {
    /// Watt-seconds (joules).
    #[value(name = "ws")]
    WattSeconds,

    /// Kilowatt-hours, what the Victron `History` paths expect.
    #[default]
    #[value(name = "kwh")]
    KilowattHours,
}

impl EnergyUnit {
    /// Express the energy as a bare number in this unit.
    #[must_use]
    pub fn from_watt_seconds(self, energy: WattSeconds) -> f64 {
        match self {
            Self::WattSeconds => f64::from(energy),
            Self::KilowattHours => f64::from(energy) / WattSeconds::PER_KILOWATT_HOUR,
        }
    }

    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::WattSeconds => "Ws",
            Self::KilowattHours => "kWh",
        }
    }
}

impl Display for EnergyUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}
