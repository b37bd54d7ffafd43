//! Sign-split integration of battery power into the charged and discharged energy totals.

use std::time::Duration;

use tokio::time::Instant;

use crate::{
    prelude::*,
    quantity::{
        electric::{Amperes, Volts},
        energy::EnergyUnit,
        power::Watts,
    },
};

/// Running totals in the configured [`EnergyUnit`].
///
/// Both values only grow while the process is running.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EnergyTotals {
    pub charged: f64,
    pub discharged: f64,
}

impl EnergyTotals {
    pub const ZERO: Self = Self { charged: 0.0, discharged: 0.0 };

    /// Net energy that stayed in the battery.
    #[must_use]
    pub fn net(self) -> f64 {
        self.charged - self.discharged
    }
}

/// Instantaneous battery reading taken once per tick.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct PowerSample {
    pub current: Amperes,
    pub voltage: Volts,
    pub timestamp: Instant,
}

impl PowerSample {
    pub fn power(&self) -> Watts {
        self.current * self.voltage
    }
}

/// Neumaier-compensated sum: keeps the low-order bits that a plain `f64` addition of a tiny
/// increment onto a large total would drop.
#[derive(Copy, Clone, Default)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    const fn new(value: f64) -> Self {
        Self { sum: value, compensation: 0.0 }
    }

    fn add(&mut self, value: f64) {
        let sum = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - sum) + value;
        } else {
            self.compensation += (value - sum) + self.sum;
        }
        self.sum = sum;
    }

    fn value(self) -> f64 {
        self.sum + self.compensation
    }
}

/// Single owner of the running totals.
pub struct EnergyAccumulator {
    unit: EnergyUnit,
    charged: CompensatedSum,
    discharged: CompensatedSum,
}

impl EnergyAccumulator {
    pub const fn new(unit: EnergyUnit, seed: EnergyTotals) -> Self {
        Self {
            unit,
            charged: CompensatedSum::new(seed.charged),
            discharged: CompensatedSum::new(seed.discharged),
        }
    }

    pub fn totals(&self) -> EnergyTotals {
        EnergyTotals { charged: self.charged.value(), discharged: self.discharged.value() }
    }

    /// Advance the totals by the sample's power held constant over `time_delta`.
    ///
    /// Positive energy goes to the charged total, negative energy to the discharged one.
    pub fn integrate(&mut self, sample: &PowerSample, time_delta: Duration) {
        let energy = sample.power() * time_delta;
        if !energy.is_finite() {
            warn!(?sample.current, ?sample.voltage, "non-finite energy delta, ignoring the sample");
            return;
        }
        let delta = self.unit.from_watt_seconds(energy);
        if delta > 0.0 {
            self.charged.add(delta);
        } else if delta < 0.0 {
            self.discharged.add(-delta);
        }
    }
}
