//! Shared state bus: named values at hierarchical paths, e.g. `/Dc/0/Voltage`.

mod gateway;
#[cfg(test)]
pub mod memory;
mod value;

use std::sync::Arc;

use async_trait::async_trait;

pub use self::{gateway::GatewayClient, value::Value};
use crate::prelude::*;

#[async_trait]
pub trait StateBus: Send + Sync {
    async fn get_value(&self, path: &str) -> Result<Value>;

    async fn set_value(&self, path: &str, value: Value) -> Result;

    /// Read a numeric value.
    async fn get_f64(&self, path: &str) -> Result<f64> {
        f64::try_from(self.get_value(path).await?)
            .with_context(|| format!("`{path}` is not a number"))
    }
}

#[async_trait]
impl<B: StateBus + ?Sized> StateBus for Arc<B> {
    async fn get_value(&self, path: &str) -> Result<Value> {
        (**self).get_value(path).await
    }

    async fn set_value(&self, path: &str, value: Value) -> Result {
        (**self).set_value(path, value).await
    }
}

/// Bus paths the monitor reads from and writes to.
#[must_use]
#[derive(Clone, Debug)]
pub struct BusPaths {
    pub current: String,
    pub voltage: String,
    pub charged_energy: String,
    pub discharged_energy: String,
}

impl Default for BusPaths {
    fn default() -> Self {
        Self {
            current: "/Dc/0/Current".to_string(),
            voltage: "/Dc/0/Voltage".to_string(),
            charged_energy: "/History/ChargedEnergy".to_string(),
            discharged_energy: "/History/DischargedEnergy".to_string(),
        }
    }
}
