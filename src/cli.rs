use std::path::PathBuf;

use clap::Parser;
use reqwest::Url;

use crate::{
    bus::{BusPaths, GatewayClient},
    prelude::*,
    quantity::energy::EnergyUnit,
    sentinel::ShutdownSentinel,
    storage::{LocationPolicy, PersistenceStore},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    pub sampling: SamplingArgs,

    #[clap(flatten)]
    pub bus: BusArgs,

    #[clap(flatten)]
    pub storage: StorageArgs,

    /// Write the logs to this file instead of the standard output.
    #[clap(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Parser)]
pub struct SamplingArgs {
    /// Battery polling period.
    #[clap(long, env = "SAMPLE_INTERVAL", default_value = "100ms")]
    pub sample_interval: humantime::Duration,

    /// Period of saving the totals to the storage.
    #[clap(long, env = "CHECKPOINT_INTERVAL", default_value = "1h")]
    pub checkpoint_interval: humantime::Duration,

    /// Energy unit of the published and saved totals.
    #[clap(long, env = "ENERGY_UNIT", value_enum, default_value = "kwh")]
    pub energy_unit: EnergyUnit,

    /// Do not integrate over longer gaps between two successful readings, e.g. after a bus outage.
    #[clap(long, env = "MAX_INTEGRATION_GAP", default_value = "5s")]
    pub max_integration_gap: humantime::Duration,
}

impl SamplingArgs {
    pub fn validate(&self) -> Result {
        ensure!(!self.sample_interval.is_zero(), "the sample interval must be positive");
        ensure!(!self.checkpoint_interval.is_zero(), "the checkpoint interval must be positive");
        Ok(())
    }
}

#[derive(Parser)]
pub struct BusArgs {
    /// State bus gateway base URL.
    #[clap(long = "bus-url", env = "BUS_URL", default_value = "http://127.0.0.1:8088/")]
    pub url: Url,

    /// Battery service on the bus.
    #[clap(
        long = "bus-service",
        env = "BUS_SERVICE",
        default_value = "com.victronenergy.battery.socketcan_can0"
    )]
    pub service: String,

    #[clap(long, env = "CURRENT_PATH", default_value = "/Dc/0/Current")]
    pub current_path: String,

    #[clap(long, env = "VOLTAGE_PATH", default_value = "/Dc/0/Voltage")]
    pub voltage_path: String,

    #[clap(long, env = "CHARGED_ENERGY_PATH", default_value = "/History/ChargedEnergy")]
    pub charged_energy_path: String,

    #[clap(long, env = "DISCHARGED_ENERGY_PATH", default_value = "/History/DischargedEnergy")]
    pub discharged_energy_path: String,

    /// Timeout of every bus read and write.
    #[clap(long = "bus-timeout", env = "BUS_TIMEOUT", default_value = "1s")]
    pub timeout: humantime::Duration,
}

impl BusArgs {
    pub fn connect(&self) -> Result<GatewayClient> {
        GatewayClient::new(&self.url, &self.service)
    }

    pub fn paths(&self) -> BusPaths {
        BusPaths {
            current: self.current_path.clone(),
            voltage: self.voltage_path.clone(),
            charged_energy: self.charged_energy_path.clone(),
            discharged_energy: self.discharged_energy_path.clone(),
        }
    }
}

#[derive(Parser)]
pub struct StorageArgs {
    /// Module directory: local fallback storage and the shutdown sentinel location.
    #[clap(long, env = "MODULE_DIR", default_value = ".")]
    pub module_dir: PathBuf,

    /// Removable media mount point, preferred over the module directory when present.
    #[clap(long, env = "MEDIA_PATH", default_value = "/run/media/sda1")]
    pub media_path: PathBuf,

    /// Only use the media path when something is actually mounted there.
    #[clap(long, env = "REQUIRE_MEDIA_MOUNT")]
    pub require_media_mount: bool,

    /// Create this file in the module directory to stop gracefully.
    #[clap(long, env = "SENTINEL_FILE_NAME", default_value = "kill")]
    pub sentinel_file_name: String,

    /// Timeout of every filesystem operation.
    #[clap(long = "io-timeout", env = "IO_TIMEOUT", default_value = "10s")]
    pub io_timeout: humantime::Duration,
}

impl StorageArgs {
    pub fn store(&self) -> PersistenceStore {
        PersistenceStore::new(LocationPolicy::new(
            &self.media_path,
            &self.module_dir,
            self.require_media_mount,
        ))
    }

    pub fn sentinel(&self) -> Result<ShutdownSentinel> {
        ShutdownSentinel::new(&self.module_dir, &self.sentinel_file_name)
    }
}
