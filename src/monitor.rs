//! Fixed-interval sampling loop.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use bon::Builder;
use tokio::{
    sync::Mutex,
    task::spawn_blocking,
    time::{Instant, MissedTickBehavior, interval, timeout},
    try_join,
};

use crate::{
    accumulator::{EnergyAccumulator, EnergyTotals, PowerSample},
    bus::{BusPaths, StateBus},
    prelude::*,
    quantity::{
        electric::{Amperes, Volts},
        energy::EnergyUnit,
    },
    sentinel::ShutdownSentinel,
    storage::{PersistenceStore, StorageLocation},
};

/// Why the monitor has stopped.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Shutdown {
    /// The operator has created the sentinel file.
    Sentinel,

    /// SIGTERM or SIGINT.
    Signal,
}

#[derive(Builder)]
pub struct Monitor<B> {
    bus: B,
    paths: BusPaths,
    store: PersistenceStore,
    sentinel: ShutdownSentinel,

    /// Raised by the signal handlers.
    #[builder(default)]
    termination: Arc<AtomicBool>,

    #[builder(default)]
    energy_unit: EnergyUnit,

    #[builder(into, default = Duration::from_millis(100))]
    sample_interval: Duration,

    #[builder(into, default = Duration::from_secs(3600))]
    checkpoint_interval: Duration,

    /// Longer gaps between two successful samples are not integrated.
    #[builder(into, default = Duration::from_secs(5))]
    max_integration_gap: Duration,

    #[builder(into, default = Duration::from_secs(1))]
    bus_timeout: Duration,

    #[builder(into, default = Duration::from_secs(10))]
    io_timeout: Duration,

    /// Held by a save until its blocking task finishes, even past its timeout.
    #[builder(skip)]
    write_lock: Arc<Mutex<()>>,
}

impl<B: StateBus> Monitor<B> {
    /// Run until a shutdown is requested, then save the totals one last time.
    ///
    /// Fails only if that last save fails.
    pub async fn run(self) -> Result<Shutdown> {
        let mut accumulator = EnergyAccumulator::new(self.energy_unit, self.load_totals().await);
        if let Err(error) = self.publish(accumulator.totals()).await {
            warn!("failed to publish the initial totals: {error:#}");
        }

        let mut interval = interval(self.sample_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_saved_at = Instant::now();
        let mut last_sampled_at = last_saved_at;
        info!(
            unit = %self.energy_unit,
            sample_interval = ?self.sample_interval,
            checkpoint_interval = ?self.checkpoint_interval,
            "running…"
        );

        loop {
            interval.tick().await;

            match self.read_sample().await {
                Ok(sample) => {
                    let time_delta = sample.timestamp.saturating_duration_since(last_sampled_at);
                    last_sampled_at = sample.timestamp;
                    if time_delta > self.max_integration_gap {
                        warn!(?time_delta, "too long since the previous sample, not integrating");
                    } else {
                        accumulator.integrate(&sample, time_delta);
                    }
                    if let Err(error) = self.publish(accumulator.totals()).await {
                        warn!("failed to publish the totals: {error:#}");
                    }
                }
                Err(error) => {
                    warn!("failed to read the battery, skipping the tick: {error:#}");
                }
            }

            if let Some(shutdown) = self.shutdown_request().await {
                info!(?shutdown, "shutting down…");
                let totals = accumulator.totals();
                let location =
                    self.save(totals).await.context("failed to save the totals on shutdown")?;
                info!(%location, net = totals.net(), "saved the totals, bye!");
                return Ok(shutdown);
            }

            if last_saved_at.elapsed() >= self.checkpoint_interval {
                let totals = accumulator.totals();
                match self.save(totals).await {
                    Ok(location) => {
                        info!(%location, totals.charged, totals.discharged, "checkpoint");
                    }
                    Err(error) => {
                        error!("checkpoint failed, retrying on the next one: {error:#}");
                    }
                }
                last_saved_at = Instant::now();
            }
        }
    }

    /// Saved totals, or zeros if there are none or they cannot be read.
    async fn load_totals(&self) -> EnergyTotals {
        let store = self.store.clone();
        match self.run_blocking(move || store.load()).await {
            Ok(Some(totals)) => totals,
            Ok(None) => {
                info!("starting from zero");
                EnergyTotals::ZERO
            }
            Err(error) => {
                error!("failed to load the totals, starting from zero: {error:#}");
                EnergyTotals::ZERO
            }
        }
    }

    async fn read_sample(&self) -> Result<PowerSample> {
        let (current, voltage) = timeout(self.bus_timeout, async {
            try_join!(self.bus.get_f64(&self.paths.current), self.bus.get_f64(&self.paths.voltage))
        })
        .await
        .context("timeout reading the battery")??;
        Ok(PowerSample {
            current: Amperes::from(current),
            voltage: Volts::from(voltage),
            timestamp: Instant::now(),
        })
    }

    async fn publish(&self, totals: EnergyTotals) -> Result {
        timeout(self.bus_timeout, async {
            try_join!(
                self.bus.set_value(&self.paths.charged_energy, totals.charged.into()),
                self.bus.set_value(&self.paths.discharged_energy, totals.discharged.into())
            )
        })
        .await
        .context("timeout publishing the totals")??;
        Ok(())
    }

    async fn save(&self, totals: EnergyTotals) -> Result<StorageLocation> {
        let store = self.store.clone();
        self.run_exclusive(move || store.save(totals)).await
    }

    /// Signals and the sentinel are only looked at between the ticks.
    async fn shutdown_request(&self) -> Option<Shutdown> {
        if self.termination.load(Ordering::Relaxed) {
            return Some(Shutdown::Signal);
        }
        let sentinel = self.sentinel.clone();
        match self.run_blocking(move || Ok(sentinel.is_requested())).await {
            Ok(true) => Some(Shutdown::Sentinel),
            Ok(false) => None,
            Err(error) => {
                warn!("failed to check the shutdown sentinel: {error:#}");
                None
            }
        }
    }

    /// Run the filesystem call off the loop, bounded by the I/O timeout.
    async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        timeout(self.io_timeout, spawn_blocking(f))
            .await
            .context("timeout waiting for the filesystem")?
            .context("the filesystem task has failed")?
    }

    /// Same as [`Self::run_blocking`], but waits for the previous exclusive call to finish.
    ///
    /// A timed-out write keeps running in the background. Serializing the writes prevents it from
    /// replacing the records after a later write.
    async fn run_exclusive<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let guard = timeout(self.io_timeout, Arc::clone(&self.write_lock).lock_owned())
            .await
            .context("the previous write is still running")?;
        self.run_blocking(move || {
            let _guard = guard;
            f()
        })
        .await
    }
}
