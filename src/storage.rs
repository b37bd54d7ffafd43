mod location;
mod record;

use std::time::SystemTime;

use chrono::{DateTime, Local};

pub use self::location::{LocationPolicy, StorageLocation};
use self::record::{CHARGED_FILE_NAME, DISCHARGED_FILE_NAME, Record, sync_directory};
use crate::{accumulator::EnergyTotals, prelude::*};

/// Durable storage of the running totals.
#[must_use]
#[derive(Clone, Debug)]
pub struct PersistenceStore {
    policy: LocationPolicy,
}

impl PersistenceStore {
    pub const fn new(policy: LocationPolicy) -> Self {
        Self { policy }
    }

    /// Write both totals to the location that is preferred at this very moment.
    #[instrument(skip_all, fields(charged = totals.charged, discharged = totals.discharged))]
    pub fn save(&self, totals: EnergyTotals) -> Result<StorageLocation> {
        let location = self.policy.resolve();
        info!(%location, "saving the totals…");
        Record::write(&location.path().join(CHARGED_FILE_NAME), totals.charged)?;
        Record::write(&location.path().join(DISCHARGED_FILE_NAME), totals.discharged)?;
        sync_directory(location.path())?;
        Ok(location)
    }

    /// Load the most recently saved totals from any known location.
    ///
    /// Returns `None` when nothing has been saved yet. An unreadable or malformed location is
    /// logged and skipped; its error is only returned when no other location has any totals.
    #[instrument(skip_all)]
    pub fn load(&self) -> Result<Option<EnergyTotals>> {
        let mut freshest: Option<(StorageLocation, Snapshot)> = None;
        let mut first_error = None;

        for location in self.policy.candidates() {
            match Snapshot::load_from(&location) {
                Ok(Some(snapshot)) => {
                    let is_fresher = freshest
                        .as_ref()
                        .is_none_or(|(_, other)| snapshot.modified_at > other.modified_at);
                    if is_fresher {
                        freshest = Some((location, snapshot));
                    }
                }
                Ok(None) => {
                    debug!(%location, "no saved totals");
                }
                Err(error) => {
                    error!(%location, "failed to load the totals: {error:#}");
                    first_error.get_or_insert(error);
                }
            }
        }

        match (freshest, first_error) {
            (Some((location, snapshot)), _) => {
                info!(
                    %location,
                    charged = snapshot.totals.charged,
                    discharged = snapshot.totals.discharged,
                    saved_at = %DateTime::<Local>::from(snapshot.modified_at),
                    "loaded the totals"
                );
                Ok(Some(snapshot.totals))
            }
            (None, Some(error)) => Err(error),
            (None, None) => {
                info!("no saved totals found");
                Ok(None)
            }
        }
    }
}

/// Totals found at a single location.
struct Snapshot {
    totals: EnergyTotals,
    modified_at: SystemTime,
}

impl Snapshot {
    fn load_from(location: &StorageLocation) -> Result<Option<Self>> {
        let charged = Record::read(&location.path().join(CHARGED_FILE_NAME))?;
        let discharged = Record::read(&location.path().join(DISCHARGED_FILE_NAME))?;
        if charged.is_none() && discharged.is_none() {
            return Ok(None);
        }
        if charged.is_none() || discharged.is_none() {
            warn!(%location, "one of the records is missing, assuming zero for it");
        }
        let modified_at = [charged, discharged]
            .into_iter()
            .flatten()
            .map(|record| record.modified_at)
            .max()
            .context("no records to take the modification time from")?;
        Ok(Some(Self {
            totals: EnergyTotals {
                charged: charged.map_or(0.0, |record| record.value),
                discharged: discharged.map_or(0.0, |record| record.value),
            },
            modified_at,
        }))
    }
}
