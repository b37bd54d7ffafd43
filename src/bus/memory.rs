use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    bus::{StateBus, Value},
    prelude::*,
};

/// In-process bus with failure injection.
#[derive(Default)]
pub struct MemoryBus {
    values: Mutex<HashMap<String, Value>>,
    n_failing_reads: AtomicUsize,
    are_writes_failing: AtomicBool,
    read_delay: Mutex<Duration>,
}

impl MemoryBus {
    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        let bus = Self::default();
        for (path, value) in values {
            bus.insert(path, value);
        }
        bus
    }

    pub fn insert(&self, path: &str, value: Value) {
        self.values.lock().unwrap().insert(path.to_string(), value);
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.values.lock().unwrap().get(path).cloned()
    }

    /// Make the next `n` reads fail.
    pub fn fail_reads(&self, n: usize) {
        self.n_failing_reads.store(n, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, are_failing: bool) {
        self.are_writes_failing.store(are_failing, Ordering::SeqCst);
    }

    /// Make every read hang for `delay`, zero to respond at once.
    pub fn delay_reads(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl StateBus for MemoryBus {
    async fn get_value(&self, path: &str) -> Result<Value> {
        let delay = *self.read_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let is_failing = self
            .n_failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        ensure!(!is_failing, "injected read failure on `{path}`");
        self.get(path).with_context(|| format!("`{path}` does not exist"))
    }

    async fn set_value(&self, path: &str, value: Value) -> Result {
        ensure!(!self.are_writes_failing.load(Ordering::SeqCst), "injected write failure on `{path}`");
        self.insert(path, value);
        Ok(())
    }
}
