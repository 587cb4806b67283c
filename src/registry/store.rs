//! The name → cell mapping and its mutation discipline.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::{RegistryError, Result};
use crate::observability::logging::Logger;
use crate::observability::metrics;
use crate::registry::cell::ValueCell;
use crate::registry::value::Value;

/// Flat mapping produced by one reload, in canonical (kind-conformed) form.
pub type Snapshot = BTreeMap<String, Value>;

/// Cell storage shared by the accessors and the reload pipeline.
///
/// Lookups go straight to the concurrent map. `define` and `merge` additionally
/// hold `mutation` so that the kind checks and the writes that follow them are
/// not interleaved with another writer.
#[derive(Debug)]
pub struct Store {
    cells: DashMap<String, Arc<ValueCell>>,
    mutation: Mutex<()>,
    log: Logger,
}

impl Store {
    pub fn new(log: Logger) -> Self {
        Self {
            cells: DashMap::new(),
            mutation: Mutex::new(()),
            log,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.log
    }

    fn cell(&self, name: &str) -> Option<Arc<ValueCell>> {
        self.cells.get(name).map(|r| r.value().clone())
    }

    /// Declare the default for `name`.
    pub fn define(&self, name: &str, default: Value) -> Result<()> {
        let _guard = self.mutation.lock();

        match self.cell(name) {
            Some(cell) => cell
                .define(default, &self.log)
                .map_err(|e| self.log.fatal(e)),
            None => {
                let cell = ValueCell::new_defined(name, default, &self.log);
                self.cells.insert(name.to_string(), Arc::new(cell));
                metrics::record_entries(self.cells.len());
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<ValueCell>> {
        self.cell(name)
            .ok_or_else(|| self.log.fatal(RegistryError::Missing(name.to_string())))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Apply a decoded payload.
    ///
    /// Every entry is checked against its cell's kind before anything is
    /// written, so a rejected payload leaves the store untouched.
    pub(crate) fn merge(&self, entries: BTreeMap<String, Value>) -> Result<Snapshot> {
        let _guard = self.mutation.lock();

        let mut staged = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            let cell = self.cell(&name);
            let value = match &cell {
                Some(cell) if reload_owned_number(cell, &value) => value,
                Some(cell) => value
                    .conform(&name, cell.kind())
                    .map_err(|e| self.log.fatal(e))?,
                None => value,
            };
            staged.push((name, value, cell));
        }

        let mut snapshot = Snapshot::new();
        for (name, value, cell) in staged {
            match cell {
                Some(cell) => {
                    let current = cell.state();
                    if !(current.assigned && current.value == value) {
                        cell.set(value.clone(), &self.log);
                    }
                }
                None => {
                    let cell = ValueCell::new_assigned(&name, value.clone(), &self.log);
                    self.cells.insert(name.clone(), Arc::new(cell));
                }
            }
            snapshot.insert(name, value);
        }

        metrics::record_entries(self.cells.len());
        Ok(snapshot)
    }
}

/// A number no default has claimed yet may switch between int and float, since
/// decoders pick the representation from the document text alone.
fn reload_owned_number(cell: &ValueCell, value: &Value) -> bool {
    let state = cell.state();
    !state.defined && state.value.kind().is_numeric() && value.kind().is_numeric()
}
