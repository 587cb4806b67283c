//! A single named configuration entry.
//!
//! # State Transitions
//! ```text
//! undeclared → defined            define() on an unknown name
//! undeclared → assigned           first reload carrying the name (NEW)
//! defined    → defined+assigned   reload set()
//! assigned   → defined+assigned   define() after a reload (IGN, reload value wins)
//! ```
//!
//! The value and both flags live in one immutable [`CellState`] that is swapped
//! as a whole, so readers without a lock see either the old or the new state.
//! Writers are serialized by the registry's mutation lock.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use crate::error::{RegistryError, Result};
use crate::observability::logging::Logger;
use crate::registry::value::{Kind, Value};

/// Snapshot of a cell at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CellState {
    pub value: Value,
    /// An application default has been registered.
    pub defined: bool,
    /// A value has arrived from a reload.
    pub assigned: bool,
}

#[derive(Debug)]
pub struct ValueCell {
    name: String,
    state: ArcSwap<CellState>,
}

impl ValueCell {
    pub(crate) fn new_defined(name: &str, value: Value, log: &Logger) -> Self {
        log.transition("DEF", name, None, &value.to_string());
        Self::with_state(name, value, true, false)
    }

    pub(crate) fn new_assigned(name: &str, value: Value, log: &Logger) -> Self {
        log.transition("NEW", name, None, &value.to_string());
        Self::with_state(name, value, false, true)
    }

    fn with_state(name: &str, value: Value, defined: bool, assigned: bool) -> Self {
        Self {
            name: name.to_string(),
            state: ArcSwap::from_pointee(CellState {
                value,
                defined,
                assigned,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.state.load().value.kind()
    }

    pub fn state(&self) -> Arc<CellState> {
        self.state.load_full()
    }

    /// Register the application default.
    ///
    /// A value already assigned by a reload is kept, converted to the default's
    /// kind where that conversion is sanctioned.
    pub(crate) fn define(&self, default: Value, log: &Logger) -> Result<()> {
        let current = self.state.load_full();
        if current.defined {
            return Err(RegistryError::Duplicate {
                name: self.name.clone(),
            });
        }

        let before = current.value.to_string();
        if current.assigned {
            let kept = current.value.clone().conform(&self.name, default.kind())?;
            log.transition("IGN", &self.name, Some(&before), &default.to_string());
            self.state.store(Arc::new(CellState {
                value: kept,
                defined: true,
                assigned: true,
            }));
        } else {
            log.transition("DEF", &self.name, Some(&before), &default.to_string());
            self.state.store(Arc::new(CellState {
                value: default,
                defined: true,
                assigned: false,
            }));
        }
        Ok(())
    }

    /// Overwrite the value with one already conformed to this cell's kind.
    pub(crate) fn set(&self, value: Value, log: &Logger) {
        let current = self.state.load_full();
        log.transition(
            "SET",
            &self.name,
            Some(&current.value.to_string()),
            &value.to_string(),
        );
        self.state.store(Arc::new(CellState {
            value,
            defined: current.defined,
            assigned: true,
        }));
    }

    fn unexpected(&self, requested: Kind, stored: &Value) -> RegistryError {
        RegistryError::UnexpectedType {
            name: self.name.clone(),
            requested,
            stored: stored.kind(),
        }
    }

    pub fn get_value(&self) -> Value {
        self.state.load().value.clone()
    }

    pub fn get_string(&self) -> String {
        self.state.load().value.to_string()
    }

    pub fn get_text(&self) -> Result<String> {
        match &self.state.load().value {
            Value::Text(v) => Ok(v.clone()),
            other => Err(self.unexpected(Kind::Text, other)),
        }
    }

    pub fn get_bool(&self) -> Result<bool> {
        match &self.state.load().value {
            Value::Bool(v) => Ok(*v),
            other => Err(self.unexpected(Kind::Bool, other)),
        }
    }

    pub fn get_int64(&self) -> Result<i64> {
        match &self.state.load().value {
            Value::Int(v) => Ok(*v),
            other => Err(self.unexpected(Kind::Int, other)),
        }
    }

    pub fn get_float64(&self) -> Result<f64> {
        match &self.state.load().value {
            Value::Float(v) => Ok(*v),
            other => Err(self.unexpected(Kind::Float, other)),
        }
    }

    pub fn get_time(&self) -> Result<DateTime<Utc>> {
        match &self.state.load().value {
            Value::Time(v) => Ok(*v),
            other => Err(self.unexpected(Kind::Time, other)),
        }
    }

    pub fn get_duration(&self) -> Result<Duration> {
        match &self.state.load().value {
            Value::Duration(v) => Ok(*v),
            other => Err(self.unexpected(Kind::Duration, other)),
        }
    }
}
