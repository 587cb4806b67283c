//! The configuration registry.
//!
//! # Data Flow
//! ```text
//! application threads                 scheduler task
//!     define(name, default)               tick
//!         → Store::define                     → ReloadPipeline::run
//!     int/bool/text/...(name)                     → Store::merge
//!         → Store::lookup → ValueCell             → completion callback
//! ```
//!
//! # Design Decisions
//! - A registry is an explicit, cloneable handle; there is no global instance
//! - Values are a tagged union; the kind of a name never drifts
//! - Every contract violation is an `Err`, logged before it is returned

pub mod accessors;
pub mod cell;
pub mod duration;
pub mod store;
pub mod value;

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{RegistryError, Result};
use crate::lifecycle::Scheduler;
use crate::observability::logging::{tracing_sink, LogSink, Logger};
use crate::reload::{ReloadHandler, ReloadPipeline, SourceLoader};
use crate::settings::{validate_settings, Settings};

pub use cell::{CellState, ValueCell};
pub use store::{Snapshot, Store};
pub use value::{Kind, Value, TIME_FORMAT};

/// Shared handle to one registry.
#[derive(Clone, Debug)]
pub struct Registry {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    settings: Settings,
    store: Store,
    pipeline: ReloadPipeline,
    scheduler: Mutex<Option<Scheduler>>,
}

/// Builder for [`Registry`].
pub struct RegistryBuilder {
    settings: Settings,
    sink: Option<LogSink>,
    on_reload: Option<ReloadHandler>,
}

impl RegistryBuilder {
    /// Replace the log sink. Without one, lines go to `tracing` unless
    /// `settings.no_log` is set.
    pub fn log_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Callback fired after every reload attempt.
    pub fn on_reload<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.on_reload = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Registry> {
        validate_settings(&self.settings).map_err(RegistryError::Settings)?;

        let sink = self
            .sink
            .or_else(|| (!self.settings.no_log).then(tracing_sink));
        let log = Logger::new(sink);

        let loader = SourceLoader::new(&self.settings).map_err(RegistryError::Client)?;
        let pipeline = ReloadPipeline::new(loader, self.settings.format, self.on_reload);

        Ok(Registry {
            inner: Arc::new(Inner {
                store: Store::new(log),
                pipeline,
                scheduler: Mutex::new(None),
                settings: self.settings,
            }),
        })
    }
}

impl Registry {
    pub fn builder(settings: Settings) -> RegistryBuilder {
        RegistryBuilder {
            settings,
            sink: None,
            on_reload: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Declare the default value, and with it the kind, of `name`.
    ///
    /// Fails if `name` was already declared, or if a reload already stored a
    /// value of another kind under it.
    pub fn define(&self, name: &str, default: impl Into<Value>) -> Result<()> {
        self.inner.store.define(name, default.into())
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<ValueCell>> {
        self.inner.store.lookup(name)
    }

    /// Run the reload pipeline once.
    pub async fn reload(&self) -> Result<Snapshot> {
        self.inner.pipeline.run(&self.inner.store).await
    }

    /// Populate the registry and start periodic reloading.
    ///
    /// Any scheduler started by an earlier call is stopped first. The initial
    /// reload has completed by the time this returns; its error, if any, is
    /// returned and no scheduler is started.
    pub async fn ready(&self) -> Result<()> {
        let previous = self.inner.scheduler.lock().take();
        if let Some(previous) = previous {
            if let Err(e) = previous.stop().await {
                self.logger()
                    .log(format_args!("previous ticker had stopped with: {e}"));
            }
        }

        self.reload().await?;

        let weak = Arc::downgrade(&self.inner);
        let scheduler = Scheduler::start(
            self.inner.settings.reload_interval(),
            self.logger().clone(),
            move || tick(weak.clone()),
        );
        *self.inner.scheduler.lock() = Some(scheduler);
        Ok(())
    }

    /// Whether a scheduler is currently attached.
    pub fn is_scheduled(&self) -> bool {
        self.inner
            .scheduler
            .lock()
            .as_ref()
            .is_some_and(|s| !s.is_finished())
    }

    /// Stop periodic reloading. A reload in progress is allowed to finish.
    pub async fn stop(&self) -> Result<()> {
        let scheduler = self.inner.scheduler.lock().take();
        match scheduler {
            Some(scheduler) => scheduler.stop().await,
            None => Ok(()),
        }
    }

    /// Keep reloading until `signal` resolves or a reload fails.
    pub async fn run_until<F: Future>(&self, signal: F) -> Result<()> {
        let scheduler = self.inner.scheduler.lock().take();
        let Some(mut scheduler) = scheduler else {
            return Ok(());
        };

        let ended = tokio::select! {
            res = scheduler.finished() => Some(res),
            _ = signal => None,
        };

        match ended {
            Some(res) => res,
            None => scheduler.stop().await,
        }
    }

    fn logger(&self) -> &Logger {
        self.inner.store.logger()
    }
}

async fn tick(registry: Weak<Inner>) -> Result<ControlFlow<()>> {
    let Some(inner) = registry.upgrade() else {
        return Ok(ControlFlow::Break(()));
    };
    inner.pipeline.run(&inner.store).await?;
    Ok(ControlFlow::Continue(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn detached() -> Registry {
        Registry::builder(Settings::detached())
            .log_sink(|_| {})
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_ready_without_sources_serves_defaults() {
        let registry = detached();
        registry.define("http.host", "127.0.0.1").unwrap();
        registry.define("http.port", 2009).unwrap();
        registry.define("http.auth.enabled", true).unwrap();

        registry.ready().await.unwrap();

        assert_eq!(registry.text("http.host").unwrap(), "127.0.0.1");
        assert_eq!(registry.int("http.port").unwrap(), 2009);
        assert!(registry.bool("http.auth.enabled").unwrap());
        assert!(registry.is_scheduled());

        registry.stop().await.unwrap();
        assert!(!registry.is_scheduled());
    }

    #[tokio::test]
    async fn test_ready_twice_replaces_scheduler() {
        let registry = detached();
        registry.ready().await.unwrap();
        registry.ready().await.unwrap();
        assert!(registry.is_scheduled());
        registry.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_until_signal() {
        let registry = detached();
        registry.ready().await.unwrap();
        registry
            .run_until(tokio::time::sleep(Duration::from_millis(10)))
            .await
            .unwrap();
        assert!(!registry.is_scheduled());
    }

    #[test]
    fn test_build_rejects_bad_settings() {
        let settings = Settings {
            url: Some("nope".into()),
            ..Settings::detached()
        };
        let err = Registry::builder(settings).build().unwrap_err();
        assert!(matches!(err, RegistryError::Settings(_)));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = detached();
        let b = detached();
        a.define("name", "a").unwrap();
        b.define("name", "b").unwrap();
        assert_eq!(a.text("name").unwrap(), "a");
        assert_eq!(b.text("name").unwrap(), "b");
    }
}
