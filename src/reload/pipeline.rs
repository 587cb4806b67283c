//! One reload run: fetch → change detection → decode → merge → callback.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::observability::metrics::{self, ReloadOutcome};
use crate::registry::store::{Snapshot, Store};
use crate::reload::decode::decode;
use crate::reload::loader::SourceLoader;
use crate::reload::signature::Signature;
use crate::settings::PayloadFormat;

/// Callback fired once per reload attempt with the decoded snapshot.
///
/// Attempts that apply nothing (no payload, unchanged payload, failure)
/// report an empty snapshot.
pub type ReloadHandler = Arc<dyn Fn(&Snapshot) + Send + Sync>;

pub struct ReloadPipeline {
    loader: SourceLoader,
    format: PayloadFormat,
    on_reload: Option<ReloadHandler>,
    /// Signature of the last payload that reached decoding. Held for the whole run, which
    /// serializes reloads against each other without blocking `define`.
    last: Mutex<Option<Signature>>,
}

impl ReloadPipeline {
    pub fn new(loader: SourceLoader, format: PayloadFormat, on_reload: Option<ReloadHandler>) -> Self {
        Self {
            loader,
            format,
            on_reload,
            last: Mutex::new(None),
        }
    }

    /// Bring `store` up to date with the latest payload.
    ///
    /// Returns the applied snapshot (empty when nothing was applied). Decode
    /// failures and kind violations are returned as errors after the
    /// completion callback has fired.
    pub async fn run(&self, store: &Store) -> Result<Snapshot> {
        let mut last = self.last.lock().await;
        store.logger().log(format_args!("start reloading"));

        let result = self.apply(store, &mut last).await;
        drop(last);

        let (snapshot, outcome) = match result {
            Ok(applied) => applied,
            Err(e) => {
                metrics::record_reload(ReloadOutcome::Failed);
                self.notify(&Snapshot::new());
                return Err(e);
            }
        };

        metrics::record_reload(outcome);
        self.notify(&snapshot);
        Ok(snapshot)
    }

    async fn apply(
        &self,
        store: &Store,
        last: &mut Option<Signature>,
    ) -> Result<(Snapshot, ReloadOutcome)> {
        let log = store.logger();

        let Some(data) = self.loader.load(log).await.filter(|d| !d.is_empty()) else {
            log.log(format_args!("data is empty"));
            return Ok((Snapshot::new(), ReloadOutcome::Empty));
        };

        let signature = Signature::of(&data);
        if last.as_ref() == Some(&signature) {
            log.log(format_args!("same signature - ignored"));
            return Ok((Snapshot::new(), ReloadOutcome::Unchanged));
        }
        log.log(format_args!("new signature:{signature}"));
        // Recorded before decoding: a rejected payload is not re-examined
        // until its content changes.
        *last = Some(signature);

        let entries = decode(&data, self.format).map_err(|e| log.fatal(e))?;
        let snapshot = store.merge(entries)?;
        Ok((snapshot, ReloadOutcome::Applied))
    }

    fn notify(&self, snapshot: &Snapshot) {
        if let Some(handler) = &self.on_reload {
            handler(snapshot);
        }
    }
}

impl std::fmt::Debug for ReloadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadPipeline")
            .field("loader", &self.loader)
            .field("format", &self.format)
            .field("on_reload", &self.on_reload.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::observability::logging::Logger;
    use crate::registry::value::Value;
    use crate::settings::Settings;
    use parking_lot::Mutex as SyncMutex;
    use std::io::Write;

    struct Fixture {
        file: tempfile::NamedTempFile,
        pipeline: ReloadPipeline,
        store: Store,
        calls: Arc<SyncMutex<Vec<usize>>>,
    }

    fn fixture(initial: &str) -> Fixture {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(initial.as_bytes()).unwrap();

        let settings = Settings {
            file: Some(file.path().to_path_buf()),
            ..Settings::detached()
        };
        let calls = Arc::new(SyncMutex::new(Vec::new()));
        let seen = calls.clone();
        let handler: ReloadHandler = Arc::new(move |s: &Snapshot| seen.lock().push(s.len()));
        let pipeline = ReloadPipeline::new(
            SourceLoader::new(&settings).unwrap(),
            PayloadFormat::Json,
            Some(handler),
        );

        Fixture {
            file,
            pipeline,
            store: Store::new(Logger::silent()),
            calls,
        }
    }

    fn rewrite(file: &tempfile::NamedTempFile, content: &str) {
        std::fs::write(file.path(), content).unwrap();
    }

    #[tokio::test]
    async fn test_unchanged_payload_is_skipped() {
        let fx = fixture(r#"{"a": 1, "b": "x"}"#);

        let first = fx.pipeline.run(&fx.store).await.unwrap();
        assert_eq!(first.len(), 2);

        let second = fx.pipeline.run(&fx.store).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(*fx.calls.lock(), vec![2, 0]);
    }

    #[tokio::test]
    async fn test_changed_field_updates_only_that_cell() {
        let fx = fixture(r#"{"a": 1, "b": "x"}"#);
        fx.pipeline.run(&fx.store).await.unwrap();
        let untouched = fx.store.lookup("b").unwrap().state();

        rewrite(&fx.file, r#"{"a": 2, "b": "x"}"#);
        let snapshot = fx.pipeline.run(&fx.store).await.unwrap();

        // The snapshot is the full payload, not a diff.
        assert_eq!(snapshot.len(), 2);
        assert_eq!(fx.store.lookup("a").unwrap().get_int64().unwrap(), 2);
        assert!(Arc::ptr_eq(&untouched, &fx.store.lookup("b").unwrap().state()));
    }

    #[tokio::test]
    async fn test_decode_failure_still_notifies() {
        let fx = fixture("{broken");
        let err = fx.pipeline.run(&fx.store).await.unwrap_err();
        assert!(matches!(err, RegistryError::Decode(_)));
        assert_eq!(*fx.calls.lock(), vec![0]);
    }

    #[tokio::test]
    async fn test_rejected_payload_is_not_reexamined() {
        let fx = fixture(r#"{"a": true}"#);
        fx.store.define("a", Value::Int(1)).unwrap();

        assert!(fx.pipeline.run(&fx.store).await.is_err());
        let second = fx.pipeline.run(&fx.store).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(fx.store.lookup("a").unwrap().get_int64().unwrap(), 1);
        assert_eq!(*fx.calls.lock(), vec![0, 0]);

        rewrite(&fx.file, r#"{"a": 5}"#);
        fx.pipeline.run(&fx.store).await.unwrap();
        assert_eq!(fx.store.lookup("a").unwrap().get_int64().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_empty_file_is_no_payload() {
        let fx = fixture("");
        let snapshot = fx.pipeline.run(&fx.store).await.unwrap();
        assert!(snapshot.is_empty());
        assert!(fx.store.is_empty());
        assert_eq!(*fx.calls.lock(), vec![0]);
    }
}
