//! Typed getters.
//!
//! Each getter looks the name up and checks its kind; a missing name or a
//! kind that does not match the getter is an error. [`Registry::string`] is
//! the exception: it renders any kind in its canonical text.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::registry::cell::ValueCell;
use crate::registry::value::Value;
use crate::registry::Registry;

impl Registry {
    fn read<T>(&self, name: &str, get: impl FnOnce(&ValueCell) -> Result<T>) -> Result<T> {
        let store = self.store();
        let cell = store.lookup(name)?;
        get(cell.as_ref()).map_err(|e| store.logger().fatal(e))
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        self.read(name, ValueCell::get_int64)
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        self.read(name, ValueCell::get_float64)
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        self.read(name, ValueCell::get_bool)
    }

    pub fn text(&self, name: &str) -> Result<String> {
        self.read(name, ValueCell::get_text)
    }

    pub fn time(&self, name: &str) -> Result<DateTime<Utc>> {
        self.read(name, ValueCell::get_time)
    }

    pub fn duration(&self, name: &str) -> Result<Duration> {
        self.read(name, ValueCell::get_duration)
    }

    /// Canonical text of any value.
    pub fn string(&self, name: &str) -> Result<String> {
        self.read(name, |cell| Ok(cell.get_string()))
    }

    /// The value itself, whatever its kind.
    pub fn value(&self, name: &str) -> Result<Value> {
        self.read(name, |cell| Ok(cell.get_value()))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RegistryError;
    use crate::registry::Registry;
    use crate::settings::Settings;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::time::Duration;

    fn registry() -> Registry {
        Registry::builder(Settings::detached())
            .log_sink(|_| {})
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults_read_back_unchanged() {
        let r = registry();
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();

        r.define("workers", 8u32).unwrap();
        r.define("ratio", 0.25f32).unwrap();
        r.define("name", "svc").unwrap();
        r.define("debug", false).unwrap();
        r.define("started", start).unwrap();
        r.define("timeout", Duration::from_millis(1_500)).unwrap();

        assert_eq!(r.int("workers").unwrap(), 8);
        assert_eq!(r.float("ratio").unwrap(), 0.25);
        assert_eq!(r.text("name").unwrap(), "svc");
        assert!(!r.bool("debug").unwrap());
        assert_eq!(
            r.time("started").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
        );
        assert_eq!(r.duration("timeout").unwrap(), Duration::from_millis(1_500));
    }

    #[test]
    fn test_string_renders_every_kind() {
        let r = registry();
        r.define("port", 2009).unwrap();
        r.define("ratio", 0.5).unwrap();
        r.define("debug", true).unwrap();
        r.define("timeout", Duration::from_secs(9_000)).unwrap();
        r.define("started", Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
            .unwrap();

        assert_eq!(r.string("port").unwrap(), "2009");
        assert_eq!(r.string("ratio").unwrap(), "0.500000");
        assert_eq!(r.string("debug").unwrap(), "true");
        assert_eq!(r.string("timeout").unwrap(), "2h30m0s");
        assert_eq!(r.string("started").unwrap(), "2024-03-01T12:30:00Z");
    }

    #[test]
    fn test_missing_and_mistyped() {
        let r = registry();
        r.define("http.auth.enabled", true).unwrap();

        assert!(matches!(r.int("http.port"), Err(RegistryError::Missing(_))));
        assert!(matches!(r.string("http.port"), Err(RegistryError::Missing(_))));
        assert!(matches!(
            r.int("http.auth.enabled"),
            Err(RegistryError::UnexpectedType { .. })
        ));
        assert!(matches!(
            r.text("http.auth.enabled"),
            Err(RegistryError::UnexpectedType { .. })
        ));
    }
}
