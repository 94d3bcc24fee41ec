//! Named backends and broadcast of leveled calls

use lograte_core::constants::DEFAULT_BACKEND_NAME;
use lograte_core::{Error, LineFlags, LogConfig, LogLevel, LogType, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use crate::backend::{Backend, Fatal};

/// A set of backends keyed by unique name
///
/// Leveled calls go to every backend in no particular order. The map lock is
/// only held while taking a snapshot of the backends; the writes themselves
/// rely on each backend's own lock.
#[derive(Debug)]
pub struct Registry {
    backends: RwLock<HashMap<String, Arc<Backend>>>,
}

impl Registry {
    /// Registry holding the default `console` backend: colored stdout,
    /// every level, date + time + short file.
    pub fn new() -> Self {
        let console = Backend::simple();
        console.set_flags(LineFlags::STD | LineFlags::SHORT_FILE);

        let registry = Self::empty();
        registry.add_backend(DEFAULT_BACKEND_NAME, console);
        registry
    }

    /// Registry without any backend
    pub fn empty() -> Self {
        Self {
            backends: RwLock::new(HashMap::new()),
        }
    }

    /// Build every backend described by `config`. An empty config yields an
    /// empty registry.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        config.validate()?;
        let registry = Self::empty();
        for backend_config in &config.backends {
            let backend = Backend::from_config(backend_config)?;
            registry.add_backend(backend_config.name.as_str(), backend);
        }
        Ok(registry)
    }

    /// Add or replace the backend called `name`
    pub fn add_backend(&self, name: impl Into<String>, backend: impl Into<Arc<Backend>>) {
        self.backends.write().insert(name.into(), backend.into());
    }

    /// Remove a backend. Calls already dispatched to it still complete.
    pub fn delete_backend(&self, name: &str) -> Option<Arc<Backend>> {
        self.backends.write().remove(name)
    }

    pub fn backend(&self, name: &str) -> Option<Arc<Backend>> {
        self.backends.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.backends.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.read().is_empty()
    }

    fn snapshot(&self) -> Vec<Arc<Backend>> {
        self.backends.read().values().cloned().collect()
    }

    fn with_backend(&self, name: &str, f: impl FnOnce(&Backend)) {
        if let Some(backend) = self.backend(name) {
            f(&backend);
        }
    }

    pub fn set_level(&self, name: &str, level: LogLevel) {
        self.with_backend(name, |b| b.set_level(level));
    }

    pub fn get_level(&self, name: &str) -> Result<LogLevel> {
        self.backend(name)
            .map(|b| b.level())
            .ok_or_else(|| Error::BackendNotFound(name.to_string()))
    }

    pub fn set_output<W: Write + Send + 'static>(&self, name: &str, out: W) {
        self.with_backend(name, |b| b.set_output(out));
    }

    /// Point `name` at a log file. Unknown names are ignored.
    pub fn set_output_by_name(&self, name: &str, path: impl AsRef<Path>) -> Result<()> {
        match self.backend(name) {
            Some(backend) => backend.set_output_by_name(path),
            None => Ok(()),
        }
    }

    pub fn set_flags(&self, name: &str, flags: LineFlags) {
        self.with_backend(name, |b| b.set_flags(flags));
    }

    pub fn set_colored(&self, name: &str, colored: bool) {
        self.with_backend(name, |b| b.set_colored(colored));
    }

    pub fn set_rotate_by_day(&self, name: &str) {
        self.with_backend(name, |b| b.set_rotate_by_day());
    }

    pub fn set_rotate_by_hour(&self, name: &str) {
        self.with_backend(name, |b| b.set_rotate_by_hour());
    }

    pub fn set_rotate_by_size(&self, name: &str, bytes: u64) {
        self.with_backend(name, |b| b.set_rotate_by_size(bytes));
    }

    /// Flush every backend, returning the first error
    pub fn flush(&self) -> Result<()> {
        self.snapshot().iter().try_for_each(|b| b.flush())
    }

    fn broadcast(&self, t: LogType, args: fmt::Arguments<'_>, location: &Location<'_>) {
        for backend in self.snapshot() {
            backend.emit(t, args, location);
        }
    }

    /// Write to every backend, then hand back the fatal signal
    #[track_caller]
    pub fn fatal(&self, msg: impl fmt::Display) -> Fatal {
        self.broadcast(LogType::Fatal, format_args!("{}", msg), Location::caller());
        Fatal::new()
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> Fatal {
        self.broadcast(LogType::Fatal, args, Location::caller());
        Fatal::new()
    }

    #[track_caller]
    pub fn error(&self, msg: impl fmt::Display) {
        self.broadcast(LogType::Error, format_args!("{}", msg), Location::caller());
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.broadcast(LogType::Error, args, Location::caller());
    }

    #[track_caller]
    pub fn warning(&self, msg: impl fmt::Display) {
        self.broadcast(LogType::Warning, format_args!("{}", msg), Location::caller());
    }

    #[track_caller]
    pub fn warningf(&self, args: fmt::Arguments<'_>) {
        self.broadcast(LogType::Warning, args, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, msg: impl fmt::Display) {
        self.broadcast(LogType::Info, format_args!("{}", msg), Location::caller());
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.broadcast(LogType::Info, args, Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, msg: impl fmt::Display) {
        self.broadcast(LogType::Debug, format_args!("{}", msg), Location::caller());
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.broadcast(LogType::Debug, args, Location::caller());
    }

    #[track_caller]
    pub fn log(&self, t: LogType, msg: impl fmt::Display) {
        self.broadcast(t, format_args!("{}", msg), Location::caller());
    }

    #[track_caller]
    pub fn logf(&self, t: LogType, args: fmt::Arguments<'_>) {
        self.broadcast(t, args, Location::caller());
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SharedBuffer;
    use crate::writer::Output;
    use lograte_core::{BackendConfig, Rotation};
    use std::thread;
    use tempfile::TempDir;

    fn buffered(level: LogLevel) -> (Backend, SharedBuffer) {
        let sink = SharedBuffer::default();
        let backend = Backend::new(Output::writer(sink.clone()), "", level, false);
        backend.set_flags(LineFlags::empty());
        (backend, sink)
    }

    #[test]
    fn test_default_registry() {
        let registry = Registry::new();
        assert_eq!(registry.names(), vec![DEFAULT_BACKEND_NAME.to_string()]);

        let console = registry.backend(DEFAULT_BACKEND_NAME).unwrap();
        assert_eq!(console.level(), LogLevel::ALL);
        assert!(console.colored());
        assert_eq!(
            console.flags(),
            LineFlags::DATE | LineFlags::TIME | LineFlags::SHORT_FILE
        );
        assert!(Registry::empty().is_empty());
    }

    #[test]
    fn test_broadcast_respects_each_level() {
        let registry = Registry::empty();
        let (all, all_sink) = buffered(LogLevel::ALL);
        let (errors, errors_sink) = buffered(LogLevel::ERROR);
        registry.add_backend("all", all);
        registry.add_backend("errors", errors);

        registry.info("hello");
        registry.errorf(format_args!("failed after {} tries", 3));
        let _ = registry.fatal("bye");

        assert_eq!(
            all_sink.lines(),
            vec!["[info] hello", "[error] failed after 3 tries", "[fatal] bye"]
        );
        assert_eq!(
            errors_sink.lines(),
            vec!["[error] failed after 3 tries", "[fatal] bye"]
        );
    }

    #[test]
    fn test_unknown_name_is_noop() {
        let registry = Registry::empty();
        registry.set_level("missing", LogLevel::NONE);
        registry.set_output("missing", std::io::sink());
        registry.set_flags("missing", LineFlags::empty());
        registry.set_colored("missing", false);
        registry.set_rotate_by_day("missing");
        registry.set_rotate_by_hour("missing");
        registry.set_rotate_by_size("missing", 10);
        assert!(registry
            .set_output_by_name("missing", "/nonexistent/dir/x.log")
            .is_ok());
        assert!(registry.delete_backend("missing").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_level() {
        let registry = Registry::new();
        registry.set_level(DEFAULT_BACKEND_NAME, LogLevel::WARN);
        assert_eq!(registry.get_level(DEFAULT_BACKEND_NAME).unwrap(), LogLevel::WARN);

        let err = registry.get_level("missing").unwrap_err();
        assert!(matches!(err, Error::BackendNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_per_name_setters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("named.log");

        let registry = Registry::empty();
        let (backend, _sink) = buffered(LogLevel::ALL);
        registry.add_backend("file", backend);

        registry.set_output_by_name("file", &path).unwrap();
        registry.set_colored("file", true);
        registry.set_rotate_by_size("file", 64);

        let backend = registry.backend("file").unwrap();
        assert_eq!(backend.path(), Some(path));
        assert!(backend.colored());
        assert_eq!(backend.rotation(), Rotation::Size(64));

        registry.set_rotate_by_hour("file");
        assert_eq!(backend.rotation(), Rotation::Hourly);

        let err = registry
            .set_output_by_name("file", dir.path().join("missing/x.log"))
            .unwrap_err();
        assert!(matches!(err, Error::OpenFailed { .. }));
    }

    #[test]
    fn test_delete_keeps_in_flight_reference() {
        let registry = Registry::empty();
        let (backend, sink) = buffered(LogLevel::ALL);
        registry.add_backend("gone", backend);

        let held = registry.backend("gone").unwrap();
        let removed = registry.delete_backend("gone").unwrap();
        assert!(Arc::ptr_eq(&held, &removed));

        registry.info("nobody listens");
        held.info("still works");
        assert_eq!(sink.lines(), vec!["[info] still works"]);
    }

    #[test]
    fn test_concurrent_broadcast_and_mutation() {
        let registry = Arc::new(Registry::empty());
        let (backend, sink) = buffered(LogLevel::ALL);
        registry.add_backend("main", backend);

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..100 {
                        registry.infof(format_args!("{} {}", t, i));
                    }
                })
            })
            .collect();
        let mutator = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..100 {
                    let name = format!("extra-{}", i);
                    let extra = Backend::new(
                        Output::writer(std::io::sink()),
                        "",
                        LogLevel::ALL,
                        false,
                    );
                    registry.add_backend(name.as_str(), extra);
                    registry.delete_backend(&name);
                }
            })
        };
        for handle in writers {
            handle.join().unwrap();
        }
        mutator.join().unwrap();

        assert_eq!(sink.lines().len(), 400);
        assert_eq!(registry.names(), vec!["main".to_string()]);
    }

    #[test]
    fn test_from_config() {
        let dir = TempDir::new().unwrap();
        let mut file = BackendConfig::console("file");
        file.path = Some(dir.path().join("app.log"));
        file.level = Some("warn".to_string());
        file.flags = Some(vec![]);

        let config = LogConfig {
            backends: vec![BackendConfig::console("console"), file],
        };
        let registry = Registry::from_config(&config).unwrap();
        assert_eq!(registry.names(), vec!["console", "file"]);
        assert_eq!(registry.get_level("file").unwrap(), LogLevel::WARN);

        registry.set_output("console", std::io::sink());
        registry.warning("disk almost full");
        registry.info("filtered");
        registry.flush().unwrap();

        let content = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert_eq!(content, "[warning] disk almost full\n");
    }

    struct BroadcastsWhileFormatting(Arc<Registry>);

    impl fmt::Display for BroadcastsWhileFormatting {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.debug("nested");
            write!(f, "outer")
        }
    }

    #[test]
    fn test_message_formatting_may_broadcast() {
        let registry = Arc::new(Registry::empty());
        let (backend, sink) = buffered(LogLevel::ALL);
        registry.add_backend("mem", backend);

        let (done, wait) = std::sync::mpsc::channel();
        let r = registry.clone();
        thread::spawn(move || {
            r.info(BroadcastsWhileFormatting(r.clone()));
            let _ = done.send(());
        });
        assert!(wait.recv_timeout(std::time::Duration::from_secs(5)).is_ok());

        assert_eq!(sink.lines(), vec!["[debug] nested", "[info] outer"]);
    }
}
