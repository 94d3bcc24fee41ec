//! Rotation-aware logging backend
//!
//! A backend owns one output, its level mask and rotation policy. The level
//! gate is a lock-free atomic load and the message is rendered before any
//! lock is taken. The rotation check and the write itself run under a single
//! per-backend mutex, so no writer ever observes a half-rotated file.

use chrono::{DateTime, Local};
use lograte_core::constants::{COLOR_RESET, FATAL_EXIT_CODE};
use lograte_core::{
    BackendConfig, Error, LineFlags, LogLevel, LogType, OutputTarget, Result, Rotation,
};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::os::unix::io::IntoRawFd;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing::{debug, warn};

use crate::rotation::{rotated_path, RotationPolicy};
use crate::writer::{open_append, LineWriter, Output};

/// Returned by fatal-severity calls once the message has been written.
///
/// Logging never terminates the process by itself; the outermost caller
/// decides, usually by calling [`Fatal::exit`].
#[must_use = "a fatal message was logged; call `exit()` to terminate the process"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fatal(());

impl Fatal {
    pub(crate) fn new() -> Self {
        Fatal(())
    }

    /// Terminate the process with [`FATAL_EXIT_CODE`]
    pub fn exit(self) -> ! {
        std::process::exit(FATAL_EXIT_CODE)
    }
}

/// An independently configured log target
pub struct Backend {
    level: AtomicU8,
    colored: AtomicBool,
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    writer: LineWriter,
    /// Set only while the output is a file opened by path
    path: Option<PathBuf>,
    policy: RotationPolicy,
}

impl Backend {
    pub fn new(output: Output, prefix: impl Into<String>, level: LogLevel, colored: bool) -> Self {
        Self {
            level: AtomicU8::new(level.bits()),
            colored: AtomicBool::new(colored),
            inner: Mutex::new(Inner {
                writer: LineWriter::new(output, prefix, LineFlags::STD),
                path: None,
                policy: RotationPolicy::new(),
            }),
        }
    }

    /// Colored stdout backend with every level enabled
    pub fn simple() -> Self {
        Self::new(Output::stdout(), "", LogLevel::ALL, true)
    }

    /// Uncolored backend appending to `path`
    pub fn open(path: impl AsRef<Path>, level: LogLevel) -> Result<Self> {
        let backend = Self::new(Output::stdout(), "", level, false);
        backend.set_output_by_name(path)?;
        Ok(backend)
    }

    /// Build a backend from its config file entry
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        config.validate()?;

        let output = match config.output_target()? {
            OutputTarget::Stdout => Output::stdout(),
            OutputTarget::Stderr => Output::stderr(),
        };
        let backend = Self::new(
            output,
            config.prefix.as_str(),
            config.level(),
            config.is_colored(),
        );
        backend.set_flags(config.flags()?);

        if let Some(path) = &config.path {
            backend.set_output_by_name(path)?;
        }
        backend.set_rotation(config.rotation()?);
        Ok(backend)
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_bits_retain(self.level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level.bits(), Ordering::Relaxed);
    }

    /// Set the level from its name; unknown names enable everything
    pub fn set_level_by_str(&self, level: &str) {
        self.set_level(LogLevel::from_level_name(level));
    }

    /// Whether a message of type `t` would be written
    #[inline]
    pub fn enabled(&self, t: LogType) -> bool {
        self.level().enables(t)
    }

    pub fn colored(&self) -> bool {
        self.colored.load(Ordering::Relaxed)
    }

    pub fn set_colored(&self, colored: bool) {
        self.colored.store(colored, Ordering::Relaxed);
    }

    pub fn flags(&self) -> LineFlags {
        self.inner.lock().writer.flags()
    }

    pub fn set_flags(&self, flags: LineFlags) {
        self.inner.lock().writer.set_flags(flags);
    }

    pub fn prefix(&self) -> String {
        self.inner.lock().writer.prefix().to_string()
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.lock().writer.set_prefix(prefix);
    }

    /// Path of the log file, `None` when writing to a plain writer
    pub fn path(&self) -> Option<PathBuf> {
        self.inner.lock().path.clone()
    }

    /// Suffix the live file will get on its next rotation
    pub fn suffix(&self) -> String {
        self.inner.lock().policy.suffix().to_string()
    }

    /// Replace the tracked suffix, e.g. to continue the sequence of files a
    /// previous run left behind
    pub fn set_suffix(&self, suffix: impl Into<String>) {
        self.inner.lock().policy.set_suffix(suffix);
    }

    pub fn rotation(&self) -> Rotation {
        self.inner.lock().policy.rotation()
    }

    /// Write to an arbitrary sink. The backend is no longer file-backed
    /// afterwards, so rotation stops until the next
    /// [`set_output_by_name`](Self::set_output_by_name).
    pub fn set_output<W: Write + Send + 'static>(&self, out: W) {
        let previous = {
            let mut inner = self.inner.lock();
            inner.path = None;
            inner.writer.replace_output(Output::writer(out))
        };
        drop(previous);
    }

    /// Open (create, append) `path` and make it the output
    pub fn set_output_by_name(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let output = Output::open(path).map_err(|e| Error::open_failed(path, e))?;
        let previous = {
            let mut inner = self.inner.lock();
            inner.path = Some(path.to_path_buf());
            inner.writer.replace_output(output)
        };
        drop(previous);
        Ok(())
    }

    pub fn set_rotate_by_day(&self) {
        self.inner.lock().policy.set_daily(&Local::now());
    }

    pub fn set_rotate_by_hour(&self) {
        self.inner.lock().policy.set_hourly(&Local::now());
    }

    /// Rotate once the file holds at least `bytes`. Advances the sequence
    /// suffix once on activation.
    pub fn set_rotate_by_size(&self, bytes: u64) {
        self.inner.lock().policy.set_size(bytes);
    }

    /// Switch to `rotation` as if the matching `set_rotate_by_*` had been
    /// called. [`Rotation::None`] stops rotating and keeps the suffix.
    pub fn set_rotation(&self, rotation: Rotation) {
        self.inner.lock().policy.apply(rotation, &Local::now());
    }

    /// Run the rotation check without writing anything
    pub fn rotate_if_due(&self) -> Result<bool> {
        self.rotate_if_due_at(&Local::now())
    }

    pub fn rotate_if_due_at(&self, now: &DateTime<Local>) -> Result<bool> {
        self.inner.lock().rotate_if_due(now)
    }

    pub fn flush(&self) -> Result<()> {
        self.inner.lock().writer.flush()?;
        Ok(())
    }

    #[track_caller]
    pub fn fatal(&self, msg: impl fmt::Display) -> Fatal {
        self.emit(LogType::Fatal, format_args!("{}", msg), Location::caller());
        Fatal::new()
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> Fatal {
        self.emit(LogType::Fatal, args, Location::caller());
        Fatal::new()
    }

    #[track_caller]
    pub fn error(&self, msg: impl fmt::Display) {
        self.emit(LogType::Error, format_args!("{}", msg), Location::caller());
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emit(LogType::Error, args, Location::caller());
    }

    #[track_caller]
    pub fn warning(&self, msg: impl fmt::Display) {
        self.emit(LogType::Warning, format_args!("{}", msg), Location::caller());
    }

    #[track_caller]
    pub fn warningf(&self, args: fmt::Arguments<'_>) {
        self.emit(LogType::Warning, args, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, msg: impl fmt::Display) {
        self.emit(LogType::Info, format_args!("{}", msg), Location::caller());
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit(LogType::Info, args, Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, msg: impl fmt::Display) {
        self.emit(LogType::Debug, format_args!("{}", msg), Location::caller());
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emit(LogType::Debug, args, Location::caller());
    }

    /// Log with a type chosen at runtime. Fatal messages are written but the
    /// signal is discarded; use [`fatal`](Self::fatal) to get it.
    #[track_caller]
    pub fn log(&self, t: LogType, msg: impl fmt::Display) {
        self.emit(t, format_args!("{}", msg), Location::caller());
    }

    #[track_caller]
    pub fn logf(&self, t: LogType, args: fmt::Arguments<'_>) {
        self.emit(t, args, Location::caller());
    }

    /// Gate, rotate if due, render and write one line
    pub(crate) fn emit(&self, t: LogType, args: fmt::Arguments<'_>, location: &Location<'_>) {
        if !self.enabled(t) {
            return;
        }

        // Arguments may call back into this backend, so render unlocked
        let message = render_message(t, self.colored(), args);

        let mut inner = self.inner.lock();
        if let Err(e) = inner.rotate_if_due(&Local::now()) {
            eprintln!("lograte: {}", e);
            return;
        }
        if let Err(e) = inner.writer.write_line(location, &message) {
            eprintln!("lograte: write failed: {}", e);
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::simple()
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("level", &self.level())
            .field("colored", &self.colored())
            .field("inner", &*self.inner.lock())
            .finish()
    }
}

impl Inner {
    fn rotate_if_due(&mut self, now: &DateTime<Local>) -> Result<bool> {
        let Some(path) = self.path.clone() else {
            return Ok(false);
        };
        let Some(next) = self.policy.should_rotate(now) else {
            return Ok(false);
        };

        if let Some(threshold) = self.policy.threshold() {
            let Some(file) = self.writer.output().as_file() else {
                return Ok(false);
            };
            let size = file
                .metadata()
                .map_err(|e| Error::rotate_failed(&path, e))?
                .len();
            if size < threshold {
                return Ok(false);
            }
        }

        self.rotate(&path, next)?;
        Ok(true)
    }

    /// Rename the live file to `<path>.<suffix>`, reopen `path` and adopt
    /// `next`. On failure the suffix is untouched and the old handle stays in
    /// use.
    fn rotate(&mut self, path: &Path, next: String) -> Result<()> {
        let rotated = rotated_path(path, self.policy.suffix());
        match std::fs::rename(path, &rotated) {
            Ok(()) => {}
            // Renamed by an earlier attempt whose reopen failed
            Err(e) if e.kind() == io::ErrorKind::NotFound && rotated.exists() => {}
            Err(e) => return Err(Error::rotate_failed(path, e)),
        }

        let file = open_append(path).map_err(|e| Error::open_failed(path, e))?;
        let previous = self.writer.replace_output(Output::File(file));
        close_output(previous, &rotated);

        debug!("Rotated log file {} to {}", path.display(), rotated.display());
        self.policy.adopt(next);
        Ok(())
    }
}

// Close errors are reported and otherwise ignored; the fresh file is
// already in place.
fn close_output(output: Output, rotated: &Path) {
    match output {
        Output::File(file) => {
            if let Err(e) = nix::unistd::close(file.into_raw_fd()) {
                warn!("Failed to close rotated log {}: {}", rotated.display(), e);
            }
        }
        Output::Writer(mut w) => {
            if let Err(e) = w.flush() {
                warn!("Failed to flush previous output: {}", e);
            }
        }
    }
}

/// `[name] message`, wrapped in the type's color when `colored`
pub fn render_message(t: LogType, colored: bool, args: fmt::Arguments<'_>) -> String {
    if colored {
        format!("{}[{}] {}{}", t.color(), t.as_str(), args, COLOR_RESET)
    } else {
        format!("[{}] {}", t.as_str(), args)
    }
}
