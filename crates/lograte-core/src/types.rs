//! Core types for lograte

use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const WHITE: &str = "\x1b[0;37m";
const RED: &str = "\x1b[0;31m";
const YELLOW: &str = "\x1b[0;33m";
const CYAN: &str = "\x1b[0;36m";

/// Severity of a single log call
///
/// Each variant owns exactly one bit, so a [`LogLevel`] can aggregate several
/// types and the enabled test is a subset check.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogType {
    Fatal = 0x01,
    Error = 0x02,
    Warning = 0x04,
    Info = 0x08,
    Debug = 0x10,
}

impl LogType {
    /// All types, most severe first
    pub const ALL: [LogType; 5] = [
        LogType::Fatal,
        LogType::Error,
        LogType::Warning,
        LogType::Info,
        LogType::Debug,
    ];

    pub const fn bit(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Fatal => "fatal",
            LogType::Error => "error",
            LogType::Warning => "warning",
            LogType::Info => "info",
            LogType::Debug => "debug",
        }
    }

    /// ANSI color sequence opening a colored line of this type
    pub fn color(&self) -> &'static str {
        match self {
            LogType::Fatal | LogType::Error => RED,
            LogType::Warning => YELLOW,
            LogType::Debug => CYAN,
            LogType::Info => WHITE,
        }
    }

    /// Look up the type owning exactly `bits`
    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.bit() == bits)
    }

    /// Display name and color for a raw bit pattern; anything that is not
    /// exactly one type renders as "unknown" in the default color.
    pub fn describe(bits: u8) -> (&'static str, &'static str) {
        match Self::from_bits(bits) {
            Some(t) => (t.as_str(), t.color()),
            None => ("unknown", WHITE),
        }
    }
}

impl FromStr for LogType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fatal" => Ok(LogType::Fatal),
            "error" => Ok(LogType::Error),
            "warn" | "warning" => Ok(LogType::Warning),
            "info" => Ok(LogType::Info),
            "debug" => Ok(LogType::Debug),
            _ => Err(Error::config(format!("Invalid log type: {}", s))),
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

bitflags! {
    /// Cumulative severity threshold
    ///
    /// Every named level includes all the bits of the more severe ones:
    /// `DEBUG ⊇ INFO ⊇ WARN ⊇ ERROR ⊇ FATAL ⊇ NONE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LogLevel: u8 {
        const FATAL = LogType::Fatal as u8;
        const ERROR = Self::FATAL.bits() | LogType::Error as u8;
        const WARN = Self::ERROR.bits() | LogType::Warning as u8;
        const INFO = Self::WARN.bits() | LogType::Info as u8;
        const DEBUG = Self::INFO.bits() | LogType::Debug as u8;
        const ALL = Self::DEBUG.bits();
    }
}

impl LogLevel {
    pub const NONE: LogLevel = LogLevel::empty();

    /// Whether a message of type `t` passes this level
    #[inline]
    pub fn enables(self, t: LogType) -> bool {
        self.bits() & t.bit() == t.bit()
    }

    /// The cumulative level ending at `t`
    pub fn from_type(t: LogType) -> Self {
        match t {
            LogType::Fatal => LogLevel::FATAL,
            LogType::Error => LogLevel::ERROR,
            LogType::Warning => LogLevel::WARN,
            LogType::Info => LogLevel::INFO,
            LogType::Debug => LogLevel::DEBUG,
        }
    }

    /// Map a level name to its cumulative level. Unrecognized names enable
    /// everything.
    pub fn from_level_name(name: &str) -> Self {
        match name {
            "fatal" => LogLevel::FATAL,
            "error" => LogLevel::ERROR,
            "warn" | "warning" => LogLevel::WARN,
            "info" => LogLevel::INFO,
            "debug" => LogLevel::DEBUG,
            _ => LogLevel::ALL,
        }
    }

    /// Name of a named cumulative level, `None` for hand-built masks
    pub fn name(self) -> Option<&'static str> {
        const NAMED: [(LogLevel, &str); 6] = [
            (LogLevel::NONE, "none"),
            (LogLevel::FATAL, "fatal"),
            (LogLevel::ERROR, "error"),
            (LogLevel::WARN, "warn"),
            (LogLevel::INFO, "info"),
            (LogLevel::DEBUG, "debug"),
        ];
        NAMED
            .iter()
            .find(|(level, _)| *level == self)
            .map(|(_, name)| *name)
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::ALL
    }
}

impl FromStr for LogLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(LogLevel::from_level_name(s))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{:#04x}", self.bits()),
        }
    }
}

bitflags! {
    /// Metadata rendered in front of every line
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LineFlags: u8 {
        /// `2009/01/23`
        const DATE = 0x01;
        /// `01:23:23`
        const TIME = 0x02;
        /// `01:23:23.123123`, implies TIME
        const MICROSECONDS = 0x04;
        /// `/a/b/c/main.rs:23`
        const LONG_FILE = 0x08;
        /// `main.rs:23`, overrides LONG_FILE
        const SHORT_FILE = 0x10;
        /// Render date and time in UTC rather than the local time zone
        const UTC = 0x20;
        const STD = Self::DATE.bits() | Self::TIME.bits();
    }
}

impl LineFlags {
    /// Parse a single flag name, ignoring case
    pub fn from_flag_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "date" => Some(LineFlags::DATE),
            "time" => Some(LineFlags::TIME),
            "microseconds" | "micros" => Some(LineFlags::MICROSECONDS),
            "longfile" => Some(LineFlags::LONG_FILE),
            "shortfile" => Some(LineFlags::SHORT_FILE),
            "utc" => Some(LineFlags::UTC),
            "std" => Some(LineFlags::STD),
            _ => None,
        }
    }

    /// Combine a list of flag names
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().try_fold(LineFlags::empty(), |acc, name| {
            let name = name.as_ref();
            LineFlags::from_flag_name(name)
                .map(|flag| acc | flag)
                .ok_or_else(|| Error::config(format!("Invalid line flag: {}", name)))
        })
    }
}

impl Default for LineFlags {
    fn default() -> Self {
        LineFlags::STD
    }
}

/// When a backend renames its file and starts a fresh one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    /// On every change of local calendar day
    Daily,
    /// On every change of local calendar hour
    Hourly,
    /// Once the file has grown to at least this many bytes
    Size(u64),
}

impl Rotation {
    /// Build a rotation from its config name and optional size threshold
    pub fn parse(mode: &str, size: Option<u64>) -> Result<Self> {
        match mode.to_lowercase().as_str() {
            "none" | "" => Ok(Rotation::None),
            "daily" | "day" => Ok(Rotation::Daily),
            "hourly" | "hour" => Ok(Rotation::Hourly),
            "size" => match size {
                Some(bytes) if bytes > 0 => Ok(Rotation::Size(bytes)),
                _ => Err(Error::config(
                    "Size rotation requires a positive rotate_size",
                )),
            },
            _ => Err(Error::config(format!("Invalid rotation: {}", mode))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::None => "none",
            Rotation::Daily => "daily",
            Rotation::Hourly => "hourly",
            Rotation::Size(_) => "size",
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::Size(bytes) => write!(f, "size({})", bytes),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
