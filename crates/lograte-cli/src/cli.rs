//! CLI argument definitions

use clap::{Parser, ValueEnum};
use lograte_core::LogType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lograte")]
#[command(version, about = "Write leveled lines to rotating log backends")]
pub struct Cli {
    /// Message to log; every stdin line is logged when omitted
    pub message: Vec<String>,

    /// Config file (default: lograte.toml/yaml/yml/json in the current directory)
    #[arg(short, long, env = "LOGRATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log to this file instead of the configured backends
    #[arg(short, long, conflicts_with = "stderr")]
    pub file: Option<PathBuf>,

    /// Log to stderr instead of stdout
    #[arg(long)]
    pub stderr: bool,

    /// Backend level: fatal, error, warn, info, debug (anything else enables all)
    #[arg(short, long)]
    pub level: Option<String>,

    /// Severity of the emitted lines
    #[arg(short = 't', long = "type", value_enum, default_value_t = TypeArg::Info)]
    pub log_type: TypeArg,

    /// Rotate the log file (applies to file backends of a config too)
    #[arg(long, value_enum, default_value_t = RotateArg::None)]
    pub rotate: RotateArg,

    /// Size threshold in bytes for --rotate size
    #[arg(long)]
    pub rotate_size: Option<u64>,

    /// Line metadata, comma separated: date,time,microseconds,longfile,shortfile,utc
    #[arg(long, value_delimiter = ',')]
    pub flags: Option<Vec<String>>,

    /// Text placed in front of every line
    #[arg(long)]
    pub prefix: Option<String>,

    /// Disable ANSI colors
    #[arg(long)]
    pub no_color: bool,

    /// Redirect this process's stderr to a file
    #[arg(long)]
    pub crash_log: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Whether the backend is described by flags rather than a config file
    pub fn is_ad_hoc(&self) -> bool {
        self.file.is_some() || self.stderr
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    Fatal,
    Error,
    #[value(alias = "warn")]
    Warning,
    Info,
    Debug,
}

impl From<TypeArg> for LogType {
    fn from(t: TypeArg) -> Self {
        match t {
            TypeArg::Fatal => LogType::Fatal,
            TypeArg::Error => LogType::Error,
            TypeArg::Warning => LogType::Warning,
            TypeArg::Info => LogType::Info,
            TypeArg::Debug => LogType::Debug,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RotateArg {
    None,
    Daily,
    Hourly,
    Size,
}

impl RotateArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotateArg::None => "none",
            RotateArg::Daily => "daily",
            RotateArg::Hourly => "hourly",
            RotateArg::Size => "size",
        }
    }
}
