//! lograte - Leveled multi-backend logging with file rotation
//!
//! A [`Backend`] writes leveled lines to one output and can rotate its file
//! by day, by hour or by size. A [`Registry`] holds named backends and
//! broadcasts every call to all of them.

mod backend;
mod crash;
mod global;
mod macros;
mod registry;
mod rotation;
mod writer;

#[cfg(test)]
mod testing;

pub use backend::{render_message, Backend, Fatal};
pub use crash::crash_log;
pub use global::{
    debug, debugf, error, errorf, fatal, fatalf, global, info, infof, warning, warningf,
};
pub use registry::Registry;
pub use rotation::{day_suffix, hour_suffix, next_sequence, rotated_path, RotationPolicy};
pub use writer::{render_line, LineWriter, Output};

pub use lograte_core::{
    constants, BackendConfig, Error, LineFlags, LogConfig, LogLevel, LogType, Result, Rotation,
};
