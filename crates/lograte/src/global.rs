//! Process-wide registry
//!
//! Convenience layer for code that wants one shared set of backends. The
//! registry starts with the default `console` backend; fatal calls here
//! terminate the process after the broadcast.

use once_cell::sync::Lazy;
use std::fmt;

use crate::registry::Registry;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// The process-wide registry
pub fn global() -> &'static Registry {
    &GLOBAL
}

#[track_caller]
pub fn fatal(msg: impl fmt::Display) -> ! {
    global().fatal(msg).exit()
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    global().fatalf(args).exit()
}

#[track_caller]
pub fn error(msg: impl fmt::Display) {
    global().error(msg);
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    global().errorf(args);
}

#[track_caller]
pub fn warning(msg: impl fmt::Display) {
    global().warning(msg);
}

#[track_caller]
pub fn warningf(args: fmt::Arguments<'_>) {
    global().warningf(args);
}

#[track_caller]
pub fn info(msg: impl fmt::Display) {
    global().info(msg);
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    global().infof(args);
}

#[track_caller]
pub fn debug(msg: impl fmt::Display) {
    global().debug(msg);
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    global().debugf(args);
}
