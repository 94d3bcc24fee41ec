//! Formatting macros over backends and registries
//!
//! Each macro takes the target first, then `format!`-style arguments:
//!
//! ```ignore
//! lograte::info!(backend, "listening on {}", addr);
//! lograte::fatal!(registry, "cannot bind: {}", err).exit();
//! ```

#[macro_export]
macro_rules! fatal {
    ($target:expr, $($arg:tt)+) => {
        $target.fatalf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($target:expr, $($arg:tt)+) => {
        $target.errorf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warning {
    ($target:expr, $($arg:tt)+) => {
        $target.warningf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($target:expr, $($arg:tt)+) => {
        $target.infof(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($target:expr, $($arg:tt)+) => {
        $target.debugf(::std::format_args!($($arg)+))
    };
}
