//! Logging shims.
//!
//! Routes `trace!`, `debug!` and `error!` to `log` or `defmt` depending on the
//! enabled feature. With neither feature the macros expand to nothing.
#![allow(unused_macros)]

cfg_if::cfg_if! {
    if #[cfg(feature = "log")] {
        macro_rules! trace {
            ($($arg:tt)+) => { ::log::trace!($($arg)+) };
        }
        macro_rules! debug {
            ($($arg:tt)+) => { ::log::debug!($($arg)+) };
        }
        macro_rules! error {
            ($($arg:tt)+) => { ::log::error!($($arg)+) };
        }
    } else if #[cfg(feature = "defmt")] {
        macro_rules! trace {
            ($($arg:tt)+) => { ::defmt::trace!($($arg)+) };
        }
        macro_rules! debug {
            ($($arg:tt)+) => { ::defmt::debug!($($arg)+) };
        }
        macro_rules! error {
            ($($arg:tt)+) => { ::defmt::error!($($arg)+) };
        }
    } else {
        macro_rules! trace {
            ($($arg:tt)+) => {};
        }
        macro_rules! debug {
            ($($arg:tt)+) => {};
        }
        macro_rules! error {
            ($($arg:tt)+) => {};
        }
    }
}
