//! # Public façade: configure limits once, supervise many calls.
//!
//! This module provides the user-facing types:
//! - [`Watch`] - a configured supervisor (limits + sampling rate), cheap to clone
//! - [`WatchBuilder`] - validated construction of a [`Watch`]
//! - [`Watched`] - an operation bound to a [`Watch`], callable many times
//! - [`watch`] - shorthand for wrapping an operation without limits

mod builder;
mod watched;

pub use builder::WatchBuilder;
pub use watched::{watch, Watch, Watched};
