//! Runtime core: the race between one operation and its watchdogs.
//!
//! Nothing in here is public; the [`Watch`](crate::Watch) façade drives it.
//!
//! Internal modules:
//! - [`runner`]: runs the operation on its own thread/task and reports its outcome once;
//! - [`watchdog`]: polls one limit (time or memory) and reports at most one violation;
//! - [`supervisor`]: starts all participants, takes the first event, cancels the rest.

pub(crate) mod runner;
mod supervisor;
mod watchdog;

pub(crate) use supervisor::{default_sampler_factory, SamplerFactory, Supervisor};
