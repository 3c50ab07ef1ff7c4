//! Asynchronous invocation.
//!
//! [`spawn_binary`] starts sqld and hands back a [`SqldProcess`] without
//! waiting for anything. The caller owns the child from then on: waiting,
//! signalling and shutdown all go through the handle.

mod handle;
mod shutdown;

pub use handle::{SqldProcess, spawn_binary};
pub use shutdown::{DEFAULT_GRACE_PERIOD, shutdown_child};
#[cfg(unix)]
pub(crate) use shutdown::send_signal;
