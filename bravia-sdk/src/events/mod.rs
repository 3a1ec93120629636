//! Polling event loop
//!
//! While at least one callback is registered a worker thread samples the
//! device every poll interval, diffs the sample against the previous one and
//! calls every callback once per detected [`EventKind`].

mod event_loop;
pub(crate) mod sampler;
mod snapshot;

pub use event_loop::{CallbackId, EventCallback, EventLoop, LoopState};
pub use sampler::{RpcSampler, StateSampler};
pub use snapshot::{diff, ControlPointState, DeviceSnapshot, EventKind};
