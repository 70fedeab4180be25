//! Connectivity monitor: online/offline state and link quality.
//!
//! The monitor is a service object with an explicit lifecycle: construct it,
//! `start` it to get a `MonitorHandle`, and `shutdown` the handle when done.
//! It only reports state; callers decide whether to queue or send.

mod monitor;
mod probe;
mod state;

pub use monitor::{ConnectivityMonitor, MonitorHandle, PlatformSignal, SubscriptionId};
pub use probe::{HeadProbe, LivenessProbe};
pub use state::{ConnectivityState, EffectiveType};
