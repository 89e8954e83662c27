//! tracker-client: async install attribution client
//!
//! Talks to the Clickzin postback endpoint over HTTP. The [`Tracker`] owns
//! its configuration and state; nothing is process-global, so several
//! trackers can coexist (e.g. in tests).

pub mod device;
pub mod request;
pub mod tracker;
pub mod transport;

pub use device::{AppMetadata, DeviceIdentity, DeviceInfo, NetworkAddresses, StaticDevice};
pub use request::{AttributionRequest, AttributionResponse, Method, ParamValue};
pub use tracker::{Tracker, TrackerBuilder};
pub use tracker_core::{AttributionError, MatchContract, Result, TrackerConfig, TrackingSnapshot};
pub use transport::{HttpTransport, StatusError, Transport};
