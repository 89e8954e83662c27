//! clickzin-tracker: install and event attribution for the Clickzin network
//!
//! Re-exports the core types and the async client. See [`Tracker`] for the
//! attribution flow.

pub use tracker_client::{
    AppMetadata, AttributionRequest, AttributionResponse, DeviceIdentity, DeviceInfo, HttpTransport,
    Method, NetworkAddresses, ParamValue, StaticDevice, StatusError, Tracker, TrackerBuilder,
    Transport,
};
pub use tracker_core::{
    compute_fingerprint, params, select_address, AttributionError, Fingerprint, MatchContract,
    Result, TrackerConfig, TrackingSnapshot,
};
