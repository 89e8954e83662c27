//! tracker-core: Core types for Clickzin install attribution
//!
//! This crate holds everything about attribution that does no I/O:
//! - Fingerprint derivation for deferred deep-link matching
//! - The per-tracker state with its one-way confirmation flag
//! - Configuration and the versioned match-reply contracts
//!
//! # Protocol
//!
//! | Step | Request | Success |
//! |------|---------|---------|
//! | Deferred match | `GET /postback/ios?ip_user_agent_hash=<fingerprint>` | reply satisfies the configured [`MatchContract`] |
//! | Install confirmation | `GET /postback/ios?uid=<install id>` | any non-error reply |
//! | Event report | `GET /postback/ios?uid=<install id>&event=<event id>` | any non-error reply |
//!
//! Test mode skips the deferred match and confirms a sentinel install.
//! Once confirmed, a tracker never reports the install again.

mod config;
mod contract;
mod error;
mod fingerprint;
mod state;

pub use config::{TrackerConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, POSTBACK_PATH};
pub use contract::{MatchContract, MatchOutcome, CHANNEL_NAME, MATCH_MARKER};
pub use error::{AttributionError, BoxError, Result};
pub use fingerprint::{
    compute_fingerprint, select_address, Fingerprint, FINGERPRINT_HEX_LEN, PLACEHOLDER_ADDRESS,
    PREFERRED_INTERFACES,
};
pub use state::{
    TrackingSnapshot, TrackingState, TEST_ATTRIBUTION_SOURCE, TEST_INSTALL_IDENTIFIER,
};

/// Query parameter names understood by the postback endpoint
pub mod params {
    /// Deferred-match fingerprint
    pub const FINGERPRINT: &str = "ip_user_agent_hash";

    /// Install identifier
    pub const INSTALL_ID: &str = "uid";

    /// Post-install event identifier
    pub const EVENT: &str = "event";
}
