//! Install attribution tracker
//!
//! Drives the postback protocol against the tracking server:
//!
//! 1. deferred match: fingerprint the device and ask whether a recorded ad
//!    click carries the same fingerprint (skipped in test mode)
//! 2. install confirmation: report the install identifier once
//! 3. event reports: post-install events, only after confirmation
//!
//! `start_tracking` runs as a single critical section, so concurrent callers
//! never send more than one confirmation.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracker_core::{
    compute_fingerprint, params, select_address, AttributionError, MatchOutcome, Result,
    TrackerConfig, TrackingSnapshot, TrackingState, PLACEHOLDER_ADDRESS,
    TEST_ATTRIBUTION_SOURCE, TEST_INSTALL_IDENTIFIER,
};

use crate::device::DeviceInfo;
use crate::request::AttributionRequest;
use crate::transport::{HttpTransport, Transport};

/// Attribution tracker owning its configuration and state
pub struct Tracker {
    transport: Arc<dyn Transport>,
    device: Arc<dyn DeviceInfo>,
    config: OnceLock<TrackerConfig>,
    state: Mutex<TrackingState>,
    /// Serializes whole `start_tracking` runs, including their network calls
    flow: tokio::sync::Mutex<()>,
}

impl Tracker {
    /// Create an unconfigured tracker
    pub fn new(transport: Arc<dyn Transport>, device: Arc<dyn DeviceInfo>) -> Self {
        Self {
            transport,
            device,
            config: OnceLock::new(),
            state: Mutex::new(TrackingState::new()),
            flow: tokio::sync::Mutex::new(()),
        }
    }

    /// Supply configuration. Accepted once; later calls fail.
    pub fn configure(&self, config: TrackerConfig) -> Result<()> {
        config.validate()?;
        let test_mode = config.test_mode;
        let contract = config.match_contract;
        self.config
            .set(config)
            .map_err(|_| AttributionError::AlreadyConfigured)?;

        tracing::info!(
            test_mode,
            contract_version = contract.version(),
            "Tracker configured"
        );
        Ok(())
    }

    pub fn config(&self) -> Result<&TrackerConfig> {
        self.config.get().ok_or_else(|| {
            AttributionError::ConfigurationMissing("configure() has not been called".to_string())
        })
    }

    pub fn is_confirmed(&self) -> bool {
        self.state.lock().is_confirmed()
    }

    pub fn snapshot(&self) -> TrackingSnapshot {
        self.state.lock().snapshot()
    }

    /// Attribute this install and confirm it with the tracking server.
    ///
    /// Returns immediately once the install has been confirmed. A failed
    /// attempt leaves the state untouched so the call can be repeated.
    pub async fn start_tracking(&self) -> Result<()> {
        let config = self.config()?;

        let _flow = self.flow.lock().await;
        if self.state.lock().is_confirmed() {
            tracing::debug!("Install already confirmed, skipping");
            return Ok(());
        }

        let (install_id, source, click_uid) = if config.test_mode {
            (
                TEST_INSTALL_IDENTIFIER.to_string(),
                Some(TEST_ATTRIBUTION_SOURCE.to_string()),
                None,
            )
        } else {
            let install_id = self.device.install_identifier();
            if install_id.trim().is_empty() {
                return Err(AttributionError::ConfigurationMissing(
                    "device reported an empty install identifier".to_string(),
                ));
            }
            let outcome = self.deferred_match(config).await?;
            let source = outcome.source.unwrap_or_else(|| self.device.app_name());
            (install_id, Some(source), outcome.click_uid)
        };

        self.confirm_install(config, &install_id).await?;

        tracing::info!(
            install_id = %install_id,
            source = source.as_deref().unwrap_or(""),
            "Install attribution confirmed"
        );
        self.state.lock().confirm(install_id, source, click_uid);
        Ok(())
    }

    /// Report a post-install event for the confirmed install
    pub async fn track_event(&self, event_id: &str) -> Result<()> {
        let install_id = self
            .state
            .lock()
            .confirmed_identifier()
            .map(str::to_owned)
            .ok_or(AttributionError::TrackingNotInitialized)?;
        let config = self.config()?;

        if event_id.is_empty() {
            return Err(AttributionError::InvalidParameters(
                "event id must not be empty".to_string(),
            ));
        }

        let request = AttributionRequest::get(config.postback_url())
            .param(params::INSTALL_ID, install_id.as_str())
            .param(params::EVENT, event_id)
            .timeout(config.timeout());

        // Event writes count as delivered on any non-error reply
        if let Err(err) = self.transport.send(request).await.into_result() {
            tracing::warn!(event = event_id, error = %err, "Event postback failed");
            return Err(err);
        }

        tracing::info!(event = event_id, install_id = %install_id, "Event reported");
        Ok(())
    }

    /// Run [`Tracker::start_tracking`] on the runtime and hand the result to
    /// `on_complete` exactly once.
    pub fn start_tracking_detached<F>(self: &Arc<Self>, on_complete: F) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            let result = tracker.start_tracking().await;
            on_complete(result);
        })
    }

    /// Run [`Tracker::track_event`] on the runtime and hand the result to
    /// `on_complete` exactly once.
    pub fn track_event_detached<F>(
        self: &Arc<Self>,
        event_id: impl Into<String>,
        on_complete: F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let tracker = Arc::clone(self);
        let event_id = event_id.into();
        tokio::spawn(async move {
            let result = tracker.track_event(&event_id).await;
            on_complete(result);
        })
    }

    async fn deferred_match(&self, config: &TrackerConfig) -> Result<MatchOutcome> {
        let address = select_address(&self.device.interfaces());
        if address == PLACEHOLDER_ADDRESS {
            tracing::warn!("No network address available, fingerprinting placeholder");
        }
        let fingerprint = compute_fingerprint(&address, &self.device.os_version());

        tracing::debug!(fingerprint = %fingerprint, "Requesting deferred match");

        let request = AttributionRequest::get(config.postback_url())
            .param(params::FINGERPRINT, fingerprint.as_str())
            .timeout(config.timeout());
        let body = self.transport.send(request).await.into_result()?;

        config
            .match_contract
            .evaluate(body.as_deref())
            .map_err(|err| {
                tracing::warn!(error = %err, "Deferred match rejected");
                err
            })
    }

    async fn confirm_install(&self, config: &TrackerConfig, install_id: &str) -> Result<()> {
        let request = AttributionRequest::get(config.postback_url())
            .param(params::INSTALL_ID, install_id)
            .timeout(config.timeout());

        // Any non-error reply confirms, including an empty body
        self.transport
            .send(request)
            .await
            .into_result()
            .map(|_| ())
            .map_err(|err| {
                tracing::warn!(error = %err, "Install confirmation failed");
                err
            })
    }
}

/// Builder for [`Tracker`]
pub struct TrackerBuilder {
    device: Arc<dyn DeviceInfo>,
    transport: Option<Arc<dyn Transport>>,
    config: Option<TrackerConfig>,
}

impl TrackerBuilder {
    pub fn new(device: impl DeviceInfo + 'static) -> Self {
        Self {
            device: Arc::new(device),
            transport: None,
            config: None,
        }
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn config(mut self, config: TrackerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the tracker, applying the configuration if one was given.
    ///
    /// Without an explicit transport, an [`HttpTransport`] using the
    /// configured timeout is created.
    pub fn build(self) -> Result<Tracker> {
        let transport = match self.transport {
            Some(t) => t,
            None => {
                let mut http = HttpTransport::new();
                if let Some(config) = &self.config {
                    http = http.with_default_timeout(config.timeout());
                }
                Arc::new(http)
            }
        };

        let tracker = Tracker::new(transport, self.device);
        if let Some(config) = self.config {
            tracker.configure(config)?;
        }
        Ok(tracker)
    }
}
