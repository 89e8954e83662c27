//! Tracking state: the only mutable data the tracker keeps

use serde::Serialize;

/// Install identifier reported in test mode
pub const TEST_INSTALL_IDENTIFIER: &str = "TEST_INSTALL_UID";

/// Attribution channel reported in test mode
pub const TEST_ATTRIBUTION_SOURCE: &str = "clickzin_test";

/// Per-tracker attribution state.
///
/// `is_confirmed` only ever moves from `false` to `true`, and only through
/// [`TrackingState::confirm`], which records the identifiers that were
/// reported in the same step. Nothing is written for a failed attempt.
#[derive(Debug, Default)]
pub struct TrackingState {
    install_identifier: Option<String>,
    attribution_source: Option<String>,
    click_uid: Option<String>,
    is_confirmed: bool,
}

impl TrackingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful install confirmation.
    ///
    /// No-op when already confirmed: the first confirmed identity is kept.
    pub fn confirm(
        &mut self,
        install_identifier: String,
        attribution_source: Option<String>,
        click_uid: Option<String>,
    ) {
        if self.is_confirmed {
            return;
        }
        self.install_identifier = Some(install_identifier);
        self.attribution_source = attribution_source;
        self.click_uid = click_uid;
        self.is_confirmed = true;
    }

    pub fn is_confirmed(&self) -> bool {
        self.is_confirmed
    }

    pub fn install_identifier(&self) -> Option<&str> {
        self.install_identifier.as_deref()
    }

    pub fn attribution_source(&self) -> Option<&str> {
        self.attribution_source.as_deref()
    }

    /// Ad click the server matched this install to, when the reply names one
    pub fn click_uid(&self) -> Option<&str> {
        self.click_uid.as_deref()
    }

    /// Identifier to use for event postbacks, if attribution is confirmed
    pub fn confirmed_identifier(&self) -> Option<&str> {
        if self.is_confirmed {
            self.install_identifier()
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> TrackingSnapshot {
        TrackingSnapshot {
            install_identifier: self.install_identifier.clone(),
            attribution_source: self.attribution_source.clone(),
            click_uid: self.click_uid.clone(),
            is_confirmed: self.is_confirmed,
        }
    }
}

/// Point-in-time copy of [`TrackingState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingSnapshot {
    pub install_identifier: Option<String>,
    pub attribution_source: Option<String>,
    pub click_uid: Option<String>,
    pub is_confirmed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_unconfirmed() {
        let state = TrackingState::new();
        assert!(!state.is_confirmed());
        assert_eq!(state.install_identifier(), None);
        assert_eq!(state.confirmed_identifier(), None);
    }

    #[test]
    fn test_confirm_records_identity() {
        let mut state = TrackingState::new();
        state.confirm("uid-1".into(), Some("MyApp".into()), Some("click-7".into()));

        assert!(state.is_confirmed());
        assert_eq!(state.click_uid(), Some("click-7"));
        assert_eq!(state.confirmed_identifier(), Some("uid-1"));
        assert_eq!(state.attribution_source(), Some("MyApp"));
    }

    #[test]
    fn test_confirm_is_sticky() {
        let mut state = TrackingState::new();
        state.confirm("uid-1".into(), Some("MyApp".into()), None);
        state.confirm("uid-2".into(), None, Some("click-8".into()));

        let snap = state.snapshot();
        assert!(snap.is_confirmed);
        assert_eq!(snap.install_identifier.as_deref(), Some("uid-1"));
        assert_eq!(snap.attribution_source.as_deref(), Some("MyApp"));
        assert_eq!(snap.click_uid, None);
    }
}
