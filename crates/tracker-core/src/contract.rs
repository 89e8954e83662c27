//! Deferred-match response contracts
//!
//! The tracking service has shipped two incompatible reply formats for the
//! fingerprint lookup. A tracker speaks exactly one of them, chosen in its
//! configuration:
//!
//! | Contract | Version | Success criterion |
//! |----------|---------|-------------------|
//! | `marker` | 1 | UTF-8 body containing the literal `true` |
//! | `structured` | 2 | JSON object with `utm_uid` and a `utm_source` naming `clickzin` |

use serde::{Deserialize, Serialize};

use crate::error::{AttributionError, Result};

/// Literal the v1 server includes in a positive match reply
pub const MATCH_MARKER: &str = "true";

/// Channel name a v2 `utm_source` must contain (case-insensitive)
pub const CHANNEL_NAME: &str = "clickzin";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchContract {
    #[default]
    Marker,
    Structured,
}

/// Attribution details extracted from a positive match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Channel reported by the server, when the contract carries one
    pub source: Option<String>,
    /// Click identifier reported by the server, when the contract carries one
    pub click_uid: Option<String>,
}

#[derive(Deserialize)]
struct StructuredReply {
    utm_uid: Option<String>,
    utm_source: Option<String>,
}

impl MatchContract {
    pub fn version(&self) -> u8 {
        match self {
            MatchContract::Marker => 1,
            MatchContract::Structured => 2,
        }
    }

    /// Decide whether a deferred-match reply body is a positive match
    pub fn evaluate(&self, body: Option<&[u8]>) -> Result<MatchOutcome> {
        let body = match body {
            Some(b) if !b.is_empty() => b,
            _ => return Err(AttributionError::NoMatchingReferrer),
        };

        match self {
            MatchContract::Marker => {
                let text = std::str::from_utf8(body).map_err(|e| {
                    AttributionError::InvalidResponse(format!("match reply is not UTF-8: {}", e))
                })?;
                if text.contains(MATCH_MARKER) {
                    Ok(MatchOutcome::default())
                } else {
                    Err(AttributionError::NoMatchingReferrer)
                }
            }
            MatchContract::Structured => {
                let reply: StructuredReply = serde_json::from_slice(body).map_err(|e| {
                    AttributionError::InvalidResponse(format!("match reply is not JSON: {}", e))
                })?;
                match (reply.utm_uid, reply.utm_source) {
                    (Some(uid), Some(source))
                        if source.to_lowercase().contains(CHANNEL_NAME) =>
                    {
                        Ok(MatchOutcome {
                            source: Some(source),
                            click_uid: Some(uid),
                        })
                    }
                    _ => Err(AttributionError::NoMatchingReferrer),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_match() {
        let outcome = MatchContract::Marker.evaluate(Some(b"true")).unwrap();
        assert_eq!(outcome, MatchOutcome::default());

        assert!(MatchContract::Marker
            .evaluate(Some(br#"{"matched": true}"#))
            .is_ok());
    }

    #[test]
    fn test_marker_no_match() {
        for body in [&b"false"[..], b"{}", b"TRUE"] {
            let err = MatchContract::Marker.evaluate(Some(body)).unwrap_err();
            assert!(matches!(err, AttributionError::NoMatchingReferrer));
        }
    }

    #[test]
    fn test_missing_body_is_no_match() {
        for contract in [MatchContract::Marker, MatchContract::Structured] {
            assert!(matches!(
                contract.evaluate(None),
                Err(AttributionError::NoMatchingReferrer)
            ));
            assert!(matches!(
                contract.evaluate(Some(b"")),
                Err(AttributionError::NoMatchingReferrer)
            ));
        }
    }

    #[test]
    fn test_marker_rejects_binary() {
        let err = MatchContract::Marker
            .evaluate(Some(&[0xff, 0xfe, 0x74]))
            .unwrap_err();
        assert!(matches!(err, AttributionError::InvalidResponse(_)));
    }

    #[test]
    fn test_structured_match() {
        let body = br#"{"utm_uid": "click-42", "utm_source": "ClickZin_Display"}"#;
        let outcome = MatchContract::Structured.evaluate(Some(body)).unwrap();
        assert_eq!(outcome.source.as_deref(), Some("ClickZin_Display"));
        assert_eq!(outcome.click_uid.as_deref(), Some("click-42"));
    }

    #[test]
    fn test_structured_foreign_channel() {
        let body = br#"{"utm_uid": "click-42", "utm_source": "othernet"}"#;
        assert!(matches!(
            MatchContract::Structured.evaluate(Some(body)),
            Err(AttributionError::NoMatchingReferrer)
        ));
    }

    #[test]
    fn test_structured_missing_uid() {
        let body = br#"{"utm_source": "clickzin"}"#;
        assert!(matches!(
            MatchContract::Structured.evaluate(Some(body)),
            Err(AttributionError::NoMatchingReferrer)
        ));
    }

    #[test]
    fn test_structured_does_not_accept_marker() {
        let err = MatchContract::Structured.evaluate(Some(b"true")).unwrap_err();
        assert!(matches!(err, AttributionError::InvalidResponse(_)));

        let err = MatchContract::Structured
            .evaluate(Some(b"matched: true"))
            .unwrap_err();
        assert!(matches!(err, AttributionError::InvalidResponse(_)));
    }
}
