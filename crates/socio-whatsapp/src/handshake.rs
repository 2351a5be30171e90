// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook subscription handshake.

use serde::Deserialize;
use subtle::ConstantTimeEq;

/// Query string Meta sends when (re)subscribing the webhook.
#[derive(Debug, Default, Deserialize)]
pub struct HandshakeQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeResult {
    /// Echo this challenge back with 200.
    Accepted(String),
    Forbidden,
    /// No verify token configured; fail closed.
    NotConfigured,
}

/// Decides the handshake response for `query` against the configured token.
pub fn handshake(query: &HandshakeQuery, configured_token: Option<&str>) -> HandshakeResult {
    let Some(expected) = configured_token.filter(|t| !t.is_empty()) else {
        return HandshakeResult::NotConfigured;
    };
    match (&query.mode, &query.verify_token, &query.challenge) {
        (Some(mode), Some(token), Some(challenge))
            if mode == "subscribe" && tokens_match(token, expected) =>
        {
            HandshakeResult::Accepted(challenge.clone())
        }
        _ => HandshakeResult::Forbidden,
    }
}

/// Compares without early exit; tokens of different length never match.
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(mode: &str, token: &str, challenge: &str) -> HandshakeQuery {
        HandshakeQuery {
            mode: Some(mode.into()),
            verify_token: Some(token.into()),
            challenge: Some(challenge.into()),
        }
    }

    #[test]
    fn matching_token_echoes_challenge() {
        let result = handshake(&query("subscribe", "verify-secret", "1158201444"), Some("verify-secret"));
        assert_eq!(result, HandshakeResult::Accepted("1158201444".into()));
    }

    #[test]
    fn wrong_token_or_mode_is_forbidden() {
        assert_eq!(
            handshake(&query("subscribe", "nope", "c"), Some("verify-secret")),
            HandshakeResult::Forbidden
        );
        assert_eq!(
            handshake(&query("unsubscribe", "verify-secret", "c"), Some("verify-secret")),
            HandshakeResult::Forbidden
        );
        assert_eq!(
            handshake(&HandshakeQuery::default(), Some("verify-secret")),
            HandshakeResult::Forbidden
        );
    }

    #[test]
    fn token_prefix_or_extension_is_forbidden() {
        for presented in ["verify", "verify-secret2", "", "VERIFY-SECRET"] {
            assert_eq!(
                handshake(&query("subscribe", presented, "c"), Some("verify-secret")),
                HandshakeResult::Forbidden,
                "{presented:?}"
            );
        }
        assert!(tokens_match("verify-secret", "verify-secret"));
    }

    #[test]
    fn unconfigured_token_fails_closed() {
        assert_eq!(
            handshake(&query("subscribe", "x", "c"), None),
            HandshakeResult::NotConfigured
        );
    }

    #[test]
    fn query_deserializes_dotted_names() {
        let q: HandshakeQuery = serde_json::from_value(serde_json::json!({
            "hub.mode": "subscribe",
            "hub.verify_token": "t",
            "hub.challenge": "42"
        }))
        .unwrap();
        assert_eq!(q.mode.as_deref(), Some("subscribe"));
        assert_eq!(q.challenge.as_deref(), Some("42"));
    }
}
