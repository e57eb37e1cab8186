//! Payloads returned by the robot server.
//!
//! Server revisions disagree on field names and on which telemetry fields
//! exist at all, so every telemetry field is optional and both the
//! snake_case and camelCase spellings are accepted.

use serde::{Deserialize, Serialize};

/// Body of a command response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    /// Human-readable outcome, e.g. `"horn ON"`.
    pub status: String,
    /// Action the robot applied, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// When the robot applied the command, in milliseconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Telemetry snapshot served by `GET /is_moving`.
///
/// The control core copies this through verbatim and does not interpret it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Whether the robot reports its drive link as up.
    #[serde(default)]
    pub connected: bool,
    /// Whether the robot is currently moving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moving: Option<bool>,
    /// Last command the robot applied.
    #[serde(
        default,
        alias = "lastCommand",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_command: Option<String>,
    /// Sensor summary, left opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensors: Option<serde_json::Value>,
    /// Locator of the video feed.
    #[serde(default, alias = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_command_response() {
        let resp: ControlResponse = serde_json::from_str(r#"{"status":"horn ON"}"#).unwrap();
        assert_eq!(resp.status, "horn ON");
        assert!(resp.action.is_none());
        assert!(resp.timestamp.is_none());
    }

    #[test]
    fn parses_timestamped_command_response() {
        let resp: ControlResponse = serde_json::from_str(
            r#"{"status":"ok","action":"forward_on","timestamp":1700000000123}"#,
        )
        .unwrap();
        assert_eq!(resp.action.as_deref(), Some("forward_on"));
        assert_eq!(resp.timestamp, Some(1_700_000_000_123));
    }

    #[test]
    fn parses_moving_variant_snapshot() {
        let snap: StatusSnapshot = serde_json::from_str(
            r#"{"connected":true,"moving":false,"lastCommand":"stop"}"#,
        )
        .unwrap();
        assert!(snap.connected);
        assert_eq!(snap.moving, Some(false));
        assert_eq!(snap.last_command.as_deref(), Some("stop"));
        assert!(snap.video_url.is_none());
    }

    #[test]
    fn parses_sensor_variant_snapshot() {
        let snap: StatusSnapshot = serde_json::from_str(
            r#"{"connected":true,"sensors":{"battery":0.82},"videoUrl":"http://10.0.0.5:8080/feed","extra":1}"#,
        )
        .unwrap();
        assert_eq!(snap.video_url.as_deref(), Some("http://10.0.0.5:8080/feed"));
        assert_eq!(snap.sensors.unwrap()["battery"], 0.82);
        assert!(snap.moving.is_none());
    }

    #[test]
    fn empty_object_is_a_disconnected_snapshot() {
        let snap: StatusSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snap, StatusSnapshot::default());
    }
}
