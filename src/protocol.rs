//! Wire protocol for the translation backend: JSON envelopes carrying named events.
//!
//! Every frame on the socket is `{"event": <name>, "data": <payload>}`. Commands
//! are serialized from typed variants; inbound frames are matched by event name
//! so unknown events and malformed payloads can be dropped without disturbing
//! the views.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Backend-authoritative translation configuration, mirrored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    pub model_name: String,
    pub sample_rate: u32,
    pub chunk_duration: f64,
    pub volume_threshold: f64,
    pub selected_microphone_id: Option<i64>,
    pub use_gpu: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model_name: "small".to_string(),
            sample_rate: 16_000,
            chunk_duration: 2.0,
            volume_threshold: 0.01,
            selected_microphone_id: None,
            use_gpu: false,
        }
    }
}

/// Single-field update command payload; only the edited field is sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_gpu: Option<bool>,
}

impl ConfigPatch {
    pub fn model_name(name: impl Into<String>) -> Self {
        Self {
            model_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn sample_rate(rate: u32) -> Self {
        Self {
            sample_rate: Some(rate),
            ..Self::default()
        }
    }

    pub fn chunk_duration(seconds: f64) -> Self {
        Self {
            chunk_duration: Some(seconds),
            ..Self::default()
        }
    }

    pub fn volume_threshold(threshold: f64) -> Self {
        Self {
            volume_threshold: Some(threshold),
            ..Self::default()
        }
    }

    pub fn use_gpu(enabled: bool) -> Self {
        Self {
            use_gpu: Some(enabled),
            ..Self::default()
        }
    }
}

/// Capture device descriptor supplied wholesale by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Microphone {
    pub id: i64,
    pub name: String,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Commands emitted to the backend. Serialization produces the wire envelope
/// directly, so `emit` sites never assemble JSON by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    Ping { timestamp: u64 },
    GetMicrophones,
    GetConfig,
    StartTranslation,
    StopTranslation,
    UpdateConfig(ConfigPatch),
    SetMicrophone { id: i64 },
}

impl ClientCommand {
    /// Encode into a single text frame.
    pub fn to_frame(&self) -> Result<String> {
        serde_json::to_string(self).context("encode command envelope")
    }
}

/// Events received from the backend, after envelope decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Pong,
    Logs { message: String },
    Translation { text: String },
    TranslationStatus { active: bool },
    Microphones { microphones: Vec<Microphone> },
    Config(TranslationConfig),
}

#[derive(Debug, Deserialize)]
struct LogsPayload {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TranslationPayload {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TranslationStatusPayload {
    active: bool,
}

#[derive(Debug, Deserialize)]
struct MicrophonesPayload {
    microphones: Vec<Microphone>,
}

impl ServerEvent {
    /// Decode one inbound frame.
    ///
    /// Returns `Ok(None)` for events this client does not know, and `Err` for
    /// frames that are not an envelope or whose payload does not match the
    /// event's shape. Callers log and drop both cases.
    pub fn decode(frame: &str) -> Result<Option<Self>> {
        let envelope: serde_json::Value =
            serde_json::from_str(frame).context("parse event envelope")?;
        let name = envelope
            .get("event")
            .and_then(|v| v.as_str())
            .context("envelope missing event name")?;
        let data = envelope
            .get("data")
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        let event = match name {
            "pong" => Self::Pong,
            "logs" => {
                let payload: LogsPayload =
                    serde_json::from_value(data).context("logs payload")?;
                Self::Logs {
                    message: payload.message,
                }
            }
            "translation" => {
                let payload: TranslationPayload =
                    serde_json::from_value(data).context("translation payload")?;
                Self::Translation { text: payload.text }
            }
            "translation_status" => {
                let payload: TranslationStatusPayload =
                    serde_json::from_value(data).context("translation_status payload")?;
                Self::TranslationStatus {
                    active: payload.active,
                }
            }
            "microphones" => {
                let payload: MicrophonesPayload =
                    serde_json::from_value(data).context("microphones payload")?;
                Self::Microphones {
                    microphones: payload.microphones,
                }
            }
            "config" => {
                let config: TranslationConfig =
                    serde_json::from_value(data).context("config payload")?;
                Self::Config(config)
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn commands_encode_as_named_envelopes() {
        let frame = ClientCommand::Ping { timestamp: 1234 }
            .to_frame()
            .expect("encode ping");
        assert_eq!(frame, r#"{"event":"ping","data":{"timestamp":1234}}"#);

        let frame = ClientCommand::SetMicrophone { id: 3 }
            .to_frame()
            .expect("encode set_microphone");
        assert_eq!(frame, r#"{"event":"set_microphone","data":{"id":3}}"#);
    }

    #[rstest]
    #[case(ClientCommand::GetMicrophones, "get_microphones")]
    #[case(ClientCommand::GetConfig, "get_config")]
    #[case(ClientCommand::StartTranslation, "start_translation")]
    #[case(ClientCommand::StopTranslation, "stop_translation")]
    fn bare_commands_carry_no_data(#[case] command: ClientCommand, #[case] name: &str) {
        let frame = command.to_frame().expect("encode");
        assert_eq!(frame, format!(r#"{{"event":"{name}"}}"#));
    }

    #[test]
    fn update_config_sends_only_the_edited_field() {
        let frame = ClientCommand::UpdateConfig(ConfigPatch::use_gpu(true))
            .to_frame()
            .expect("encode update_config");
        assert_eq!(frame, r#"{"event":"update_config","data":{"use_gpu":true}}"#);

        let frame = ClientCommand::UpdateConfig(ConfigPatch::sample_rate(22_050))
            .to_frame()
            .expect("encode update_config");
        assert_eq!(
            frame,
            r#"{"event":"update_config","data":{"sample_rate":22050}}"#
        );
    }

    #[test]
    fn decode_translation_event() {
        let event = ServerEvent::decode(r#"{"event":"translation","data":{"text":"bonjour"}}"#)
            .expect("decode")
            .expect("known event");
        assert_eq!(
            event,
            ServerEvent::Translation {
                text: "bonjour".to_string()
            }
        );
    }

    #[test]
    fn decode_config_snapshot() {
        let frame = r#"{"event":"config","data":{
            "model_name":"medium","sample_rate":22050,"chunk_duration":1.5,
            "volume_threshold":0.05,"selected_microphone_id":2,"use_gpu":true}}"#;
        let event = ServerEvent::decode(frame).expect("decode").expect("known");
        let ServerEvent::Config(config) = event else {
            panic!("expected config event");
        };
        assert_eq!(config.model_name, "medium");
        assert_eq!(config.sample_rate, 22_050);
        assert_eq!(config.selected_microphone_id, Some(2));
        assert!(config.use_gpu);
    }

    #[test]
    fn decode_microphone_list() {
        let frame = r#"{"event":"microphones","data":{
            "microphones":[{"id":0,"name":"Built-in","channels":1,"sample_rate":44100}],
            "count":1}}"#;
        let event = ServerEvent::decode(frame).expect("decode").expect("known");
        let ServerEvent::Microphones { microphones } = event else {
            panic!("expected microphones event");
        };
        assert_eq!(microphones.len(), 1);
        assert_eq!(microphones[0].name, "Built-in");
    }

    #[test]
    fn decode_pong_tolerates_any_payload() {
        let event = ServerEvent::decode(r#"{"event":"pong","data":{"timestamp":99}}"#)
            .expect("decode")
            .expect("known");
        assert_eq!(event, ServerEvent::Pong);

        let event = ServerEvent::decode(r#"{"event":"pong"}"#)
            .expect("decode")
            .expect("known");
        assert_eq!(event, ServerEvent::Pong);
    }

    #[test]
    fn unknown_events_decode_to_none() {
        let decoded =
            ServerEvent::decode(r#"{"event":"heartbeat","data":{}}"#).expect("decode");
        assert!(decoded.is_none());
    }

    #[rstest]
    #[case("not json at all")]
    #[case(r#"{"data":{"text":"no event name"}}"#)]
    #[case(r#"{"event":"translation","data":{"wrong":"shape"}}"#)]
    fn malformed_frames_error_without_panicking(#[case] frame: &str) {
        assert!(ServerEvent::decode(frame).is_err());
    }

    #[test]
    fn default_config_matches_backend_defaults() {
        let config = TranslationConfig::default();
        assert_eq!(config.model_name, "small");
        assert_eq!(config.sample_rate, 16_000);
        assert_eq!(config.chunk_duration, 2.0);
        assert_eq!(config.volume_threshold, 0.01);
        assert_eq!(config.selected_microphone_id, None);
        assert!(!config.use_gpu);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = TranslationConfig {
            model_name: "large".to_string(),
            sample_rate: 48_000,
            chunk_duration: 0.5,
            volume_threshold: 0.2,
            selected_microphone_id: Some(7),
            use_gpu: true,
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let back: TranslationConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }
}
