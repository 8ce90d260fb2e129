//! WebSocket message types.
//!
//! The push channel is server→client only. Messages keep the shape the
//! browser client expects: `{ "type": "progress", "data": <percent> }`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::conversion::ConversionId;

/// WebSocket message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Progress update
    Progress,
}

impl WsMessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WsMessageType::Progress => "progress",
        }
    }
}

/// WebSocket message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Progress update (0-100)
    Progress {
        data: f64,
        /// Present only when the upload named a conversion scope
        #[serde(
            rename = "conversionId",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        conversion_id: Option<ConversionId>,
    },
}

impl WsMessage {
    /// Create a progress message. The percentage is clamped to 0-100.
    pub fn progress(percent: f64, conversion_id: Option<ConversionId>) -> Self {
        let data = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        WsMessage::Progress {
            data,
            conversion_id,
        }
    }

    /// Scope this message was published for, if any.
    pub fn conversion_id(&self) -> Option<&ConversionId> {
        match self {
            WsMessage::Progress { conversion_id, .. } => conversion_id.as_ref(),
        }
    }

    /// Get the message type.
    pub fn message_type(&self) -> WsMessageType {
        match self {
            WsMessage::Progress { .. } => WsMessageType::Progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_wire_shape() {
        let msg = WsMessage::progress(42.5, None);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "progress", "data": 42.5 }));
    }

    #[test]
    fn test_progress_clamped() {
        assert_eq!(
            WsMessage::progress(150.0, None),
            WsMessage::Progress { data: 100.0, conversion_id: None }
        );
        assert_eq!(
            WsMessage::progress(f64::NAN, None),
            WsMessage::Progress { data: 0.0, conversion_id: None }
        );
    }

    #[test]
    fn test_scoped_progress() {
        let id = ConversionId::parse("upload-7").unwrap();
        let msg = WsMessage::progress(10.0, Some(id.clone()));
        assert_eq!(msg.conversion_id(), Some(&id));

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"conversionId\":\"upload-7\""));
        assert_eq!(msg.message_type().as_str(), "progress");
    }
}
