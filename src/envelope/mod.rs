//! Per-channel message envelopes.
//!
//! A publish call carries one payload per delivery channel. The provider picks
//! the payload matching each subscriber's protocol and falls back to
//! `default`:
//!
//! | Channel | Plain text `t` | Structured `m` |
//! |---|---|---|
//! | `default` | `t` | `m.alert` if it is a string, else `m` as JSON |
//! | `APNS`, `APNS_SANDBOX` | `{"aps":{"alert":t}}` | `{"aps":{alert,badge,sound,"content-available":1,data}}` |
//! | `GCM` | `{"data":{"alert":t}}` | `{"data":{alert,badge,sound,data}}` |
//!
//! For structured messages `alert`, `badge` and `sound` are lifted out of the
//! message; every other key ends up under `data`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Keys lifted out of a structured message into the platform payload.
const ALERT_KEY: &str = "alert";
const BADGE_KEY: &str = "badge";
const SOUND_KEY: &str = "sound";

/// A message as supplied by the caller of publish.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(String),
    Structured(Map<String, Value>),
}

impl Message {
    /// Interpret a JSON request value as a message.
    ///
    /// `null` means no message. Scalars and arrays are published as text of
    /// their JSON form.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Message::Text(text)),
            Value::Object(map) => Some(Message::Structured(map)),
            other => Some(Message::Text(other.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Message::Text(_) => "text",
            Message::Structured(_) => "structured",
        }
    }
}

/// Delivery channel identifiers understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Default,
    Apns,
    ApnsSandbox,
    Gcm,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Default,
        Channel::Apns,
        Channel::ApnsSandbox,
        Channel::Gcm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Default => "default",
            Channel::Apns => "APNS",
            Channel::ApnsSandbox => "APNS_SANDBOX",
            Channel::Gcm => "GCM",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by the APNS and GCM payloads.
#[derive(Debug, Clone, Default, Serialize)]
struct PlatformPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<Value>,
    #[serde(rename = "content-available", skip_serializing_if = "Option::is_none")]
    content_available: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Map<String, Value>>,
}

impl PlatformPayload {
    fn text(text: &str) -> Self {
        Self {
            alert: Some(Value::String(text.to_string())),
            ..Default::default()
        }
    }

    fn structured(message: &Map<String, Value>) -> Self {
        let mut data = message.clone();
        let alert = data.remove(ALERT_KEY);
        let badge = data.remove(BADGE_KEY);
        let sound = data.remove(SOUND_KEY);

        Self {
            alert,
            badge,
            sound,
            content_available: None,
            data: if data.is_empty() { None } else { Some(data) },
        }
    }

    fn apns(mut self, background: bool) -> Value {
        if background {
            self.content_available = Some(1);
        }
        json!({ "aps": self })
    }

    fn gcm(self) -> Value {
        json!({ "data": self })
    }
}

/// Channel -> serialized payload map for a single publish.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEnvelope {
    channels: BTreeMap<Channel, String>,
}

impl MessageEnvelope {
    pub fn build(message: &Message) -> Self {
        let (default, payload, background) = match message {
            Message::Text(text) => (text.clone(), PlatformPayload::text(text), false),
            Message::Structured(map) => {
                let default = match map.get(ALERT_KEY) {
                    Some(Value::String(alert)) => alert.clone(),
                    _ => Value::Object(map.clone()).to_string(),
                };
                (default, PlatformPayload::structured(map), true)
            }
        };

        let apns = payload.clone().apns(background).to_string();
        let gcm = payload.gcm().to_string();

        let mut channels = BTreeMap::new();
        channels.insert(Channel::Default, default);
        channels.insert(Channel::Apns, apns.clone());
        channels.insert(Channel::ApnsSandbox, apns);
        channels.insert(Channel::Gcm, gcm);

        Self { channels }
    }

    /// Serialized payload for one channel.
    pub fn get(&self, channel: Channel) -> Option<&str> {
        self.channels.get(&channel).map(String::as_str)
    }

    /// Parsed payload for one channel. The `default` channel parses only when
    /// it happens to hold JSON.
    pub fn get_json(&self, channel: Channel) -> Option<Value> {
        self.get(channel)
            .and_then(|payload| serde_json::from_str(payload).ok())
    }

    pub fn channels(&self) -> impl Iterator<Item = (Channel, &str)> {
        self.channels
            .iter()
            .map(|(channel, payload)| (*channel, payload.as_str()))
    }

    /// The provider wire form: a JSON object of channel -> payload string.
    pub fn to_message(&self) -> String {
        let map: Map<String, Value> = self
            .channels()
            .map(|(channel, payload)| (channel.as_str().to_string(), Value::String(payload.to_string())))
            .collect();
        Value::Object(map).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured(value: Value) -> Message {
        Message::from_value(value).unwrap()
    }

    #[test]
    fn test_plain_text_envelope() {
        let envelope = MessageEnvelope::build(&Message::Text("hello".to_string()));

        assert_eq!(envelope.get(Channel::Default), Some("hello"));

        let apns = envelope.get_json(Channel::Apns).unwrap();
        assert_eq!(apns, json!({"aps": {"alert": "hello"}}));
        assert_eq!(envelope.get(Channel::Apns), envelope.get(Channel::ApnsSandbox));

        let gcm = envelope.get_json(Channel::Gcm).unwrap();
        assert_eq!(gcm["data"]["alert"], "hello");
    }

    #[test]
    fn test_structured_message_lifts_alert() {
        let envelope = MessageEnvelope::build(&structured(json!({"alert": "hi", "custom": 1})));

        let apns = envelope.get_json(Channel::Apns).unwrap();
        assert_eq!(apns["aps"]["alert"], "hi");
        assert_eq!(apns["aps"]["data"], json!({"custom": 1}));
        assert_eq!(apns["aps"]["content-available"], 1);
        assert!(apns["aps"]["data"].get("alert").is_none());

        let gcm = envelope.get_json(Channel::Gcm).unwrap();
        assert_eq!(gcm["data"]["alert"], "hi");
        assert_eq!(gcm["data"]["data"], json!({"custom": 1}));
        assert!(gcm["data"].get("content-available").is_none());

        assert_eq!(envelope.get(Channel::Default), Some("hi"));
    }

    #[test]
    fn test_structured_message_badge_and_sound() {
        let envelope = MessageEnvelope::build(&structured(json!({
            "alert": "Touchdown",
            "badge": 3,
            "sound": "whistle.caf"
        })));

        let apns = envelope.get_json(Channel::ApnsSandbox).unwrap();
        assert_eq!(apns["aps"]["badge"], 3);
        assert_eq!(apns["aps"]["sound"], "whistle.caf");
        // Nothing left over for data
        assert!(apns["aps"].get("data").is_none());
    }

    #[test]
    fn test_structured_without_alert_defaults_to_json() {
        let message = structured(json!({"someData": "SOME DATA", "otherData": "Other"}));
        let envelope = MessageEnvelope::build(&message);

        let default = envelope.get_json(Channel::Default).unwrap();
        assert_eq!(default["someData"], "SOME DATA");

        let apns = envelope.get_json(Channel::Apns).unwrap();
        assert!(apns["aps"].get("alert").is_none());
        assert_eq!(apns["aps"]["data"]["otherData"], "Other");
    }

    #[test]
    fn test_message_from_value() {
        assert_eq!(Message::from_value(Value::Null), None);
        assert_eq!(
            Message::from_value(json!("hi")),
            Some(Message::Text("hi".to_string()))
        );
        assert_eq!(
            Message::from_value(json!(42)),
            Some(Message::Text("42".to_string()))
        );
        assert_eq!(structured(json!({"a": 1})).kind(), "structured");
    }

    #[test]
    fn test_wire_message_contains_every_channel() {
        let envelope = MessageEnvelope::build(&Message::Text("hello".to_string()));
        let wire: Value = serde_json::from_str(&envelope.to_message()).unwrap();

        for channel in Channel::ALL {
            assert!(wire[channel.as_str()].is_string(), "missing {}", channel);
        }
        assert_eq!(wire["default"], "hello");
    }
}
