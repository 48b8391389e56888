use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the delivery layer knows about the message that carried the script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Input {
    /// Identity of the invoking actor
    #[serde(rename = "senderID")]
    pub sender_id: String,
    /// Identity of the actor being replied to (the `replied` target)
    #[serde(rename = "detectID", default, skip_serializing_if = "Option::is_none")]
    pub detect_id: Option<String>,
    /// Any other named fields, reachable through `%name%` and the `input` command
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Input {
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            ..Self::default()
        }
    }

    pub fn replying_to(mut self, detect_id: impl Into<String>) -> Self {
        self.detect_id = Some(detect_id.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "senderID" => Some(Value::String(self.sender_id.clone())),
            "detectID" => self.detect_id.clone().map(Value::String),
            _ => self.extra.get(name).cloned(),
        }
    }

    /// The input as one JSON object, the shape nested lookups walk through.
    pub fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("senderID".to_string(), Value::String(self.sender_id.clone()));
        if let Some(detect) = &self.detect_id {
            map.insert("detectID".to_string(), Value::String(detect.clone()));
        }
        Value::Object(map)
    }
}
