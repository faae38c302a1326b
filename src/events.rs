use std::sync::Arc;

use serde_json::{Map, Value, json};

pub const HANDSHAKE_MESSAGE: &str = "Connected to product updates";

/// Set on records that wrap a non-object payload under `payload`.
pub const WRAPPED_MARKER: &str = "payloadWrapped";

/// One product change as broadcast to clients and kept for catch-up.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEvent {
    payload: Value,
    timestamp_ms: Option<i64>,
}

impl UpdateEvent {
    pub fn new(payload: Value) -> Self {
        Self::at(payload, chrono::Utc::now().timestamp_millis())
    }

    pub fn at(payload: Value, timestamp_ms: i64) -> Self {
        Self {
            payload,
            timestamp_ms: Some(timestamp_ms),
        }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// `None` for records written without an integer `timestamp`.
    pub fn timestamp_ms(&self) -> Option<i64> {
        self.timestamp_ms
    }

    /// Object payloads gain a `timestamp` field. Anything else is wrapped under
    /// `payload` next to the timestamp and [`WRAPPED_MARKER`].
    pub fn to_json(&self) -> Value {
        let Some(timestamp_ms) = self.timestamp_ms else {
            return self.payload.clone();
        };

        match &self.payload {
            Value::Object(fields) => {
                let mut fields = fields.clone();
                fields.insert("timestamp".to_string(), json!(timestamp_ms));
                Value::Object(fields)
            }
            other => json!({
                "payload": other,
                WRAPPED_MARKER: true,
                "timestamp": timestamp_ms,
            }),
        }
    }

    /// Accepts any JSON value. Records that did not come from [`Self::to_json`]
    /// keep their shape and carry no timestamp.
    pub fn from_json(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::untimed(value);
        };

        let Some(timestamp_ms) = fields.get("timestamp").and_then(Value::as_i64) else {
            return Self::untimed(Value::Object(fields));
        };
        fields.remove("timestamp");

        let payload = match unwrap_payload(&mut fields) {
            Some(wrapped) => wrapped,
            None => Value::Object(fields),
        };

        Self::at(payload, timestamp_ms)
    }

    fn untimed(payload: Value) -> Self {
        Self {
            payload,
            timestamp_ms: None,
        }
    }
}

fn unwrap_payload(fields: &mut Map<String, Value>) -> Option<Value> {
    let marked = fields.len() == 2 && fields.get(WRAPPED_MARKER) == Some(&Value::Bool(true));
    if !marked {
        return None;
    }

    match fields.remove("payload") {
        Some(payload) if !payload.is_object() => Some(payload),
        Some(payload) => {
            fields.insert("payload".to_string(), payload);
            None
        }
        None => None,
    }
}

/// What an SSE client can receive.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Connected,
    Update(Arc<UpdateEvent>),
}

impl StreamEvent {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Connected => json!({ "type": "connection", "message": HANDSHAKE_MESSAGE }),
            Self::Update(update) => update.to_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_payload_is_flattened_with_timestamp() {
        let event = UpdateEvent::at(json!({"type": "stock_change", "productId": "p1"}), 42);

        assert_eq!(
            event.to_json(),
            json!({"type": "stock_change", "productId": "p1", "timestamp": 42})
        );
        assert_eq!(UpdateEvent::from_json(event.to_json()), event);
    }

    #[test]
    fn scalar_payload_is_wrapped_with_marker() {
        let event = UpdateEvent::at(json!("refresh"), 7);

        assert_eq!(
            event.to_json(),
            json!({"payload": "refresh", "payloadWrapped": true, "timestamp": 7})
        );
        assert_eq!(UpdateEvent::from_json(event.to_json()), event);
    }

    #[test]
    fn object_with_payload_field_keeps_it() {
        for payload in [json!({"payload": {"a": 1}}), json!({"payload": 5})] {
            let event = UpdateEvent::at(payload.clone(), 9);

            let decoded = UpdateEvent::from_json(event.to_json());
            assert_eq!(decoded.payload(), &payload);
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn records_without_timestamp_are_kept_as_is() {
        for record in [
            json!({"type": "stock_change"}),
            json!([1, 2]),
            json!("refresh"),
            json!({"timestamp": "yesterday"}),
            json!({"payload": 5, "payloadWrapped": true}),
        ] {
            let event = UpdateEvent::from_json(record.clone());

            assert_eq!(event.timestamp_ms(), None);
            assert_eq!(event.payload(), &record);
            assert_eq!(event.to_json(), record);
        }
    }

    #[test]
    fn handshake_shape() {
        assert_eq!(
            StreamEvent::Connected.to_json(),
            json!({"type": "connection", "message": "Connected to product updates"})
        );
    }
}
