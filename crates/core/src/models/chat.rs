//! Assistant replies relayed from the chatbot endpoint.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::wire::{WireError, WireNaming, WireReader, WireRecord, WireWriter, timestamp_value};

pub mod fields {
    use crate::wire::Field;

    pub const RESPONSE: Field = Field::new("response", "Response");
    pub const DATA: Field = Field::new("data", "Data");
    pub const TIMESTAMP: Field = Field::new("timestamp", "Timestamp");
    pub const KIND: Field = Field::new("type", "Type");
}

/// A reply from the server-side assistant.
///
/// `data` is whatever structured payload the server attached (for example a
/// product list) and is passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub data: Option<Value>,
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: String,
}

impl WireRecord for ChatReply {
    fn from_wire(value: &Value) -> Result<Self, WireError> {
        let r = WireReader::new("chatbot", value)?;
        Ok(Self {
            response: r.required_string(fields::RESPONSE)?,
            data: r.lookup(fields::DATA).cloned(),
            timestamp: r.optional_timestamp(fields::TIMESTAMP)?,
            kind: r.optional_string(fields::KIND)?.unwrap_or_else(|| "text".to_owned()),
        })
    }

    fn to_wire(&self, naming: WireNaming) -> Value {
        WireWriter::new(naming)
            .put(fields::RESPONSE, self.response.clone())
            .put_opt(fields::DATA, self.data.clone())
            .put_opt(fields::TIMESTAMP, self.timestamp.map(timestamp_value))
            .put(fields::KIND, self.kind.clone())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decodes_reply_with_data() {
        let wire = json!({
            "response": "You sold 3 items today.",
            "data": {"count": 3},
            "timestamp": "2024-05-03T18:00:00Z",
            "type": "sales_summary"
        });
        let reply = ChatReply::from_wire(&wire).unwrap();
        assert_eq!(reply.kind, "sales_summary");
        assert_eq!(reply.data, Some(json!({"count": 3})));
        assert_eq!(ChatReply::from_wire(&reply.to_wire(WireNaming::Capitalized)).unwrap(), reply);
    }

    #[test]
    fn test_kind_defaults_to_text() {
        let reply = ChatReply::from_wire(&json!({"response": "hi"})).unwrap();
        assert_eq!(reply.kind, "text");
        assert_eq!(reply.timestamp, None);
    }
}
