//! Request envelope
//!
//! Every request body is wrapped as `{ "data": { ... } }`.

use serde::{Deserialize, Serialize};

/// `{ "data": T }` request wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let body = DataEnvelope::new(serde_json::json!({ "status": "seated" }));
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"data":{"status":"seated"}}"#
        );
    }
}
