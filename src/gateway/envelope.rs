// src/gateway/envelope.rs
use serde::Deserialize;

use crate::errors::{GatePassError, GatePassResult};

/// ✅ **Uniform response envelope of the gate-pass backend**
///
/// Every endpoint wraps its payload in this shape; the client unwraps it and
/// converts an unsuccessful envelope into a `Backend` error carrying the
/// backend's own message.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    #[allow(dead_code)]
    pub timestamp: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, failing with the backend's message when the call
    /// was not successful or the envelope carried no data.
    pub fn into_data(self) -> GatePassResult<T> {
        if !self.success {
            return Err(self.into_error());
        }
        let status_code = self.status_code;
        self.data.ok_or_else(|| {
            GatePassError::backend(status_code, "Backend envelope carried no data")
        })
    }

    /// Acknowledge a data-less call (approve, reassign, mail…).
    pub fn ack(self) -> GatePassResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    fn into_error(self) -> GatePassError {
        let message = match self.errors {
            Some(detail) => format!("{} ({detail})", self.message),
            None => self.message,
        };
        GatePassError::backend(self.status_code, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_successful_envelope() {
        let envelope: ApiEnvelope<Vec<i32>> = serde_json::from_str(
            r#"{"success":true,"status_code":200,"message":"OK","timestamp":"2026-01-01T00:00:00Z","data":[1,2,3]}"#,
        )
        .unwrap();
        assert_eq!(envelope.into_data().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn failure_carries_backend_message() {
        let envelope: ApiEnvelope<Vec<i32>> = serde_json::from_str(
            r#"{"success":false,"status_code":409,"message":"Duplicate request already pending"}"#,
        )
        .unwrap();
        let err = envelope.into_data().unwrap_err();
        assert!(err.to_string().contains("Duplicate request already pending"));
    }

    #[test]
    fn success_without_data_is_an_error_for_data_calls() {
        let envelope: ApiEnvelope<i32> =
            serde_json::from_str(r#"{"success":true,"status_code":200,"message":"OK"}"#).unwrap();
        assert!(envelope.into_data().is_err());
    }
}
