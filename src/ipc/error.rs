use crate::errors::Error;
use serde_json::{Value, json};
use tracing::{debug, error};

/// Successful response for request `id`.
#[must_use]
pub fn ok(id: &str, result: Value) -> Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

/// Failed response for request `id`.
#[must_use]
pub fn err(id: &str, code: &str, message: impl Into<String>) -> Value {
    json!({
        "id": id,
        "ok": false,
        "error": {
            "code": code,
            "message": message.into(),
        },
    })
}

/// Turns a handler outcome into a response.
pub(crate) fn respond(id: &str, result: Result<Value, Error>) -> Value {
    match result {
        Ok(value) => ok(id, value),
        Err(e) => {
            if e.is_transient() {
                error!("Request {} failed: {}", id, e);
            } else {
                debug!("Request {} rejected: {}", id, e);
            }
            err(id, e.code(), e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respond_maps_error_code() {
        let resp = respond("7", Err(Error::InvalidCredentials));
        assert_eq!(resp["id"], "7");
        assert_eq!(resp["ok"], false);
        assert_eq!(resp["error"]["code"], "invalid_credentials");

        let resp = respond("8", Ok(json!({ "n": 1 })));
        assert_eq!(resp["ok"], true);
        assert_eq!(resp["result"]["n"], 1);
    }
}
