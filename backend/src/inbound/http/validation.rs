//! Shared validation helpers for the HTTP adapter.

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

pub(crate) fn invalid_user_id_error(value: &str) -> Error {
    Error::invalid_request("userId must be a valid UUID").with_details(json!({
        "field": "userId",
        "value": value,
        "code": "invalid_uuid",
    }))
}

pub(crate) fn parse_user_id(raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|_| invalid_user_id_error(raw))
}

pub(crate) fn missing_payload_error() -> Error {
    Error::invalid_request("request body is missing or malformed").with_details(json!({
        "code": "missing_payload",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn malformed_identifiers_are_bad_requests() {
        let err = parse_user_id("not-a-uuid").expect_err("invalid id");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err
            .details()
            .and_then(|value| value.as_object())
            .expect("details present");
        assert_eq!(details.get("field").and_then(|v| v.as_str()), Some("userId"));
    }

    #[test]
    fn well_formed_identifiers_parse() {
        parse_user_id("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
    }
}
