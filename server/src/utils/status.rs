use axum::http::StatusCode;

/// Maps a command error code to the HTTP status returned to the client.
///
/// Rules are checked in order and the first match wins. Codes that match no
/// rule fall back to `400 Bad Request`.
pub fn status_for_error_code(code: &str) -> StatusCode {
    if code == "VALIDATION_ERROR" || code.starts_with("INVALID_") {
        return StatusCode::BAD_REQUEST;
    }

    if code == "AUTHORIZATION_ERROR" || code == "UNAUTHORIZED" {
        return StatusCode::FORBIDDEN;
    }

    if code == "NOT_FOUND" || code.ends_with("_NOT_FOUND") {
        return StatusCode::NOT_FOUND;
    }

    if code == "CONFLICT" || code.starts_with("DUPLICATE_") || code.starts_with("ALREADY_") {
        return StatusCode::CONFLICT;
    }

    StatusCode::BAD_REQUEST
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::codes;

    #[test]
    fn test_known_codes() {
        assert_eq!(status_for_error_code("VALIDATION_ERROR"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_error_code("EVENT_NOT_FOUND"), StatusCode::NOT_FOUND);
        assert_eq!(status_for_error_code("DUPLICATE_TICKET_NAME"), StatusCode::CONFLICT);
        assert_eq!(status_for_error_code("ALREADY_PUBLISHED"), StatusCode::CONFLICT);
        assert_eq!(status_for_error_code("UNAUTHORIZED"), StatusCode::FORBIDDEN);
        assert_eq!(status_for_error_code("AUTHORIZATION_ERROR"), StatusCode::FORBIDDEN);
        assert_eq!(status_for_error_code("NOT_FOUND"), StatusCode::NOT_FOUND);
        assert_eq!(status_for_error_code("CONFLICT"), StatusCode::CONFLICT);
        assert_eq!(status_for_error_code("INVALID_QUANTITY"), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_codes_fall_back_to_bad_request() {
        assert_eq!(status_for_error_code("WEIRD_CODE"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_error_code(""), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_error_code("not_found"), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // Prefix rule for INVALID_ is checked before the _NOT_FOUND suffix rule.
        assert_eq!(status_for_error_code("INVALID_NOT_FOUND"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_error_code("DUPLICATE_NOT_FOUND"), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_command_codes_have_expected_statuses() {
        let expected = [
            (codes::VALIDATION_ERROR, StatusCode::BAD_REQUEST),
            (codes::UNAUTHORIZED, StatusCode::FORBIDDEN),
            (codes::EVENT_NOT_FOUND, StatusCode::NOT_FOUND),
            (codes::TICKET_TYPE_NOT_FOUND, StatusCode::NOT_FOUND),
            (codes::REGISTRATION_NOT_FOUND, StatusCode::NOT_FOUND),
            (codes::DUPLICATE_TICKET_NAME, StatusCode::CONFLICT),
            (codes::INVALID_EVENT_STATUS, StatusCode::BAD_REQUEST),
            (codes::INVALID_QUANTITY, StatusCode::BAD_REQUEST),
            (codes::INVALID_REGISTRATION_STATUS, StatusCode::BAD_REQUEST),
            (codes::ALREADY_CHECKED_IN, StatusCode::CONFLICT),
        ];
        for (code, status) in expected {
            assert_eq!(status_for_error_code(code), status, "code {code}");
        }
    }
}
