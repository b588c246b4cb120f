//! Masking of sensitive values and generic error messages

use tracing::debug;

use crate::error::ApiError;
use crate::output::Printable;

/// Mask a secret for logging
///
/// Values shorter than eight characters are masked entirely; longer values
/// keep their first four characters.
pub fn mask_sensitive_string(value: Option<&str>) -> Option<String> {
    let value = value?;
    let len = value.chars().count();
    if len < 8 {
        return Some("*".repeat(len));
    }

    let header: String = value.chars().take(4).collect();
    Some(format!("{}{}", header, "*".repeat(len - 4)))
}

/// Same as [`mask_sensitive_string`] for values that are always present
pub fn mask(value: &str) -> String {
    mask_sensitive_string(Some(value)).unwrap_or_default()
}

/// Generic user-facing message for an error no classifier handled
pub fn generic_message(err: &ApiError) -> String {
    debug!(?err, "generic_message: called");
    let base = match err {
        ApiError::BadRequest(_) => "Error: Bad request.".to_string(),
        ApiError::Unauthorized(_) => "Error: Unauthorized.".to_string(),
        ApiError::Forbidden(_) => "Error: Forbidden.".to_string(),
        ApiError::NotFound(_) => "Error: Not found.".to_string(),
        ApiError::InvalidResponse(_) => "Error: Invalid response from server.".to_string(),
        ApiError::Service { status, .. } => format!("Error: Service error (status {}).", status),
        ApiError::Unknown(detail) => {
            let detail = detail.trim();
            if detail.is_empty() {
                return "Error: Unknown error.".to_string();
            }
            return format!("Error: {}", detail);
        }
    };

    let detail = err.detail().trim();
    if detail.is_empty() {
        base
    } else {
        format!("{}: {}", base.trim_end_matches('.'), detail)
    }
}

/// Classifier that turns a not-found failure into `message`
pub fn on_not_found(message: &'static str) -> impl Fn(&ApiError) -> Option<Printable> {
    move |err| err.is_not_found().then(|| Printable::error(message))
}

/// Split a comma separated list, dropping blank entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mask_none() {
        assert_eq!(mask_sensitive_string(None), None);
    }

    #[test]
    fn test_mask_short_values_fully() {
        assert_eq!(mask_sensitive_string(Some("abc")), Some("***".to_string()));
        assert_eq!(mask_sensitive_string(Some("1234567")), Some("*******".to_string()));
        assert_eq!(mask_sensitive_string(Some("")), Some(String::new()));
    }

    #[test]
    fn test_mask_keeps_header() {
        assert_eq!(mask_sensitive_string(Some("12345678")), Some("1234****".to_string()));
        assert_eq!(mask("sk-abcdefghij"), "sk-a*********");
    }

    #[test]
    fn test_generic_message_table() {
        assert_eq!(
            generic_message(&ApiError::NotFound(String::new())),
            "Error: Not found."
        );
        assert_eq!(
            generic_message(&ApiError::Forbidden(String::new())),
            "Error: Forbidden."
        );
        assert_eq!(
            generic_message(&ApiError::BadRequest("collection_id is required".to_string())),
            "Error: Bad request: collection_id is required"
        );
        assert_eq!(
            generic_message(&ApiError::Service {
                status: 502,
                message: String::new()
            }),
            "Error: Service error (status 502)."
        );
    }

    #[test]
    fn test_generic_message_uses_own_detail() {
        let message = generic_message(&ApiError::Unknown("boom".to_string()));
        assert_eq!(message, "Error: boom");
        assert!(!message.contains("Unknown error."));
    }

    #[test]
    fn test_generic_message_unknown_without_detail() {
        assert_eq!(
            generic_message(&ApiError::Unknown("  ".to_string())),
            "Error: Unknown error."
        );
    }

    #[test]
    fn test_on_not_found() {
        let classify = on_not_found("Collection not found.");

        let printable = classify(&ApiError::NotFound("nope".to_string())).unwrap();
        assert_eq!(printable.content, Some(json!("Collection not found.")));

        assert!(classify(&ApiError::Forbidden(String::new())).is_none());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("1, 2,3 ,, 4"), vec!["1", "2", "3", "4"]);
        assert!(split_list(" , ").is_empty());
    }
}
