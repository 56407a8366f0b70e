//! Status and video URI extraction from an operation body.
//!
//! The response schema has changed between API versions, so the two known
//! paths are tried first and a generic search for a `uri` field is the last
//! resort.

use archviz_types::{OperationError, OperationStatus};
use serde_json::Value;

const LEGACY_URI_PATH: &str = "/response/generateVideoResponse/generatedSamples/0/video/uri";
const CURRENT_URI_PATH: &str = "/response/generatedVideos/0/video/uri";

/// Classify a parsed operation body.
///
/// `done` false or missing is `Pending`. A completed operation with an `error`
/// object is `Failed`; one with no URI anywhere is `DataShape`.
pub fn operation_status(body: &Value) -> Result<OperationStatus, OperationError> {
    let done = body.get("done").and_then(Value::as_bool).unwrap_or(false);
    if !done {
        return Ok(OperationStatus::Pending);
    }
    if let Some(err) = body.get("error").filter(|e| e.is_object()) {
        return Err(OperationError::Failed {
            code: err.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }
    extract_video_uri(body)
        .map(|uri| OperationStatus::Done { uri })
        .ok_or_else(|| {
            OperationError::DataShape("operation is done but no video uri was found".to_string())
        })
}

/// Video URI from a completed operation body, trying known schemas before the generic search.
pub fn extract_video_uri(body: &Value) -> Option<String> {
    [LEGACY_URI_PATH, CURRENT_URI_PATH]
        .iter()
        .find_map(|path| body.pointer(path).and_then(Value::as_str))
        .or_else(|| find_first_string(body, &|key| key == "uri"))
        .map(String::from)
}

/// First string value whose key matches `is_target`, depth-first pre-order.
///
/// Object entries are visited in insertion order; each entry's own key is
/// checked before descending into its value. Array items are visited in order.
pub fn find_first_string<'a>(value: &'a Value, is_target: &dyn Fn(&str) -> bool) -> Option<&'a str> {
    match value {
        Value::Object(map) => map.iter().find_map(|(k, v)| match v {
            Value::String(s) if is_target(k) => Some(s.as_str()),
            _ => find_first_string(v, is_target),
        }),
        Value::Array(items) => items.iter().find_map(|v| find_first_string(v, is_target)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_done_is_pending() {
        assert_eq!(operation_status(&json!({ "done": false })).unwrap(), OperationStatus::Pending);
        assert_eq!(
            operation_status(&json!({ "name": "models/veo/operations/1" })).unwrap(),
            OperationStatus::Pending
        );
    }

    #[test]
    fn legacy_schema() {
        let body = json!({
            "done": true,
            "response": { "generateVideoResponse": { "generatedSamples": [ { "video": { "uri": "https://x/1" } } ] } }
        });
        assert_eq!(
            operation_status(&body).unwrap(),
            OperationStatus::Done { uri: "https://x/1".into() }
        );
    }

    #[test]
    fn current_schema() {
        let body = json!({
            "done": true,
            "response": { "generatedVideos": [ { "video": { "uri": "https://x/2" } } ] }
        });
        assert_eq!(extract_video_uri(&body).as_deref(), Some("https://x/2"));
    }

    #[test]
    fn generic_search_fallback() {
        let body = json!({ "done": true, "response": { "nested": { "deep": { "uri": "https://x/3" } } } });
        assert_eq!(extract_video_uri(&body).as_deref(), Some("https://x/3"));
    }

    #[test]
    fn known_path_wins_over_earlier_generic_match() {
        let body = json!({
            "done": true,
            "metadata": { "uri": "https://wrong" },
            "response": { "generatedVideos": [ { "video": { "uri": "https://x/2" } } ] }
        });
        assert_eq!(extract_video_uri(&body).as_deref(), Some("https://x/2"));
    }

    #[test]
    fn empty_response_is_data_shape() {
        let err = operation_status(&json!({ "done": true, "response": {} })).unwrap_err();
        assert!(matches!(err, OperationError::DataShape(_)));
    }

    #[test]
    fn done_with_error_object_is_failed() {
        let body = json!({ "done": true, "error": { "code": 3, "message": "blocked by safety filter" } });
        match operation_status(&body).unwrap_err() {
            OperationError::Failed { code, message } => {
                assert_eq!(code, 3);
                assert_eq!(message, "blocked by safety filter");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn search_is_preorder_in_insertion_order() {
        let body: Value = serde_json::from_str(
            r#"{"a": {"b": [{"c": 1}, {"uri": "first"}]}, "uri": "second"}"#,
        )
        .unwrap();
        assert_eq!(find_first_string(&body, &|k| k == "uri"), Some("first"));
    }

    #[test]
    fn search_skips_non_string_matches() {
        let body = json!({ "uri": { "uri": 5 }, "x": [ { "uri": "ok" } ] });
        assert_eq!(find_first_string(&body, &|k| k == "uri"), Some("ok"));
    }
}
