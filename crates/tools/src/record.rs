//! Shared plumbing for record-writing tools: typed argument parsing and
//! timestamped records.

use chrono::{SecondsFormat, Utc};
use levain_core::error::ToolError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Deserialize keyword arguments into a tool's typed argument struct.
pub(crate) fn parse_args<T: DeserializeOwned>(arguments: Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Serialize typed arguments into a record with a leading `ts` field.
///
/// `tool` names the caller in the error if the arguments do not
/// serialize to an object.
pub(crate) fn stamped<T: Serialize>(tool: &str, args: &T) -> Result<Map<String, Value>, ToolError> {
    let failed = |reason: String| ToolError::ExecutionFailed {
        tool_name: tool.to_string(),
        reason,
    };
    let value = serde_json::to_value(args).map_err(|e| failed(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(failed("record is not a JSON object".into()));
    };

    let mut record = Map::new();
    record.insert(
        "ts".into(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
    );
    record.extend(fields);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Args {
        question: String,
    }

    #[test]
    fn parse_rejects_wrong_types() {
        let mut map = Map::new();
        map.insert("question".into(), Value::from(7));
        let err = parse_args::<Args>(map).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn stamped_record_has_utc_timestamp() {
        let record = stamped(
            "record_feedback",
            &Args {
                question: "vegan croissants?".into(),
            },
        )
        .unwrap();
        assert_eq!(record["question"], "vegan croissants?");
        assert!(record["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn non_object_record_is_an_execution_failure() {
        let err = stamped("record_feedback", &"just a string").unwrap_err();
        match err {
            ToolError::ExecutionFailed { tool_name, reason } => {
                assert_eq!(tool_name, "record_feedback");
                assert!(reason.contains("not a JSON object"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
