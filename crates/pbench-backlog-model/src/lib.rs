// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Data model shared by the backlog pipeline.
//!
//! The report side mirrors what the inspection tool prints: a loosely typed
//! JSON document whose per-case records are plain string-keyed maps. The
//! backlog side is fixed-shape and serializes straight to TOML.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Conclusion value marking a failed case.
pub const DRAMATIC_REGRESSION: &str = "Dramatic Regression";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidReportId {
        value: String,
        reason: &'static str,
    },
    UnsupportedParameter {
        case_id: String,
        field: &'static str,
        kind: &'static str,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidReportId { value, reason } => {
                write!(f, "invalid report id `{value}`: {reason}")
            }
            Self::UnsupportedParameter {
                case_id,
                field,
                kind,
            } => write!(
                f,
                "case {case_id}: field `{field}` holds an unsupported JSON {kind}"
            ),
        }
    }
}

impl std::error::Error for ModelError {}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportId(String);

impl ReportId {
    pub fn parse(value: &str) -> Result<Self, ModelError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidReportId {
                value: value.to_string(),
                reason: "must not be empty",
            });
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(ModelError::InvalidReportId {
                value: value.to_string(),
                reason: "must not contain whitespace or control characters",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top-level document printed by `benchmark-inspect --get-statistics true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    #[serde(default, deserialize_with = "statistics_object")]
    pub statistics: Option<Statistics>,
}

/// Accepts a JSON object or null, never a positional array.
fn statistics_object<'de, D>(deserializer: D) -> Result<Option<Statistics>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(fields) = Option::<Map<String, Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    serde_json::from_value(Value::Object(fields))
        .map(Some)
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub benchmark: Option<Vec<TestCaseRecord>>,
}

impl Statistics {
    /// Per-case records; an absent or null `benchmark` list reads as empty.
    #[must_use]
    pub fn records(&self) -> &[TestCaseRecord] {
        self.benchmark.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCaseSchema {
    /// pbench-fio runs, recognised by the `RW` column.
    FioParams,
    /// pbench-uperf runs, recognised by an empty-string column.
    UperfParams,
    Unknown,
}

impl TestCaseSchema {
    #[must_use]
    pub fn detect(record: &TestCaseRecord) -> Self {
        if record.contains("RW") {
            Self::FioParams
        } else if record.contains("") {
            Self::UperfParams
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FioParams => "fio_params",
            Self::UperfParams => "uperf_params",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TestCaseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCaseRecord(Map<String, Value>);

impl TestCaseRecord {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn conclusion(&self) -> Option<&str> {
        self.field("Conclusion").and_then(Value::as_str)
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.conclusion() == Some(DRAMATIC_REGRESSION)
    }

    #[must_use]
    pub fn schema(&self) -> TestCaseSchema {
        TestCaseSchema::detect(self)
    }

    /// `CaseID` rendered for log lines and error messages.
    #[must_use]
    pub fn case_label(&self) -> String {
        match self.field("CaseID") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => "<unknown>".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// Scalar carried from a report column into the backlog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// `Ok(None)` for JSON null; `Err` names the JSON kind that has no scalar form.
    pub fn from_json(value: &Value) -> Result<Option<Self>, &'static str> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(v) => Ok(Some(Self::Bool(*v))),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(Some(Self::Integer(v)))
                } else if n.is_u64() {
                    Err("integer beyond the i64 range")
                } else {
                    n.as_f64().map(|v| Some(Self::Float(v))).ok_or("number")
                }
            }
            Value::String(v) => Ok(Some(Self::Text(v.clone()))),
            Value::Array(_) => Err("array"),
            Value::Object(_) => Err("object"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// One backlog entry: the parameters needed to re-run a failed case.
///
/// Every field is optional because the source columns may be missing or
/// null, and TOML has no null to write in their place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestoredCase {
    #[serde(rename = "CASE_ID", default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<ParamValue>,
    #[serde(rename = "test-types", default, skip_serializing_if = "Option::is_none")]
    pub test_types: Option<ParamValue>,
    #[serde(rename = "block-sizes", default, skip_serializing_if = "Option::is_none")]
    pub block_sizes: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iodepth: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numjobs: Option<ParamValue>,
}

impl RestoredCase {
    /// An entry with no parameters, as emitted for uperf cases in legacy mode.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backlog {
    pub testcases: Vec<RestoredCase>,
}

impl Backlog {
    #[must_use]
    pub fn new(testcases: Vec<RestoredCase>) -> Self {
        Self { testcases }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.testcases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.testcases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> TestCaseRecord {
        serde_json::from_value(value).expect("record")
    }

    #[test]
    fn report_id_rejects_blank_and_whitespace() {
        assert!(ReportId::parse("").is_err());
        assert!(ReportId::parse("   ").is_err());
        assert!(matches!(
            ReportId::parse("a b"),
            Err(ModelError::InvalidReportId { .. })
        ));
        let id = ReportId::parse(" benchmark_20210301 ").expect("id");
        assert_eq!(id.as_str(), "benchmark_20210301");
    }

    #[test]
    fn schema_detection_prefers_fio_column() {
        let fio = record(json!({"CaseID": "c1", "RW": "read", "": "x"}));
        let uperf = record(json!({"CaseID": "c2", "": "stream"}));
        let other = record(json!({"CaseID": "c3", "Conclusion": "No Difference"}));
        assert_eq!(fio.schema(), TestCaseSchema::FioParams);
        assert_eq!(uperf.schema(), TestCaseSchema::UperfParams);
        assert_eq!(other.schema(), TestCaseSchema::Unknown);
    }

    #[test]
    fn failure_predicate_is_exact_match() {
        assert!(record(json!({"Conclusion": "Dramatic Regression"})).is_failed());
        assert!(!record(json!({"Conclusion": "dramatic regression"})).is_failed());
        assert!(!record(json!({"Conclusion": "Dramatic Improvement"})).is_failed());
        assert!(!record(json!({"Conclusion": null})).is_failed());
        assert!(!record(json!({})).is_failed());
    }

    #[test]
    fn absent_or_null_benchmark_reads_as_empty() {
        let report: BenchmarkReport =
            serde_json::from_value(json!({"statistics": {}})).expect("report");
        assert!(report.statistics.expect("statistics").records().is_empty());

        let report: BenchmarkReport =
            serde_json::from_value(json!({"statistics": {"benchmark": null}})).expect("report");
        assert!(report.statistics.expect("statistics").records().is_empty());

        let report: BenchmarkReport =
            serde_json::from_value(json!({"id": "r1", "statistics": null})).expect("report");
        assert!(report.statistics.is_none());
    }

    #[test]
    fn statistics_must_be_an_object() {
        let positional = serde_json::from_value::<BenchmarkReport>(json!({
            "statistics": [[{"CaseID": "c1", "Conclusion": "Dramatic Regression", "RW": "read"}]]
        }));
        assert!(positional.is_err());
        assert!(serde_json::from_value::<BenchmarkReport>(json!({"statistics": "on"})).is_err());
    }

    #[test]
    fn param_value_keeps_json_scalar_types() {
        assert_eq!(ParamValue::from_json(&json!(4)), Ok(Some(ParamValue::Integer(4))));
        assert_eq!(
            ParamValue::from_json(&json!("4k")),
            Ok(Some(ParamValue::Text("4k".to_string())))
        );
        assert_eq!(ParamValue::from_json(&json!(1.5)), Ok(Some(ParamValue::Float(1.5))));
        assert_eq!(ParamValue::from_json(&json!(null)), Ok(None));
        assert_eq!(ParamValue::from_json(&json!([1])), Err("array"));
        assert_eq!(ParamValue::from_json(&json!({"a": 1})), Err("object"));
        assert_eq!(
            ParamValue::from_json(&json!(u64::MAX)),
            Err("integer beyond the i64 range")
        );
        assert_eq!(
            ParamValue::from_json(&json!(i64::MAX)),
            Ok(Some(ParamValue::Integer(i64::MAX)))
        );
    }

    #[test]
    fn backlog_serializes_with_legacy_key_names() {
        let backlog = Backlog::new(vec![RestoredCase {
            case_id: Some("c1".into()),
            test_types: Some("read".into()),
            block_sizes: Some("4k".into()),
            iodepth: Some(4.into()),
            numjobs: Some(2.into()),
        }]);
        let text = toml::to_string(&backlog).expect("toml");
        assert!(text.contains("[[testcases]]"));
        assert!(text.contains("CASE_ID = \"c1\""));
        assert!(text.contains("test-types = \"read\""));
        assert!(text.contains("block-sizes = \"4k\""));
        assert!(text.contains("iodepth = 4"));
        assert!(text.contains("numjobs = 2"));

        let parsed: Backlog = toml::from_str(&text).expect("parse back");
        assert_eq!(parsed, backlog);
    }

    #[test]
    fn placeholder_has_no_fields() {
        let case = RestoredCase::placeholder();
        assert!(case.is_placeholder());
        let text = toml::to_string(&Backlog::new(vec![case])).expect("toml");
        assert_eq!(text.trim(), "[[testcases]]");
    }
}
