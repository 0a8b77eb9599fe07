// SPDX-License-Identifier: Apache-2.0

use pbench_backlog_model::{ModelError, ParamValue, RestoredCase, TestCaseRecord, TestCaseSchema};
use tracing::{debug, info, warn};

use crate::error::{BacklogError, Result};

/// What to do with uperf records, whose parameters cannot be restored yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UperfPolicy {
    #[default]
    Reject,
    /// Emit an empty backlog entry, as older tooling did.
    Placeholder,
}

pub fn restore_case(record: &TestCaseRecord, policy: UperfPolicy) -> Result<RestoredCase> {
    match record.schema() {
        TestCaseSchema::FioParams => restore_fio(record),
        TestCaseSchema::UperfParams => match policy {
            UperfPolicy::Reject => Err(BacklogError::UnimplementedSchema {
                case_id: record.case_label(),
                schema: TestCaseSchema::UperfParams,
            }),
            UperfPolicy::Placeholder => {
                warn!(
                    case_id = %record.case_label(),
                    "uperf parameters are not restorable, writing an empty entry"
                );
                Ok(RestoredCase::placeholder())
            }
        },
        TestCaseSchema::Unknown => Err(BacklogError::UnrecognizedSchema {
            case_id: record.case_label(),
        }),
    }
}

pub fn restore_parameters(
    records: &[&TestCaseRecord],
    policy: UperfPolicy,
) -> Result<Vec<RestoredCase>> {
    info!("restoring test parameters");
    let mut restored = Vec::with_capacity(records.len());
    for record in records {
        let case = restore_case(record, policy)?;
        debug!(?case, "restored case");
        restored.push(case);
    }
    info!(restored = restored.len(), "restored {} failure case(s)", restored.len());
    Ok(restored)
}

fn restore_fio(record: &TestCaseRecord) -> Result<RestoredCase> {
    Ok(RestoredCase {
        case_id: column(record, "CaseID")?,
        test_types: column(record, "RW")?,
        block_sizes: column(record, "BS")?,
        iodepth: column(record, "IOdepth")?,
        numjobs: column(record, "Numjobs")?,
    })
}

fn column(record: &TestCaseRecord, field: &'static str) -> Result<Option<ParamValue>> {
    let Some(value) = record.field(field) else {
        return Ok(None);
    };
    ParamValue::from_json(value).map_err(|kind| {
        BacklogError::UnsupportedParameter(ModelError::UnsupportedParameter {
            case_id: record.case_label(),
            field,
            kind,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> TestCaseRecord {
        serde_json::from_value(value).expect("record")
    }

    #[test]
    fn fio_record_maps_to_legacy_parameter_names() {
        let case = restore_case(
            &record(json!({
                "CaseID": "c1",
                "Conclusion": "Dramatic Regression",
                "RW": "read",
                "BS": "4k",
                "IOdepth": 4,
                "Numjobs": 2,
                "BW": 123.4
            })),
            UperfPolicy::Reject,
        )
        .expect("restore");
        assert_eq!(
            case,
            RestoredCase {
                case_id: Some("c1".into()),
                test_types: Some("read".into()),
                block_sizes: Some("4k".into()),
                iodepth: Some(4.into()),
                numjobs: Some(2.into()),
            }
        );
    }

    #[test]
    fn missing_or_null_fio_columns_are_omitted() {
        let case = restore_case(
            &record(json!({"CaseID": "c2", "RW": "write", "BS": null})),
            UperfPolicy::Reject,
        )
        .expect("restore");
        assert_eq!(case.test_types, Some("write".into()));
        assert_eq!(case.block_sizes, None);
        assert_eq!(case.iodepth, None);
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = restore_case(
            &record(json!({"CaseID": "c3", "RW": "read", "BS": ["4k", "8k"]})),
            UperfPolicy::Reject,
        )
        .expect_err("array column");
        assert_eq!(err.code(), "unsupported_parameter");
        assert!(err.to_string().contains("`BS`"));
    }

    #[test]
    fn integers_beyond_i64_are_rejected() {
        let err = restore_case(
            &record(json!({"CaseID": "c4", "RW": "read", "IOdepth": u64::MAX})),
            UperfPolicy::Reject,
        )
        .expect_err("u64 column");
        assert_eq!(err.code(), "unsupported_parameter");
        assert!(err.to_string().contains("`IOdepth`"));
        assert!(err.to_string().contains("integer beyond the i64 range"));
    }

    #[test]
    fn uperf_records_follow_policy() {
        let uperf = record(json!({"CaseID": "u1", "": "stream", "Conclusion": "Dramatic Regression"}));
        let err = restore_case(&uperf, UperfPolicy::Reject).expect_err("reject");
        assert!(matches!(
            err,
            BacklogError::UnimplementedSchema {
                schema: TestCaseSchema::UperfParams,
                ..
            }
        ));
        let case = restore_case(&uperf, UperfPolicy::Placeholder).expect("placeholder");
        assert!(case.is_placeholder());
    }

    #[test]
    fn unknown_schema_stops_the_whole_batch() {
        let good = record(json!({"CaseID": "c1", "RW": "read"}));
        let bad = record(json!({"CaseID": "x9", "Protocol": "tcp"}));
        let err = restore_parameters(&[&good, &bad], UperfPolicy::Placeholder)
            .expect_err("unknown schema");
        assert!(matches!(err, BacklogError::UnrecognizedSchema { ref case_id } if case_id == "x9"));
    }
}
