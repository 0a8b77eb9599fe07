// SPDX-License-Identifier: Apache-2.0

use pbench_backlog_model::TestCaseRecord;
use tracing::info;

/// Keeps the records concluded as a dramatic regression, in report order.
pub fn filter_failures(records: &[TestCaseRecord]) -> Vec<&TestCaseRecord> {
    info!(total = records.len(), "got {} testcase(s)", records.len());
    let failed = records
        .iter()
        .filter(|record| record.is_failed())
        .collect::<Vec<_>>();
    info!(failed = failed.len(), "got {} failure case(s)", failed.len());
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_dramatic_regressions_survive_in_order() {
        let records: Vec<TestCaseRecord> = serde_json::from_value(json!([
            {"CaseID": "a", "Conclusion": "Dramatic Regression", "RW": "read"},
            {"CaseID": "b", "Conclusion": "No Difference", "RW": "read"},
            {"CaseID": "c", "Conclusion": "Moderate Regression", "RW": "write"},
            {"CaseID": "d"},
            {"CaseID": "e", "Conclusion": "Dramatic Regression", "RW": "randrw"},
        ]))
        .expect("records");
        let ids = filter_failures(&records)
            .into_iter()
            .map(TestCaseRecord::case_label)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "e"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(filter_failures(&[]).is_empty());
    }
}
