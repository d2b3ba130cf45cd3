//! crates/psup_report/src/render_json.rs
//! Pretty JSON rendering of the day summary; field order follows the model.

use crate::model::DaySummary;
use crate::ReportError;

pub fn render_json(summary: &DaySummary) -> Result<String, ReportError> {
    let mut s = serde_json::to_string_pretty(summary).map_err(|e| ReportError::Serialize(e.to_string()))?;
    s.push('\n');
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Resignations, StatusCount, Verdict};
    use serde_json::Value;

    #[test]
    fn renders_every_section() {
        let summary = DaySummary {
            day: 3,
            gdd_active: false,
            responder_candidates: 0,
            wishes: 1,
            status_counts: vec![StatusCount { status: "AWAITING".into(), count: 1 }],
            offers_of_the_day: 0,
            auto_accepted: 0,
            resignations: Resignations::default(),
            thresholds: vec![],
            verdict: Verdict { warning: true, ..Verdict::default() },
            findings: vec![],
            input_sha256: None,
        };
        let text = render_json(&summary).unwrap();
        assert!(text.ends_with("}\n"));
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["day"], 3);
        assert_eq!(v["status_counts"][0]["status"], "AWAITING");
        assert_eq!(v["verdict"]["warning"], true);
        assert!(v["input_sha256"].is_null());
    }

    #[test]
    fn serialize_error_names_the_cause() {
        let err = ReportError::Serialize("key must be a string".into());
        assert_eq!(err.to_string(), "report serialization failed: key must be a string");
    }
}
