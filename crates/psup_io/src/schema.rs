//! crates/psup_io/src/schema.rs
//! Draft 2020-12 validation of the daily input document against the schema
//! embedded at build time.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::{IoError, IoResult};

/// Input document schema (`schemas/input.schema.json`).
pub const INPUT_SCHEMA: &str = include_str!("../schemas/input.schema.json");

/// Validates `doc`; the first error is reported with its instance path.
pub fn validate_input(doc: &Value) -> IoResult<()> {
    let schema: Value = serde_json::from_str(INPUT_SCHEMA)?;
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft202012)
        .compile(&schema)
        .map_err(|e| IoError::Schema { pointer: "#".into(), msg: format!("schema compile error: {e}") })?;

    let first = match compiled.validate(doc) {
        Ok(()) => None,
        Err(mut errors) => errors.next().map(|err| {
            let pointer = err.instance_path.to_string();
            IoError::Schema {
                pointer: if pointer.is_empty() { "/".into() } else { pointer },
                msg: err.to_string(),
            }
        }),
    };
    match first {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "params": { "day": 3, "boarding_reservation_end_day": 10, "gdd_start_day": 20 },
            "groups": [ { "id": { "ranking_group": 1, "institution": 1, "program": 1 }, "capacity": 2 } ],
            "boarding_groups": [],
            "wishes": [ {
                "candidate": 1,
                "group": { "ranking_group": 1, "institution": 1, "program": 1 },
                "call_order": 1,
                "status": "AWAITING"
            } ]
        })
    }

    #[test]
    fn minimal_document_is_valid() {
        validate_input(&minimal()).unwrap();
    }

    #[test]
    fn unknown_status_points_at_the_wish() {
        let mut doc = minimal();
        doc["wishes"][0]["status"] = json!("MAYBE");
        match validate_input(&doc) {
            Err(IoError::Schema { pointer, .. }) => assert_eq!(pointer, "/wishes/0/status"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let mut doc = minimal();
        doc["groups"][0]["capacity"] = json!(-1);
        assert!(matches!(validate_input(&doc), Err(IoError::Schema { .. })));
    }
}
