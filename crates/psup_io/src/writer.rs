//! crates/psup_io/src/writer.rs
//! Serializes inputs and outputs to their wire documents and writes them as
//! canonical JSON.

use std::path::Path;

use psup_core::{AdmissionInput, AdmissionOutput};
use serde_json::Value;
use tracing::info;

use crate::canonical_json::write_canonical_file;
use crate::wire::{InputDoc, OutputDoc};
use crate::{IoError, IoResult};

pub fn input_value(input: &AdmissionInput) -> IoResult<Value> {
    Ok(serde_json::to_value(InputDoc::from_input(input))?)
}

pub fn output_value(output: &AdmissionOutput) -> IoResult<Value> {
    Ok(serde_json::to_value(OutputDoc::from_output(output))?)
}

pub fn write_input_path(path: &Path, input: &AdmissionInput) -> IoResult<()> {
    let v = input_value(input)?;
    write_value(path, &v)?;
    info!(path = %path.display(), wishes = input.wishes().len(), "input archived");
    Ok(())
}

pub fn write_output_path(path: &Path, output: &AdmissionOutput) -> IoResult<()> {
    let v = output_value(output)?;
    write_value(path, &v)?;
    info!(
        path = %path.display(),
        wishes = output.wishes.len(),
        alert = output.alert(),
        "output written"
    );
    Ok(())
}

fn write_value(path: &Path, v: &Value) -> IoResult<()> {
    write_canonical_file(path, v).map_err(|source| IoError::Write { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use psup_core::{
        BoardingGroup, BoardingGroupId, CampaignParams, ProgramGroup, ProgramGroupId, Wish, WishFields, WishStatus,
    };

    fn input() -> AdmissionInput {
        let params = CampaignParams::new(4, 10, 20);
        let gid = ProgramGroupId::new(1, 2, 3);
        let mut input = AdmissionInput::new(params);
        input.add_group(ProgramGroup::new(2, gid, 0, 1, 0, &params).unwrap()).unwrap();
        input.add_boarding_group(BoardingGroup::new(BoardingGroupId::new(9, 3), 1).unwrap()).unwrap();
        input
            .add_wish(
                Wish::new(WishFields {
                    candidate: 5,
                    group: gid,
                    call_order: 1,
                    status: WishStatus::Awaiting,
                    ..WishFields::default()
                })
                .unwrap(),
            )
            .unwrap();
        input
    }

    #[test]
    fn written_input_loads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.json");
        let before = input();
        write_input_path(&path, &before).unwrap();
        let loaded = crate::load_input_path(&path).unwrap();
        assert_eq!(input_value(&loaded).unwrap(), input_value(&before).unwrap());
    }

    #[test]
    fn output_value_has_flag_fields() {
        let v = output_value(&AdmissionOutput::new(CampaignParams::new(1, 2, 3))).unwrap();
        assert_eq!(v["alert"], Value::Bool(false));
        assert_eq!(v["warning"], Value::Bool(false));
        assert!(v["groups_not_exported"].as_array().unwrap().is_empty());
    }
}
