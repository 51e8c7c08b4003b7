use serde_json::{Value, json};

use super::step;
use crate::ids::derive_id;
use crate::parsing::{ElementStyle, ParsedComfort, StageElement};
use crate::store::{MoteDataPointer, MoteId, MoteStore, StoreError};

const COMMENTS_POINTER: &str = "data/wip/comments";
const STAGES_POINTER: &str = "data/stages";

/// Writes the fields shared by every staged record: the author comments and
/// the stage/moment tree.
///
/// The stage subtree is deleted before anything is written below it, so stages
/// and moments missing from `parsed` do not survive the commit.
pub fn write_quest_fields(
    parsed: &ParsedComfort,
    mote_id: &MoteId,
    store: &mut dyn MoteStore,
    trace: &mut Vec<String>,
) -> Result<(), StoreError> {
    let comments = (!parsed.comments.is_empty()).then(|| json!(parsed.comments));
    step(trace, format!("writing {COMMENTS_POINTER}"));
    store.update_mote_data(mote_id, &COMMENTS_POINTER.into(), comments)?;

    let stages = MoteDataPointer::new(STAGES_POINTER);
    step(trace, format!("replacing {stages}"));
    store.update_mote_data(mote_id, &stages, None)?;

    for (i, stage) in parsed.stages.iter().enumerate() {
        let stage_id = stage
            .id
            .clone()
            .unwrap_or_else(|| derive_id(&format!("{mote_id}/stage/{i}")));
        let base = stages.join(&stage_id);
        step(trace, format!("writing stage {stage_id}"));
        store.update_mote_data(mote_id, &base.join("name"), Some(json!(stage.name)))?;
        store.update_mote_data(mote_id, &base.join("order"), Some(json!(i)))?;

        for (j, element) in stage.elements.iter().enumerate() {
            let moment_id = element
                .id
                .clone()
                .unwrap_or_else(|| derive_id(&format!("{mote_id}/stage/{i}/moment/{j}")));
            let moment = base.join("moments").join(&moment_id);
            store.update_mote_data(mote_id, &moment.join("order"), Some(json!(j)))?;
            for (pointer, value) in element_fields(&moment.join("element"), element) {
                store.update_mote_data(mote_id, &pointer, Some(value))?;
            }
        }
    }
    Ok(())
}

/// Pointer/value pairs for one moment's element.
///
/// The speaker field references a mote, so a speaker that failed to resolve
/// is left out rather than written as raw text.
fn element_fields(
    element_ptr: &MoteDataPointer,
    element: &StageElement,
) -> Vec<(MoteDataPointer, Value)> {
    let mut fields = vec![(element_ptr.join("style"), json!(element.style.as_str()))];
    match element.style {
        ElementStyle::Dialogue => {
            let speech = element_ptr.join("speech");
            if let Some(speaker) = element.speaker.as_ref().filter(|_| !element.speaker_unknown) {
                fields.push((speech.join("speaker"), json!(speaker)));
            }
            fields.push((speech.join("text").join("text"), json!(element.text)));
        }
        ElementStyle::Text => {
            fields.push((element_ptr.join("text").join("text"), json!(element.text)));
        }
    }
    fields
}
