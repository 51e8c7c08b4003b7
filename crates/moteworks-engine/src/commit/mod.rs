//! Writes a parsed comfort record into its mote.
//!
//! A commit is a full replace: pending changes for the mote are dropped, the
//! derived stage subtree is deleted, and every field is written again from the
//! record. Committing the same record twice leaves the same store state.

mod quest;

use serde_json::json;
use thiserror::Error;

use crate::parsing::ParsedComfort;
use crate::store::{MoteDataPointer, MoteId, MoteStore, StoreError};

pub use quest::write_quest_fields;

pub const COMFORT_SCHEMA_ID: &str = "cl2_comfort";

pub const NAME_POINTER: &str = "data/name/text";
pub const DESCRIPTION_POINTER: &str = "data/description/text";
pub const UNLOCKED_DESCRIPTION_POINTER: &str = "data/unlocked_description/text";

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("{schema_id} schema not found in working copy")]
    SchemaNotFound { schema_id: String },
    #[error("{schema_id} schema does not declare a name pointer")]
    MissingNamePointer { schema_id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A fatal commit error with the trace accumulated up to the failure.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct CommitFailure {
    pub source: CommitError,
    pub trace: Vec<String>,
}

/// Replaces the derived data of `mote_id` with the contents of `parsed` and
/// flushes the store.
pub fn update_changes_from_parsed_comfort(
    parsed: &ParsedComfort,
    mote_id: &MoteId,
    store: &mut dyn MoteStore,
    schema_id: &str,
) -> Result<(), CommitFailure> {
    let mut trace = vec![];
    commit(parsed, mote_id, store, schema_id, &mut trace).map_err(|source| {
        log::error!("commit of {mote_id} failed: {source}");
        for entry in &trace {
            log::error!("  {entry}");
        }
        CommitFailure { source, trace }
    })
}

fn commit(
    parsed: &ParsedComfort,
    mote_id: &MoteId,
    store: &mut dyn MoteStore,
    schema_id: &str,
    trace: &mut Vec<String>,
) -> Result<(), CommitError> {
    step(trace, format!("clearing pending changes for {mote_id}"));
    store.clear_mote_changes(mote_id);

    step(trace, format!("checking {schema_id} schema"));
    let schema = store
        .schema(schema_id)
        .ok_or_else(|| CommitError::SchemaNotFound {
            schema_id: schema_id.to_string(),
        })?;
    if schema.name.is_none() {
        return Err(CommitError::MissingNamePointer {
            schema_id: schema_id.to_string(),
        });
    }

    let scalars = [
        (NAME_POINTER, &parsed.name),
        (DESCRIPTION_POINTER, &parsed.description),
        (UNLOCKED_DESCRIPTION_POINTER, &parsed.unlocked_description),
    ];
    for (pointer, value) in scalars {
        step(trace, format!("writing {pointer}"));
        store.update_mote_data(
            mote_id,
            &MoteDataPointer::new(pointer),
            value.as_ref().map(|v| json!(v)),
        )?;
    }

    write_quest_fields(parsed, mote_id, store, trace)?;

    step(trace, "flushing changes".to_string());
    store.write_changes()?;
    log::info!("committed {mote_id} ({} stages)", parsed.stages.len());
    Ok(())
}

/// Records a commit step in the trace.
fn step(trace: &mut Vec<String>, entry: String) {
    log::debug!("{entry}");
    trace.push(entry);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::parsing::{ElementStyle, Stage, StageElement};
    use crate::schema::{Schema, SchemaNode};
    use crate::store::{MemoryStore, Mote};

    fn comfort_schema(name: Option<&str>) -> Schema {
        Schema {
            id: COMFORT_SCHEMA_ID.into(),
            title: Some("Comfort".into()),
            name: name.map(MoteDataPointer::from),
            root: SchemaNode::Object {
                properties: Default::default(),
                additional_properties: None,
            },
        }
    }

    fn store() -> (MemoryStore, MoteId) {
        let id = MoteId::new("cmf_grove");
        let store = MemoryStore::new()
            .with_schema(comfort_schema(Some("data/name/text")))
            .with_mote(Mote::new(id.clone(), COMFORT_SCHEMA_ID));
        (store, id)
    }

    fn record() -> ParsedComfort {
        ParsedComfort {
            name: Some("Grove".into()),
            description: Some("Quiet".into()),
            unlocked_description: None,
            comments: vec!["check pacing".into()],
            stages: vec![Stage {
                id: Some("s1".into()),
                name: "Arrival".into(),
                elements: vec![
                    StageElement {
                        style: ElementStyle::Dialogue,
                        id: Some("e1".into()),
                        speaker: Some("npc_clue".into()),
                        speaker_unknown: false,
                        text: "Hello".into(),
                    },
                    StageElement {
                        style: ElementStyle::Text,
                        id: Some("e2".into()),
                        speaker: None,
                        speaker_unknown: false,
                        text: "Wind".into(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn commit_writes_scalars_comments_and_stages() {
        let (mut store, id) = store();
        update_changes_from_parsed_comfort(&record(), &id, &mut store, COMFORT_SCHEMA_ID)
            .unwrap();

        assert_eq!(
            store.mote(&id).unwrap().data,
            json!({
                "name": { "text": "Grove" },
                "description": { "text": "Quiet" },
                "wip": { "comments": ["check pacing"] },
                "stages": {
                    "s1": {
                        "name": "Arrival",
                        "order": 0,
                        "moments": {
                            "e1": {
                                "order": 0,
                                "element": {
                                    "style": "Dialogue",
                                    "speech": {
                                        "speaker": "npc_clue",
                                        "text": { "text": "Hello" }
                                    }
                                }
                            },
                            "e2": {
                                "order": 1,
                                "element": {
                                    "style": "Text",
                                    "text": { "text": "Wind" }
                                }
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn commit_is_idempotent() {
        let (mut store, id) = store();
        update_changes_from_parsed_comfort(&record(), &id, &mut store, COMFORT_SCHEMA_ID)
            .unwrap();
        let first = store.mote(&id).unwrap().clone();
        update_changes_from_parsed_comfort(&record(), &id, &mut store, COMFORT_SCHEMA_ID)
            .unwrap();
        assert_eq!(store.mote(&id).unwrap(), &first);
    }

    #[test]
    fn removed_stages_and_fields_disappear() {
        let (mut store, id) = store();
        update_changes_from_parsed_comfort(&record(), &id, &mut store, COMFORT_SCHEMA_ID)
            .unwrap();

        let trimmed = ParsedComfort {
            name: Some("Grove".into()),
            ..ParsedComfort::default()
        };
        update_changes_from_parsed_comfort(&trimmed, &id, &mut store, COMFORT_SCHEMA_ID)
            .unwrap();

        assert_eq!(store.mote(&id).unwrap().data, json!({ "name": { "text": "Grove" } }));
    }

    #[test]
    fn recommit_matches_commit_on_fresh_mote() {
        let name_only = ParsedComfort {
            name: Some("A".into()),
            ..ParsedComfort::default()
        };

        let (mut reused, id) = store();
        update_changes_from_parsed_comfort(&record(), &id, &mut reused, COMFORT_SCHEMA_ID)
            .unwrap();
        update_changes_from_parsed_comfort(&name_only, &id, &mut reused, COMFORT_SCHEMA_ID)
            .unwrap();

        let (mut fresh, _) = store();
        update_changes_from_parsed_comfort(&name_only, &id, &mut fresh, COMFORT_SCHEMA_ID)
            .unwrap();

        assert_eq!(reused.mote(&id).unwrap().data, fresh.mote(&id).unwrap().data);
        assert_eq!(fresh.mote(&id).unwrap().data, json!({ "name": { "text": "A" } }));
    }

    #[test]
    fn missing_schema_is_fatal() {
        let id = MoteId::new("cmf_grove");
        let mut store = MemoryStore::new().with_mote(Mote::new(id.clone(), COMFORT_SCHEMA_ID));
        let err =
            update_changes_from_parsed_comfort(&record(), &id, &mut store, COMFORT_SCHEMA_ID)
                .unwrap_err();
        assert!(matches!(err.source, CommitError::SchemaNotFound { .. }));
        assert_eq!(err.trace.len(), 2);
    }

    #[test]
    fn schema_without_name_pointer_is_fatal() {
        let id = MoteId::new("cmf_grove");
        let mut store = MemoryStore::new()
            .with_schema(comfort_schema(None))
            .with_mote(Mote::new(id.clone(), COMFORT_SCHEMA_ID));
        let err =
            update_changes_from_parsed_comfort(&record(), &id, &mut store, COMFORT_SCHEMA_ID)
                .unwrap_err();
        assert!(matches!(err.source, CommitError::MissingNamePointer { .. }));
        assert!(store.mote(&id).unwrap().data.as_object().unwrap().is_empty());
    }

    #[test]
    fn unknown_mote_fails_with_store_error() {
        let (mut store, _) = store();
        let err = update_changes_from_parsed_comfort(
            &record(),
            &MoteId::new("missing"),
            &mut store,
            COMFORT_SCHEMA_ID,
        )
        .unwrap_err();
        assert!(matches!(err.source, CommitError::Store(StoreError::UnknownMote(_))));
    }
}
