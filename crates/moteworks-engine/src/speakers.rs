//! Resolves the universe of motes allowed as dialogue speakers.

use serde_json::json;

use crate::schema::{SchemaError, SchemaNode, resolve_pointer_in_schema};
use crate::store::{Mote, MoteId, MoteStore};

/// Schema path from a quest mote's data to the speaker of a dialogue moment.
pub const SPEAKER_PATH: [&str; 5] = [
    "quest_start_moments",
    "anykey",
    "element",
    "speech",
    "speaker",
];

/// A mote that may appear as a dialogue speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speaker {
    pub id: MoteId,
    /// Display name read through the speaker's schema name pointer.
    pub name: Option<String>,
}

impl Speaker {
    /// The text an author types to refer to this speaker.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Matches by id, or by display name ignoring case.
    pub fn matches(&self, text: &str) -> bool {
        self.id.as_str() == text
            || self
                .name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(text))
    }
}

/// Lists every stored mote whose schema the quest schema allows as a speaker.
///
/// Errors when the quest schema is missing or no longer has a mote-reference
/// speaker field at [`SPEAKER_PATH`]; both mean the schema drifted.
pub fn get_allowed_speakers(
    store: &dyn MoteStore,
    quest_schema_id: &str,
) -> Result<Vec<Speaker>, SchemaError> {
    let schema = store
        .schema(quest_schema_id)
        .ok_or_else(|| SchemaError::NotFound {
            schema_id: quest_schema_id.to_string(),
        })?;

    let sample = json!({
        "schema_id": quest_schema_id,
        "data": {
            "quest_start_moments": {
                "anykey": {
                    "element": {
                        "style": "Dialogue",
                        "speech": { "speaker": "any" }
                    }
                }
            }
        }
    });

    let allowed = match resolve_pointer_in_schema(&SPEAKER_PATH, &sample, schema)? {
        SchemaNode::MoteId { format_properties } if !format_properties.allow_schemas.is_empty() => {
            &format_properties.allow_schemas
        }
        _ => {
            return Err(SchemaError::NotAMoteReference {
                path: SPEAKER_PATH.join("/"),
            });
        }
    };

    Ok(store
        .list_motes_by_schema(allowed)
        .into_iter()
        .map(|mote| Speaker {
            name: mote_name(store, &mote),
            id: mote.id,
        })
        .collect())
}

fn mote_name(store: &dyn MoteStore, mote: &Mote) -> Option<String> {
    store
        .schema(&mote.schema_id)?
        .name
        .as_ref()?
        .lookup(&mote.data)?
        .as_str()
        .map(str::to_string)
}
