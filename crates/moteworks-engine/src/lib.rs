pub mod commit;
pub mod ids;
pub mod parsing;
pub mod schema;
pub mod speakers;
pub mod store;

// Re-export key types for easier usage
pub use commit::{
    COMFORT_SCHEMA_ID, CommitError, CommitFailure, update_changes_from_parsed_comfort,
};
pub use parsing::{
    ComfortUpdateResult, ParseError, ParseFailure, ParseOptions, ParsedComfort,
    parse_stringified_comfort,
};
pub use schema::{Schema, SchemaError, SchemaNode};
pub use speakers::{Speaker, get_allowed_speakers};
pub use store::{MemoryStore, Mote, MoteDataPointer, MoteId, MoteStore, StoreError};
