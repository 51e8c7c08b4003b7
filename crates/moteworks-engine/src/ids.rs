use uuid::Uuid;

/// Length of generated ids, in hex chars.
pub const ID_LEN: usize = 6;

/// Derives a short, stable id from `seed`.
///
/// The same seed always yields the same id, which keeps suggested edits and
/// committed keys reproducible across parses.
pub fn derive_id(seed: &str) -> String {
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes());
    uuid.simple().to_string()[..ID_LEN].to_string()
}
