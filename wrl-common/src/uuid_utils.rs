//! Entry identifiers

use uuid::Uuid;

/// Fresh identifier for a saved entry: a random (v4) UUID in hyphenated form
pub fn new_entry_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}
