//! Unique database id allocation
//!
//! Every registered database gets a small numeric id used to scope its
//! settings. The generator is process-wide state: seed it once at
//! startup with the highest id found in persisted configuration, then
//! allocate through the single `allocate_database_id` function.

use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_DATABASE_ID: AtomicU32 = AtomicU32::new(1);

/// Seed the generator so future ids are higher than any persisted id
pub fn seed_database_ids(highest_seen: u32) {
    NEXT_DATABASE_ID.fetch_max(highest_seen + 1, Ordering::SeqCst);
}

/// Allocate the next unique database id
pub fn allocate_database_id() -> u32 {
    NEXT_DATABASE_ID.fetch_add(1, Ordering::SeqCst)
}

/// Current generator value, persisted alongside the configuration
pub fn database_id_generator_value() -> u32 {
    NEXT_DATABASE_ID.load(Ordering::SeqCst)
}
