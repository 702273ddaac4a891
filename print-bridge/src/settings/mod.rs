//! Restaurant settings persistence
//!
//! Settings live in `<WORK_DIR>/settings.json`. Readers take an immutable
//! snapshot per request; writers build a new snapshot and swap it in.

mod store;

pub use store::{SettingsError, SettingsStore};
