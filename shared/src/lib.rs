//! Shared formats for the Rihlah DOS arcade.
//!
//! Everything the launcher and the bundle tooling both read or write lives
//! here: the `.jsdos` bundle archive layout, the per-game `game.json` record,
//! the `games.json` index and the rules for game identifiers.

pub mod bundle;
pub mod fs;
pub mod ids;
pub mod records;

pub use bundle::{
    BUNDLE_EXTENSION, BundleError, BundleReport, DOSBOX_CONF_ENTRY, JSDOS_JSON_ENTRY,
    MAX_BUNDLE_BYTES, REQUIRED_ENTRIES, extract_archive, extract_bundle, has_bundle_extension,
    inspect_bundle, write_bundle,
};
pub use fs::{MAX_RECORD_BYTES, ensure_parent_dir, read_to_string_with_limit};
pub use ids::is_valid_game_id;
pub use records::{
    GAME_CONFIG_FILE, GAMES_INDEX_FILE, GameConfig, GameSummary, GamesIndex, IndexChange,
};
