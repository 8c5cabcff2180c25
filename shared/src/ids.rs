//! Game identifier rules.
//!
//! Ids name a directory under the games folder (`games/{id}/game.json`) and
//! the bundle built for it (`{id}-bundle.jsdos`), so they are restricted to a
//! lowercase slug alphabet.

/// Longest accepted game id.
pub const MAX_GAME_ID_LEN: usize = 64;

/// Returns true if `id` is a lowercase slug: ASCII letters, digits, `-` and
/// `_`, starting with a letter or digit.
pub fn is_valid_game_id(id: &str) -> bool {
    if id.is_empty() || id.len() > MAX_GAME_ID_LEN {
        return false;
    }

    let mut chars = id.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    first_ok && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_catalog_style_ids() {
        assert!(is_valid_game_id("jetpack"));
        assert!(is_valid_game_id("keen4"));
        assert!(is_valid_game_id("keen-dreams"));
        assert!(is_valid_game_id("mario_teaches_typing"));
        assert!(is_valid_game_id("3d-pinball"));
    }

    #[test]
    fn rejects_path_tricks() {
        assert!(!is_valid_game_id(""));
        assert!(!is_valid_game_id("."));
        assert!(!is_valid_game_id(".."));
        assert!(!is_valid_game_id("../evil"));
        assert!(!is_valid_game_id("evil/dir"));
        assert!(!is_valid_game_id("evil\\dir"));
    }

    #[test]
    fn rejects_uppercase_spaces_and_leading_punctuation() {
        assert!(!is_valid_game_id("Keen4"));
        assert!(!is_valid_game_id("wolf 3d"));
        assert!(!is_valid_game_id("-keen"));
        assert!(!is_valid_game_id("_keen"));
    }

    #[test]
    fn rejects_overlong_ids() {
        let id = "a".repeat(MAX_GAME_ID_LEN + 1);
        assert!(!is_valid_game_id(&id));
        assert!(is_valid_game_id(&id[..MAX_GAME_ID_LEN]));
    }
}
