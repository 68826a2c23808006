//! Loading board configuration from disk

use crate::error::Result;
use shared::BoardConfig;
use std::path::Path;

/// Reads a JSON-encoded [`BoardConfig`] and validates it
///
/// ```json
/// { "width": 800, "height": 600, "note_width": 100, "note_height": 80,
///   "colors": ["yellow", "blue"] }
/// ```
pub fn load_board_config(path: impl AsRef<Path>) -> Result<BoardConfig> {
    let text = std::fs::read_to_string(path)?;
    parse_board_config(&text)
}

pub fn parse_board_config(text: &str) -> Result<BoardConfig> {
    let config: BoardConfig = serde_json::from_str(text)?;
    Ok(config.validated()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;

    #[test]
    fn test_parse_valid_config() {
        let config = parse_board_config(
            r#"{"width":400,"height":300,"note_width":40,"note_height":30,"colors":["Red","blue"]}"#,
        )
        .unwrap();
        assert_eq!(config.width, 400);
        assert_eq!(config.note_height, 30);
        assert_eq!(config.colors, vec!["red", "blue"]);
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(matches!(
            parse_board_config("{ not json"),
            Err(ServerError::ConfigFile(_))
        ));
        assert!(matches!(
            parse_board_config(r#"{"width":400}"#),
            Err(ServerError::ConfigFile(_))
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_board() {
        assert!(matches!(
            parse_board_config(
                r#"{"width":10,"height":10,"note_width":40,"note_height":30,"colors":["red"]}"#
            ),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_board_config("/nonexistent/board.json"),
            Err(ServerError::Io(_))
        ));
    }
}
