use std::str::FromStr;

/// Raw player input as the front end delivers it; each game accepts the kinds it understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    /// A card, cell or option, 0-based.
    Pick(usize),
    Digit(u8),
    Backspace,
    Submit,
    Word(String),
}

impl FromStr for PlayerInput {
    type Err = String;

    /// `#3` picks index 3, `<` deletes, `=` submits, a digit string types digits one at a time
    /// (callers split it), anything else is a word.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("empty input".to_string());
        }
        if let Some(index) = trimmed.strip_prefix('#') {
            return index
                .parse()
                .map(PlayerInput::Pick)
                .map_err(|_| format!("not a position: {index}"));
        }
        match trimmed {
            "<" => Ok(PlayerInput::Backspace),
            "=" => Ok(PlayerInput::Submit),
            _ if trimmed.len() == 1 && trimmed.chars().all(|c| c.is_ascii_digit()) => {
                Ok(PlayerInput::Digit(trimmed.as_bytes()[0] - b'0'))
            }
            _ => Ok(PlayerInput::Word(trimmed.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_player_input() {
        assert_eq!("#4".parse(), Ok(PlayerInput::Pick(4)));
        assert_eq!("7".parse(), Ok(PlayerInput::Digit(7)));
        assert_eq!(" < ".parse(), Ok(PlayerInput::Backspace));
        assert_eq!("=".parse(), Ok(PlayerInput::Submit));
        assert_eq!("나무".parse(), Ok(PlayerInput::Word("나무".to_string())));
        assert!("#x".parse::<PlayerInput>().is_err());
        assert!("   ".parse::<PlayerInput>().is_err());
    }
}
