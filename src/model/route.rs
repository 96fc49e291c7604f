use std::fmt;

use super::{Difficulty, GameId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    GameSelect,
    Play {
        game_id: GameId,
        difficulty: Difficulty,
    },
    /// `play/` with a slug nobody registered.
    GameNotFound(String),
}

impl Route {
    /// Parses a location fragment; `#`/`/` prefixes are ignored and unknown paths go home.
    pub fn parse(location: &str) -> Route {
        let path = location.trim().trim_start_matches('#').trim_matches('/');
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        match segments.next() {
            None => Route::Home,
            Some("games") => Route::GameSelect,
            Some("play") => match segments.next() {
                Some(slug) => match slug.parse::<GameId>() {
                    Ok(game_id) => Route::Play {
                        game_id,
                        difficulty: Difficulty::parse_or_default(segments.next()),
                    },
                    Err(_) => Route::GameNotFound(slug.to_string()),
                },
                None => Route::GameSelect,
            },
            Some(_) => Route::Home,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "#/"),
            Route::GameSelect => write!(f, "#/games"),
            Route::Play {
                game_id,
                difficulty,
            } => write!(f, "#/play/{game_id}/{difficulty}"),
            Route::GameNotFound(slug) => write!(f, "#/play/{slug}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play_route() {
        assert_eq!(
            Route::parse("#/play/color-find/hard"),
            Route::Play {
                game_id: GameId::ColorFind,
                difficulty: Difficulty::Hard
            }
        );
        assert_eq!(
            Route::parse("play/word-chain"),
            Route::Play {
                game_id: GameId::WordChain,
                difficulty: Difficulty::Easy
            }
        );
        assert_eq!(
            Route::parse("play/card-match/impossible"),
            Route::Play {
                game_id: GameId::CardMatch,
                difficulty: Difficulty::Easy
            }
        );
    }

    #[test]
    fn test_parse_screens_and_fallbacks() {
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("#/"), Route::Home);
        assert_eq!(Route::parse("#/games"), Route::GameSelect);
        assert_eq!(Route::parse("#/settings"), Route::Home);
        assert_eq!(
            Route::parse("#/play/chess"),
            Route::GameNotFound("chess".to_string())
        );
    }

    #[test]
    fn test_display_is_parseable() {
        let route = Route::Play {
            game_id: GameId::MathChallenge,
            difficulty: Difficulty::Normal,
        };
        assert_eq!(route.to_string(), "#/play/math-challenge/normal");
        assert_eq!(Route::parse(&route.to_string()), route);
    }
}
