use thiserror::Error;

const COACH_PREFIX: &str = "req coach";
const PLAYER_PREFIX: &str = "req player";

/// A constraint written by a player in the free-text request column.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Pin the player to a 1-based team number.
    Coach(usize),
    /// Pair the player with a named player.
    Player { first: String, last: String },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestError {
    #[error("invalid team number in coach request: {0:?}")]
    InvalidTeamNumber(String),
    #[error("player request needs a first and last name: {0:?}")]
    MissingName(String),
}

impl Request {
    /// Parses a request cell. Text that is not a request yields `Ok(None)`.
    pub fn parse(text: &str) -> Result<Option<Request>, RequestError> {
        let text = text.trim();
        if let Some(rest) = strip_prefix_ignore_case(text, COACH_PREFIX) {
            let number = rest.trim();
            return match number.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Some(Request::Coach(n))),
                _ => Err(RequestError::InvalidTeamNumber(number.to_string())),
            };
        }
        if let Some(rest) = strip_prefix_ignore_case(text, PLAYER_PREFIX) {
            let mut names = rest.split_whitespace();
            return match (names.next(), names.next()) {
                (Some(first), Some(last)) => Ok(Some(Request::Player {
                    first: first.to_string(),
                    last: last.to_string(),
                })),
                _ => Err(RequestError::MissingName(rest.trim().to_string())),
            };
        }
        Ok(None)
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}
