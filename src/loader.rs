use thiserror::Error;
use tracing::{debug, warn};

use crate::model::condition::Pairing;
use crate::model::entity::{Player, PlayerId, RowRef};
use crate::model::team::Team;
use crate::request::{Request, RequestError};

/// One cell of a source row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        if text.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.trim().to_string(),
        }
    }
}

/// 0-based positions of the columns the loader reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Columns {
    pub first_name: usize,
    pub last_name: usize,
    pub rating: usize,
    pub age: usize,
    pub request: usize,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    #[error("team count must be at least 1")]
    NoTeams,
    #[error("row {row} has no column {column}")]
    MissingColumn { row: RowRef, column: usize },
    #[error("row {row}, column {column}: {value:?} is not a number")]
    InvalidNumber { row: RowRef, column: usize, value: String },
    #[error("row {row}: {source}")]
    Request { row: RowRef, source: RequestError },
    #[error("row {row} asks for team {team} but only {team_count} teams exist")]
    CoachTeamOutOfRange { row: RowRef, team: usize, team_count: usize },
}

/// Everything a search needs: players, who must play together, who is still
/// unassigned, and the teams with coach requests already applied.
#[derive(Debug, Clone)]
pub struct Roster {
    pub players: Vec<Player>,
    pub pairing: Pairing,
    pub pool: Vec<PlayerId>,
    pub teams: Vec<Team>,
}

impl Roster {
    /// Starts an empty roster with `team_count` teams numbered from 1.
    pub fn new(team_count: usize) -> Roster {
        Roster {
            players: Vec::new(),
            pairing: Pairing::new(),
            pool: Vec::new(),
            teams: (1..=team_count).map(Team::new).collect(),
        }
    }

    /// Adds a player to the arena and the assignable pool.
    pub fn push_player(&mut self, row: RowRef, first: &str, last: &str, rating: f64, age: f64) -> PlayerId {
        let id = self.players.len();
        self.players.push(Player {
            id,
            row,
            first_name: first.to_string(),
            last_name: last.to_string(),
            rating,
            age,
        });
        self.pool.push(id);
        id
    }

    /// Moves a pooled player onto a team permanently.
    pub fn pin(&mut self, id: PlayerId, team: usize) -> Result<(), LoadError> {
        let team_count = self.teams.len();
        let player = &self.players[id];
        if team == 0 || team > team_count {
            return Err(LoadError::CoachTeamOutOfRange { row: player.row, team, team_count });
        }
        self.teams[team - 1].add_player(player);
        self.pool.retain(|&pooled| pooled != id);
        Ok(())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn find_by_name(&self, first: &str, last: &str) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|player| player.is_named(first, last))
            .map(|player| player.id)
            .collect()
    }
}

fn cell<'a>(row: &'a [Cell], row_ref: RowRef, column: usize) -> Result<&'a Cell, LoadError> {
    row.get(column).ok_or(LoadError::MissingColumn { row: row_ref, column })
}

/// Blank cells read as 0. NaN and infinities are rejected.
fn number(row: &[Cell], row_ref: RowRef, column: usize) -> Result<f64, LoadError> {
    let invalid = |value: String| LoadError::InvalidNumber { row: row_ref, column, value };
    match cell(row, row_ref, column)? {
        Cell::Empty => Ok(0.0),
        Cell::Number(n) if n.is_finite() => Ok(*n),
        Cell::Number(n) => Err(invalid(n.to_string())),
        Cell::Text(text) if text.trim().is_empty() => Ok(0.0),
        Cell::Text(text) => match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(invalid(text.clone())),
        },
    }
}

/// Reads players from `rows`, applies coach requests and links player requests.
///
/// Player requests are resolved after every row is read, so a request may name
/// a player further down the sheet. Names are matched against every loaded
/// player; a match that was pinned by a coach request is linked but never pulled
/// onto another team.
pub fn load_players<R: AsRef<[Cell]>>(
    rows: &[R],
    columns: &Columns,
    team_count: usize,
) -> Result<Roster, LoadError> {
    if team_count == 0 {
        return Err(LoadError::NoTeams);
    }
    let mut roster = Roster::new(team_count);
    let mut player_requests = Vec::new();

    for (index, row) in rows.iter().enumerate().skip(1) {
        let row = row.as_ref();
        let row_ref = index + 1;
        let first = cell(row, row_ref, columns.first_name)?.text();
        let last = cell(row, row_ref, columns.last_name)?.text();
        let rating = number(row, row_ref, columns.rating)?;
        let age = number(row, row_ref, columns.age)?;
        let id = roster.push_player(row_ref, &first, &last, rating, age);

        let Cell::Text(text) = cell(row, row_ref, columns.request)? else {
            continue;
        };
        let request = Request::parse(text)
            .map_err(|source| LoadError::Request { row: row_ref, source })?;
        match request {
            Some(Request::Coach(team)) => {
                roster.pin(id, team)?;
                debug!(player = %roster.players[id], team, "coach request");
            }
            Some(Request::Player { first, last }) => player_requests.push((id, first, last)),
            None if text.trim().is_empty() => {}
            None => debug!(player = %roster.players[id], "request column is not a request"),
        }
    }

    for (id, first, last) in player_requests {
        let matches = roster.find_by_name(&first, &last);
        if matches.is_empty() {
            warn!(player = %roster.players[id], "no player named {first} {last}");
            continue;
        }
        for partner in matches {
            if roster.pairing.link(id, partner) {
                debug!(
                    player = %roster.players[id],
                    partner = %roster.players[partner],
                    "player request"
                );
            }
        }
    }

    Ok(roster)
}
