use itertools::Itertools;
use thiserror::Error;

use crate::model::condition::Score;
use crate::model::team::Team;

/// Age differences count a quarter as much as rating differences.
const AGE_WEIGHT: f64 = 0.25;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoreError {
    #[error("no teams to score")]
    NoTeams,
    #[error("team {0} has no players")]
    EmptyTeam(usize),
}

/// Scores a set of teams; 0 is perfectly balanced.
///
/// Sums the squared differences of mean rating, plus a quarter of the squared
/// differences of mean age, over every ordered pair of teams, then multiplies
/// by `max_size - min_size + 1`.
pub fn sort_score(teams: &[Team]) -> Result<Score, ScoreError> {
    if teams.is_empty() {
        return Err(ScoreError::NoTeams);
    }
    let means = teams
        .iter()
        .map(|team| match (team.avg_rating(), team.avg_age()) {
            (Some(rating), Some(age)) => Ok((rating, age)),
            _ => Err(ScoreError::EmptyTeam(team.number)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let base: Score = means
        .iter()
        .cartesian_product(means.iter())
        .map(|((r1, a1), (r2, a2))| (r1 - r2).powi(2) + AGE_WEIGHT * (a1 - a2).powi(2))
        .sum();

    let (min, max) = teams
        .iter()
        .map(Team::player_count)
        .minmax()
        .into_option()
        .unwrap_or((0, 0));
    Ok(base * (max - min + 1) as f64)
}
