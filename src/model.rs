pub mod entity {
    /// Handle into the player arena of a roster.
    pub type PlayerId = usize;
    /// 1-based row number of the source sheet the player was read from.
    pub type RowRef = usize;

    #[derive(Debug, Clone, PartialEq)]
    pub struct Player {
        pub id: PlayerId,
        pub row: RowRef,
        pub first_name: String,
        pub last_name: String,
        pub rating: f64,
        pub age: f64,
    }

    impl Player {
        /// Case-insensitive comparison against a first and last name.
        pub fn is_named(&self, first: &str, last: &str) -> bool {
            self.first_name.to_lowercase() == first.to_lowercase()
                && self.last_name.to_lowercase() == last.to_lowercase()
        }
    }

    impl std::fmt::Display for Player {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{} {}", self.first_name, self.last_name)
        }
    }
}


pub mod team {
    use super::entity::{Player, PlayerId};

    /// A growable set of players with running rating and age totals.
    ///
    /// Teams hold handles, not players, so copying a team for a new trial only
    /// duplicates a vector of integers.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Team {
        pub number: usize,
        players: Vec<PlayerId>,
        rating_sum: f64,
        age_sum: f64,
    }

    impl Team {
        pub fn new(number: usize) -> Team {
            Team { number, players: Vec::new(), rating_sum: 0.0, age_sum: 0.0 }
        }

        pub fn add_player(&mut self, player: &Player) {
            self.players.push(player.id);
            self.rating_sum += player.rating;
            self.age_sum += player.age;
        }

        pub fn players(&self) -> &[PlayerId] {
            &self.players
        }

        pub fn player_count(&self) -> usize {
            self.players.len()
        }

        pub fn is_empty(&self) -> bool {
            self.players.is_empty()
        }

        pub fn contains(&self, id: PlayerId) -> bool {
            self.players.contains(&id)
        }

        pub fn avg_rating(&self) -> Option<f64> {
            if self.is_empty() {
                return None;
            }
            Some(self.rating_sum / self.players.len() as f64)
        }

        pub fn avg_age(&self) -> Option<f64> {
            if self.is_empty() {
                return None;
            }
            Some(self.age_sum / self.players.len() as f64)
        }
    }

    impl std::fmt::Display for Team {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Team {}", self.number)
        }
    }
}

pub mod condition {
    use std::collections::HashMap;
    use super::entity::PlayerId;

    pub type Score = f64;

    /// Undirected "play with" relation between players.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Pairing {
        partners: HashMap<PlayerId, Vec<PlayerId>>,
    }

    impl Pairing {
        pub fn new() -> Pairing {
            Pairing::default()
        }

        /// Links both directions at once. Self links and repeats are dropped.
        /// Returns whether a new link was created.
        pub fn link(&mut self, a: PlayerId, b: PlayerId) -> bool {
            if a == b || self.are_paired(a, b) {
                return false;
            }
            self.partners.entry(a).or_default().push(b);
            self.partners.entry(b).or_default().push(a);
            true
        }

        pub fn partners_of(&self, id: PlayerId) -> &[PlayerId] {
            self.partners.get(&id).map(Vec::as_slice).unwrap_or(&[])
        }

        pub fn are_paired(&self, a: PlayerId, b: PlayerId) -> bool {
            self.partners_of(a).contains(&b)
        }

        /// Number of undirected links.
        pub fn len(&self) -> usize {
            self.partners.values().map(Vec::len).sum::<usize>() / 2
        }

        pub fn is_empty(&self) -> bool {
            self.partners.is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::condition::Pairing;
    use super::entity::Player;
    use super::team::Team;

    fn player(id: usize, rating: f64, age: f64) -> Player {
        Player {
            id,
            row: id + 2,
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            rating,
            age,
        }
    }

    #[test]
    fn team_tracks_running_averages() {
        let mut team = Team::new(1);
        assert_eq!(team.avg_rating(), None);
        assert_eq!(team.avg_age(), None);

        team.add_player(&player(0, 10.0, 8.0));
        team.add_player(&player(1, 20.0, 12.0));

        assert_eq!(team.player_count(), 2);
        assert_eq!(team.avg_rating(), Some(15.0));
        assert_eq!(team.avg_age(), Some(10.0));
        assert_eq!(team.players(), &[0, 1]);
    }

    #[test]
    fn cloned_team_is_independent() {
        let mut team = Team::new(3);
        team.add_player(&player(0, 5.0, 5.0));
        let mut copy = team.clone();
        copy.add_player(&player(1, 7.0, 7.0));

        assert_eq!(copy.number, 3);
        assert_eq!(team.player_count(), 1);
        assert_eq!(copy.player_count(), 2);
    }

    #[test]
    fn pairing_is_symmetric_and_deduplicated() {
        let mut pairing = Pairing::new();
        assert!(pairing.link(0, 1));
        assert!(!pairing.link(1, 0));
        assert!(!pairing.link(2, 2));
        assert!(pairing.link(0, 2));

        assert_eq!(pairing.partners_of(0), &[1, 2]);
        assert_eq!(pairing.partners_of(1), &[0]);
        assert_eq!(pairing.partners_of(2), &[0]);
        assert!(pairing.partners_of(5).is_empty());
        assert_eq!(pairing.len(), 2);
    }

    #[test]
    fn names_match_ignoring_case() {
        let mut p = player(0, 0.0, 0.0);
        p.first_name = "Ada".into();
        p.last_name = "Lovelace".into();
        assert!(p.is_named("ada", "LOVELACE"));
        assert!(!p.is_named("ada", "byron"));
        assert_eq!(p.to_string(), "Ada Lovelace");
    }
}
