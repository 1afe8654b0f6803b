use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::model::team::Team;

/// Min-priority queue of teams keyed by player count.
///
/// The queue owns the teams while a trial runs. A team is taken out with
/// [`TeamQueue::extract_min`], grown, and put back with [`TeamQueue::insert`] so
/// its key is refreshed. Equal counts come out in ascending slot order.
#[derive(Debug, Clone)]
pub struct TeamQueue {
    teams: Vec<Team>,
    heap: BinaryHeap<Reverse<(usize, usize)>>,
}

/// A team checked out of the queue.
#[derive(Debug)]
pub struct Slot {
    index: usize,
}

impl TeamQueue {
    pub fn build(teams: Vec<Team>) -> TeamQueue {
        let heap = teams
            .iter()
            .enumerate()
            .map(|(index, team)| Reverse((team.player_count(), index)))
            .collect();
        TeamQueue { teams, heap }
    }

    /// Takes the team with the fewest players, or `None` when every team is
    /// checked out.
    pub fn extract_min(&mut self) -> Option<(Slot, &mut Team)> {
        let Reverse((_, index)) = self.heap.pop()?;
        Some((Slot { index }, &mut self.teams[index]))
    }

    /// Returns a checked-out team, keyed by its current count.
    pub fn insert(&mut self, slot: Slot) {
        let count = self.teams[slot.index].player_count();
        self.heap.push(Reverse((count, slot.index)));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Gives the teams back in their original order.
    pub fn into_teams(self) -> Vec<Team> {
        self.teams
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::Player;

    fn player(id: usize) -> Player {
        Player {
            id,
            row: id + 2,
            first_name: String::new(),
            last_name: String::new(),
            rating: 0.0,
            age: 0.0,
        }
    }

    #[test]
    fn smallest_team_comes_first() {
        let mut teams: Vec<Team> = (1..=3).map(Team::new).collect();
        teams[0].add_player(&player(0));
        teams[0].add_player(&player(1));
        teams[1].add_player(&player(2));
        let mut queue = TeamQueue::build(teams);

        let (slot, team) = queue.extract_min().unwrap();
        assert_eq!(team.number, 3);
        team.add_player(&player(3));
        team.add_player(&player(4));
        queue.insert(slot);

        let (_, team) = queue.extract_min().unwrap();
        assert_eq!(team.number, 2);
    }

    #[test]
    fn ties_break_by_slot_order() {
        let mut queue = TeamQueue::build((1..=3).map(Team::new).collect());
        let numbers: Vec<usize> = std::iter::from_fn(|| queue.extract_min().map(|(_, t)| t.number)).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn round_robin_keeps_counts_level() {
        let mut queue = TeamQueue::build((1..=4).map(Team::new).collect());
        for id in 0..10 {
            let (slot, team) = queue.extract_min().unwrap();
            team.add_player(&player(id));
            queue.insert(slot);
        }
        assert_eq!(queue.len(), 4);
        let counts: Vec<usize> = queue.into_teams().iter().map(Team::player_count).collect();
        assert_eq!(counts, vec![3, 3, 2, 2]);
    }
}
