//! Splits a roster of players into equally sized teams whose average rating
//! and age are as close as possible, honouring "req coach <N>" and
//! "req player <first> <last>" requests.
//!
//! ```
//! use team_sorter::loader::{load_players, Cell, Columns};
//! use team_sorter::search::{team_sort, SearchParams};
//!
//! let rows: Vec<Vec<Cell>> = vec![
//!     vec!["First".into(), "Last".into(), "Rating".into(), "Age".into(), "Request".into()],
//!     vec!["Ada".into(), "L".into(), Cell::Number(10.0), Cell::Number(9.0), Cell::Empty],
//!     vec!["Bo".into(), "M".into(), Cell::Number(20.0), Cell::Number(9.0), Cell::Empty],
//!     vec!["Cy".into(), "N".into(), Cell::Number(20.0), Cell::Number(9.0), Cell::Empty],
//!     vec!["Di".into(), "O".into(), Cell::Number(10.0), Cell::Number(9.0), Cell::Empty],
//! ];
//! let columns = Columns { first_name: 0, last_name: 1, rating: 2, age: 3, request: 4 };
//! let roster = load_players(&rows, &columns, 2).unwrap();
//! let outcome = team_sort(&roster, &SearchParams { trials: 100, seed: Some(1), parallel: false }).unwrap();
//! assert_eq!(outcome.score, 0.0);
//! ```

pub mod column;
pub mod config;
pub mod loader;
pub mod model;
pub mod queue;
pub mod request;
pub mod score;
pub mod search;

pub use loader::{load_players, Roster};
pub use score::sort_score;
pub use search::{sort, team_sort, SearchParams, SortOutcome};
