//! Sum of absolute fold change per region, split by direction and z-scored
use std::collections::HashMap;

use crate::contacts::{ContactMatrix, ContactRecord};
use crate::io::Interval;
use crate::stats::ZScores;

/// Sign of a contact's fold change
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn of(score: f64) -> Self {
        if score > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum View {
    // both directions
    All,
    // positive fold change only
    Up,
    // zero or negative fold change only
    Down,
}

/// Summed absolute scores per `(region, direction)`
#[derive(Default, Debug)]
pub struct DirectionalSums {
    sums: HashMap<(String, Direction), f64>,
}

impl DirectionalSums {
    pub fn add(&mut self, rec: &ContactRecord) {
        let dir = Direction::of(rec.score);
        *self.sums.entry((rec.region.clone(), dir)).or_insert(0.0) += rec.score.abs();
    }

    /// The region's score in `view`, `None` when it has no contacts there
    pub fn get(&self, region: &str, view: View) -> Option<f64> {
        let pick = |dir: Direction| self.sums.get(&(region.to_string(), dir)).copied();
        match view {
            View::Up => pick(Direction::Up),
            View::Down => pick(Direction::Down),
            View::All => match (pick(Direction::Up), pick(Direction::Down)) {
                (None, None) => None,
                (u, d) => Some(u.unwrap_or(0.0) + d.unwrap_or(0.0)),
            },
        }
    }
}

/// The three z-scored tracks in region coordinate order
pub struct Tracks {
    pub all: Vec<(Interval, f64)>,
    pub up: Vec<(Interval, f64)>,
    pub down: Vec<(Interval, f64)>,
}

pub struct DirectionalAggregator {
    max_distance: Option<f64>,
}

impl DirectionalAggregator {
    pub fn new(max_distance: Option<f64>) -> Self {
        Self { max_distance }
    }

    fn keep(&self, rec: &ContactRecord) -> bool {
        match self.max_distance {
            Some(m) => (rec.separation() as f64) <= m,
            None => true,
        }
    }

    /// Sum kept contacts by direction. Scores that aren't finite (a NaN
    /// fold change from 0/0) add nothing.
    pub fn sum(&self, records: &[ContactRecord]) -> DirectionalSums {
        let mut ret = DirectionalSums::default();
        let mut num_dropped = 0;
        let mut num_undefined = 0;
        for rec in records {
            if !rec.score.is_finite() {
                num_undefined += 1;
            } else if self.keep(rec) {
                ret.add(rec);
            } else {
                num_dropped += 1;
            }
        }
        if num_undefined != 0 {
            warn!("ignored {} contacts with an undefined score", num_undefined);
        }
        if let Some(m) = self.max_distance {
            info!("dropped {} contacts separated by more than {}", num_dropped, m);
        }
        ret
    }

    /// Left join `view` onto every position, then z-score it
    pub fn track(&self, matrix: &ContactMatrix, sums: &DirectionalSums, view: View) -> Vec<(Interval, f64)> {
        let regions = matrix.ordered_regions();
        let values: Vec<Option<f64>> = regions
            .iter()
            .map(|(id, _)| sums.get(id.as_str(), view))
            .collect();
        let z = ZScores::new(&values);
        debug!(
            "{:?}: {} of {} regions scored, mean {} sd {}",
            view,
            values.iter().flatten().count(),
            values.len(),
            z.mean,
            z.std_dev
        );
        regions
            .into_iter()
            .map(|(_, iv)| iv.clone())
            .zip(z.scores)
            .collect()
    }

    pub fn run(&self, matrix: &ContactMatrix) -> Tracks {
        let unplaced = matrix
            .records
            .iter()
            .filter(|r| !matrix.positions.contains_key(&r.region))
            .count();
        if unplaced != 0 {
            debug!("{} contacts have no position and are ignored", unplaced);
        }
        let sums = self.sum(&matrix.records);
        Tracks {
            all: self.track(matrix, &sums, View::All),
            up: self.track(matrix, &sums, View::Up),
            down: self.track(matrix, &sums, View::Down),
        }
    }
}
