//! Length-weighted random intervals drawn from a set of BED candidates
use std::path::Path;

use tinyrand::{Rand, Seeded, StdRand};
use tinyrand_std::ClockSeed;

use crate::error::{Error, Result};
use crate::io::{read_bed, Interval};

/// Draws positions from candidate intervals with probability proportional
/// to each candidate's length. Candidates are kept as given, so a line
/// repeated k times carries k times the weight.
///
/// Randomness comes from tinyrand's `StdRand` (Wyrand), reduced to a range
/// with [`below`]. Each draw takes one value below the total length to pick
/// a candidate and one below the candidate's length to pick the position,
/// so a fixed seed always gives the same sequence.
pub struct WeightedIntervalSampler {
    candidates: Vec<Interval>,
    // running sum of candidate lengths
    cumulative: Vec<u64>,
}

impl WeightedIntervalSampler {
    /// `None` when no candidate has any length to draw from
    pub fn new(candidates: Vec<Interval>) -> Option<Self> {
        let mut total = 0;
        let cumulative: Vec<u64> = candidates
            .iter()
            .map(|c| {
                total += c.len();
                total
            })
            .collect();
        if total == 0 {
            return None;
        }
        Some(Self {
            candidates,
            cumulative,
        })
    }

    /// Largest position a draw can return
    fn last_base(&self) -> u64 {
        self.candidates
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.end - 1)
            .max()
            .unwrap_or(0)
    }

    pub fn from_bed(path: &Path) -> Result<Self> {
        let ret = Self::new(read_bed(path)?).ok_or_else(|| Error::EmptyInput {
            path: path.to_path_buf(),
        })?;
        info!(
            "sampling from {} candidates, total weight {}",
            ret.len(),
            ret.total_weight()
        );
        Ok(ret)
    }

    pub fn total_weight(&self) -> u64 {
        *self.cumulative.last().unwrap_or(&0)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Index of the candidate owning weight position `r`
    fn select(&self, r: u64) -> usize {
        self.cumulative.partition_point(|&c| c <= r)
    }

    /// `n` draws of `length`-base intervals. Unseeded draws take their seed
    /// from the clock. Fails when `length` would push an end coordinate
    /// past `u64::MAX`.
    pub fn draws(&self, n: u64, length: u64, seed: Option<u64>) -> Result<Draws<'_>> {
        let last = self.last_base();
        if last.checked_add(length).is_none() {
            return Err(Error::Length { length, last });
        }
        let seed = match seed {
            Some(s) => s,
            None => {
                let s = ClockSeed::default().next_u64();
                info!("using clock seed {}", s);
                s
            }
        };
        Ok(Draws {
            sampler: self,
            rand: StdRand::seed(seed),
            remaining: n,
            length,
        })
    }
}

/// Uniform value in `[0, lim)` from Lemire's multiply-shift with rejection
fn below(rand: &mut StdRand, lim: u64) -> u64 {
    let mut full = u128::from(rand.next_u64()) * u128::from(lim);
    let mut low = full as u64;
    if low < lim {
        let cutoff = lim.wrapping_neg() % lim;
        while low < cutoff {
            full = u128::from(rand.next_u64()) * u128::from(lim);
            low = full as u64;
        }
    }
    (full >> 64) as u64
}

pub struct Draws<'a> {
    sampler: &'a WeightedIntervalSampler,
    rand: StdRand,
    remaining: u64,
    length: u64,
}

impl Iterator for Draws<'_> {
    type Item = Interval;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let r = below(&mut self.rand, self.sampler.total_weight());
        let pick = &self.sampler.candidates[self.sampler.select(r)];
        let pos = pick.start + below(&mut self.rand, pick.len());
        Some(Interval::new(pick.chrom.clone(), pos, pos + self.length))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}
