//! Spread interval scores over target regions by overlapping bases
use std::collections::BTreeMap;
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;
use crate::index::IntervalIndex;
use crate::io::{Interval, Record, Records};

/// region key -> summed score
pub type AccumulatedScore = BTreeMap<String, f64>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreFormat {
    // score in the 5th column (chrom, start, end, name, score)
    Bed,
    // score in the 4th column (chrom, start, end, score)
    Bedgraph,
}

impl ScoreFormat {
    pub fn score_column(&self) -> usize {
        match self {
            ScoreFormat::Bed => 4,
            ScoreFormat::Bedgraph => 3,
        }
    }

    fn parse(&self, path: &Path, rec: &Record) -> Result<ScoredInterval> {
        Ok(ScoredInterval {
            interval: rec.interval(path)?,
            score: rec.float(path, self.score_column())?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredInterval {
    pub interval: Interval,
    pub score: f64,
}

impl ScoredInterval {
    #[cfg(test)]
    pub fn new(chrom: &str, start: u64, end: u64, score: f64) -> Self {
        Self {
            interval: Interval::new(chrom, start, end),
            score,
        }
    }
}

/// Source interval had no bases to spread its score over
#[derive(Debug, PartialEq, Eq)]
pub struct DegenerateInterval;

/// Result of scoring one file
#[derive(Serialize, Debug)]
pub struct Apportionment {
    pub name: String,
    pub format: ScoreFormat,
    /// line numbers of zero-length intervals that were skipped
    pub skipped: Vec<usize>,
    pub scores: AccumulatedScore,
}

/// Bases shared by `[a_start, a_end)` and `[b_start, b_end)`
pub fn overlap_bases(a_start: u64, a_end: u64, b_start: u64, b_end: u64) -> u64 {
    a_end.min(b_end).saturating_sub(a_start.max(b_start))
}

pub struct OverlapApportioner<'a> {
    index: &'a IntervalIndex,
}

impl<'a> OverlapApportioner<'a> {
    pub fn new(index: &'a IntervalIndex) -> Self {
        Self { index }
    }

    /// Add each region's share of `src.score` to `acc`.
    ///
    /// A region receives `score / len(src) * overlap` where overlap counts
    /// bases on half-open coordinates. A zero-length source can't be
    /// spread and is rejected without touching `acc`.
    pub fn apportion(
        &self,
        src: &ScoredInterval,
        acc: &mut AccumulatedScore,
    ) -> std::result::Result<(), DegenerateInterval> {
        let iv = &src.interval;
        if iv.is_empty() {
            return Err(DegenerateInterval);
        }
        let per_base = src.score / iv.len() as f64;
        for region in self.index.overlapping(&iv.chrom, iv.start, iv.end) {
            let ovl = overlap_bases(iv.start, iv.end, region.start, region.end);
            if ovl > 0 {
                *acc.entry(region.key()).or_insert(0.0) += per_base * ovl as f64;
            }
        }
        Ok(())
    }

    /// Stream a bed/bedgraph file through [`Self::apportion`].
    /// Malformed lines abort; zero-length intervals are skipped and reported.
    pub fn score_file(&self, path: &Path, format: ScoreFormat, name: String) -> Result<Apportionment> {
        info!("parsing {}", path.display());
        let mut scores = AccumulatedScore::new();
        let mut skipped = vec![];
        let mut num_lines = 0;
        for rec in Records::open(path)? {
            let rec = rec?;
            let src = format.parse(path, &rec)?;
            num_lines += 1;
            if self.apportion(&src, &mut scores).is_err() {
                debug!("skipping zero-length interval on line {}", rec.line);
                skipped.push(rec.line);
            }
        }
        info!("scored {} intervals into {} regions", num_lines, scores.len());
        if !skipped.is_empty() {
            warn!("skipped {} zero-length intervals", skipped.len());
        }
        Ok(Apportionment {
            name,
            format,
            skipped,
            scores,
        })
    }
}
