//! Target regions grouped by chromosome
use std::collections::HashMap;
use std::path::Path;

use rust_lapper::Lapper;

use crate::error::Result;
use crate::io::{read_bed, Interval, Iv};

/// A region is an interval used as an aggregation bucket
pub type Region = Interval;

/// Per-chromosome lookup of target regions.
///
/// Each chromosome keeps its regions sorted by coordinate, and a `Lapper`
/// over the same regions answers overlap queries. The lapper's `val`
/// holds the region's position in the sorted list.
#[derive(Default)]
pub struct IntervalIndex {
    regions: HashMap<String, Vec<Region>>,
    laps: HashMap<String, Lapper<u64, u64>>,
}

impl IntervalIndex {
    /// Build from regions in any order. Regions with identical coordinates
    /// are collapsed so every key is unique.
    pub fn new(regions: Vec<Region>) -> Self {
        let mut load: HashMap<String, Vec<Region>> = HashMap::new();
        for r in regions {
            load.entry(r.chrom.clone()).or_default().push(r);
        }

        let mut num_dups = 0;
        let mut laps = HashMap::new();
        for (chrom, regs) in load.iter_mut() {
            // can't assume they're sorted
            regs.sort();
            let before = regs.len();
            regs.dedup();
            num_dups += before - regs.len();
            let ivs: Vec<Iv> = regs
                .iter()
                .enumerate()
                .map(|(i, r)| Iv {
                    start: r.start,
                    stop: r.end,
                    val: i as u64,
                })
                .collect();
            laps.insert(chrom.clone(), Lapper::new(ivs));
        }
        if num_dups != 0 {
            warn!("collapsed {} duplicate regions", num_dups);
        }

        Self {
            regions: load,
            laps,
        }
    }

    /// Parse a BED file of regions. A malformed line fails the whole load.
    pub fn from_bed(path: &Path) -> Result<Self> {
        let ret = Self::new(read_bed(path)?);
        info!(
            "loaded {} regions on {} chromosomes",
            ret.len(),
            ret.chroms().count()
        );
        Ok(ret)
    }

    /// Regions on `chrom` in coordinate order; empty when there are none
    pub fn regions_for(&self, chrom: &str) -> &[Region] {
        match self.regions.get(chrom) {
            Some(r) => r,
            None => &[],
        }
    }

    /// Regions sharing at least one base with the half-open `[start, end)`
    pub fn overlapping<'a>(
        &'a self,
        chrom: &str,
        start: u64,
        end: u64,
    ) -> impl Iterator<Item = &'a Region> + 'a {
        let regs = self.regions_for(chrom);
        self.laps
            .get(chrom)
            .into_iter()
            .flat_map(move |lap| lap.find(start, end))
            .map(move |iv| &regs[iv.val as usize])
    }

    pub fn chroms(&self) -> impl Iterator<Item = &String> {
        self.regions.keys()
    }

    pub fn len(&self) -> usize {
        self.regions.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[fixture]
    fn index() -> IntervalIndex {
        IntervalIndex::new(vec![
            Region::new("chr1", 100, 200),
            Region::new("chr2", 0, 50),
            Region::new("chr1", 0, 100),
            Region::new("chr1", 0, 100),
        ])
    }

    #[rstest]
    fn regions_are_sorted_and_unique(index: IntervalIndex) {
        assert_eq!(
            index.regions_for("chr1"),
            &[Region::new("chr1", 0, 100), Region::new("chr1", 100, 200)]
        );
        assert_eq!(index.len(), 3);
    }

    #[rstest]
    fn unknown_chrom_is_empty(index: IntervalIndex) {
        assert!(index.regions_for("chrX").is_empty());
        assert_eq!(index.overlapping("chrX", 0, 10).count(), 0);
    }

    #[rstest]
    #[case(50, 100, vec!["chr1-0-100"])]
    #[case(99, 101, vec!["chr1-0-100", "chr1-100-200"])]
    #[case(100, 150, vec!["chr1-100-200"])]
    #[case(200, 300, vec![])]
    fn overlap_is_half_open(
        index: IntervalIndex,
        #[case] start: u64,
        #[case] end: u64,
        #[case] expected: Vec<&str>,
    ) {
        let mut got: Vec<String> = index
            .overlapping("chr1", start, end)
            .map(|r| r.key())
            .collect();
        got.sort();
        assert_eq!(got, expected);
    }

    #[rstest]
    fn empty_index() {
        let index = IntervalIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.chroms().count(), 0);
    }
}
