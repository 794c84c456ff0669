//! Parsed contact matrix: region positions plus long-form bin scores
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::io::{Interval, Records};

/// One matrix cell: the contact score between `region` and the bin at
/// `bin_end`, where `bin_start` is the start of `region`'s own bin.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactRecord {
    pub region: String,
    pub bin_start: u64,
    pub bin_end: u64,
    pub score: f64,
}

impl ContactRecord {
    pub fn new(region: &str, bin_start: u64, bin_end: u64, score: f64) -> Self {
        Self {
            region: region.to_string(),
            bin_start,
            bin_end,
            score,
        }
    }

    pub fn separation(&self) -> u64 {
        self.bin_end.abs_diff(self.bin_start)
    }
}

#[derive(Debug)]
pub struct ContactMatrix {
    /// region id -> coordinates
    pub positions: HashMap<String, Interval>,
    pub records: Vec<ContactRecord>,
}

impl ContactMatrix {
    pub fn new(positions: HashMap<String, Interval>, records: Vec<ContactRecord>) -> Self {
        Self { positions, records }
    }

    /// Load the long-form matrix table (`region, binStart, binEnd, score`).
    ///
    /// Positions come from the `region, chrom, start, end` table when one is
    /// given. Otherwise region ids must look like `chrom-start` and each bin
    /// spans `bin_size` bases.
    pub fn load(matrix: &Path, positions: Option<&Path>, bin_size: u64) -> Result<Self> {
        let mut pos = match positions {
            Some(p) => read_positions(p)?,
            None => HashMap::new(),
        };

        info!("parsing {}", matrix.display());
        let mut records = vec![];
        for rec in Records::open(matrix)? {
            let rec = rec?;
            let region = rec.field(matrix, 0)?.to_string();
            if positions.is_none() && !pos.contains_key(&region) {
                let iv = region_from_id(&region, bin_size).ok_or_else(|| {
                    Error::parse(
                        matrix,
                        rec.line,
                        format!("region id '{}' is not chrom-start", region),
                    )
                })?;
                pos.insert(region.clone(), iv);
            }
            records.push(ContactRecord::new(
                &region,
                rec.coord(matrix, 1)?,
                rec.coord(matrix, 2)?,
                rec.float(matrix, 3)?,
            ));
        }
        info!(
            "loaded {} contacts over {} regions",
            records.len(),
            pos.len()
        );

        Ok(Self::new(pos, records))
    }

    /// Region ids in coordinate order
    pub fn ordered_regions(&self) -> Vec<(&String, &Interval)> {
        let mut ret: Vec<(&String, &Interval)> = self.positions.iter().collect();
        ret.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        ret
    }
}

/// `chr1-5000` with a bin size of 1000 becomes `chr1:5000-6000`
fn region_from_id(id: &str, bin_size: u64) -> Option<Interval> {
    let (chrom, start) = id.rsplit_once('-')?;
    if chrom.is_empty() {
        return None;
    }
    let start = start.parse::<u64>().ok()?;
    Some(Interval::new(chrom, start, start.checked_add(bin_size)?))
}

fn read_positions(path: &Path) -> Result<HashMap<String, Interval>> {
    info!("parsing {}", path.display());
    let mut ret = HashMap::new();
    for rec in Records::open(path)? {
        let rec = rec?;
        let region = rec.field(path, 0)?.to_string();
        let chrom = rec.field(path, 1)?;
        let start = rec.coord(path, 2)?;
        let end = rec.coord(path, 3)?;
        if start > end {
            return Err(Error::parse(
                path,
                rec.line,
                format!("start {} is after end {}", start, end),
            ));
        }
        if ret
            .insert(region.clone(), Interval::new(chrom, start, end))
            .is_some()
        {
            return Err(Error::parse(
                path,
                rec.line,
                format!("duplicate region id '{}'", region),
            ));
        }
    }
    info!("loaded {} positions", ret.len());
    Ok(ret)
}

/// Contacts per bin: half the summed raw score of each region, since every
/// contact is listed once from each of its two bins. Undefined scores are
/// left out of the sum.
pub fn contacts_per_bin(matrix: &ContactMatrix) -> Vec<(Interval, f64)> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for rec in matrix.records.iter().filter(|r| r.score.is_finite()) {
        *sums.entry(rec.region.as_str()).or_insert(0.0) += rec.score;
    }
    matrix
        .ordered_regions()
        .into_iter()
        .map(|(id, iv)| {
            let total = sums.get(id.as_str()).copied().unwrap_or(0.0);
            (iv.clone(), total / 2.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[rstest]
    #[case(0, 5000, 5000)]
    #[case(5000, 0, 5000)]
    #[case(10, 10, 0)]
    fn separation_is_absolute(#[case] start: u64, #[case] end: u64, #[case] expected: u64) {
        assert_eq!(ContactRecord::new("a", start, end, 1.0).separation(), expected);
    }

    #[rstest]
    #[case("chr1-5000", Some(Interval::new("chr1", 5000, 6000)))]
    #[case("HLA-A-0", Some(Interval::new("HLA-A", 0, 1000)))]
    #[case("chr1", None)]
    #[case("-100", None)]
    #[case("chr1-x", None)]
    #[case("chr1-18446744073709551000", None)]
    fn region_ids(#[case] id: &str, #[case] expected: Option<Interval>) {
        assert_eq!(region_from_id(id, 1000), expected);
    }

    #[rstest]
    fn load_with_positions_table() {
        let pos = table("r1\tchr1\t0\t100\nr0\tchr1\t100\t200\n");
        let mat = table("r1\t0\t100\t1.5\nr0\t100\t0\t-2\n");
        let m = ContactMatrix::load(mat.path(), Some(pos.path()), 100).unwrap();
        assert_eq!(m.records.len(), 2);
        let ordered: Vec<&String> = m.ordered_regions().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ordered, vec!["r1", "r0"]);
    }

    #[rstest]
    fn load_derives_positions_from_ids() {
        let mat = table("chr2-0\t0\t100\t1\nchr1-100\t100\t0\t1\nchr1-0\t0\t100\t1\n");
        let m = ContactMatrix::load(mat.path(), None, 100).unwrap();
        let ordered: Vec<Interval> = m
            .ordered_regions()
            .into_iter()
            .map(|(_, iv)| iv.clone())
            .collect();
        assert_eq!(
            ordered,
            vec![
                Interval::new("chr1", 0, 100),
                Interval::new("chr1", 100, 200),
                Interval::new("chr2", 0, 100),
            ]
        );
    }

    #[rstest]
    fn duplicate_position_is_fatal() {
        let pos = table("r1\tchr1\t0\t100\nr1\tchr1\t100\t200\n");
        let mat = table("r1\t0\t100\t1\n");
        let err = ContactMatrix::load(mat.path(), Some(pos.path()), 100).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[rstest]
    fn coverage_halves_region_sums() {
        let mut positions = HashMap::new();
        positions.insert("a".to_string(), Interval::new("chr1", 0, 10));
        positions.insert("b".to_string(), Interval::new("chr1", 10, 20));
        let m = ContactMatrix::new(
            positions,
            vec![
                ContactRecord::new("a", 0, 10, 4.0),
                ContactRecord::new("a", 0, 0, 2.0),
                ContactRecord::new("b", 10, 0, 4.0),
                ContactRecord::new("b", 10, 10, f64::NAN),
                ContactRecord::new("z", 0, 0, 100.0),
            ],
        );
        let cov = contacts_per_bin(&m);
        assert_eq!(
            cov,
            vec![
                (Interval::new("chr1", 0, 10), 3.0),
                (Interval::new("chr1", 10, 20), 2.0),
            ]
        );
    }
}
