use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::iter::Enumerate;
use std::path::{Path, PathBuf};

use rust_lapper::Interval as LapperInterval;

use crate::error::{Error, Result};

pub type Iv = LapperInterval<u64, u64>;

/// A genomic span on 0-based half-open coordinates
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `chrom-start-end`, the accumulator key of a region
    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.chrom, self.start, self.end)
    }
}

// The output is wrapped in a Result to allow matching on errors
// Returns an Iterator to the Reader of the lines of the file.
pub fn read_lines<P>(filename: P) -> io::Result<io::Lines<io::BufReader<File>>>
where
    P: AsRef<Path>,
{
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}

/// One tab-separated data line and its 1-based line number
#[derive(Debug)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Iterates the data lines of a BED-like file.
/// Blank lines and `#`, `track` or `browser` headers are skipped.
pub struct Records {
    path: PathBuf,
    lines: Enumerate<io::Lines<io::BufReader<File>>>,
}

impl Records {
    pub fn open(path: &Path) -> Result<Self> {
        let lines = read_lines(path).map_err(|e| Error::io(e, path))?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: lines.enumerate(),
        })
    }
}

impl Iterator for Records {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in self.lines.by_ref() {
            let line = match line {
                Ok(l) => l,
                Err(e) => return Some(Err(Error::io(e, &self.path))),
            };
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.trim().is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("track")
                || trimmed.starts_with("browser")
            {
                continue;
            }
            return Some(Ok(Record {
                line: idx + 1,
                fields: trimmed.split('\t').map(|s| s.to_string()).collect(),
            }));
        }
        None
    }
}

impl Record {
    /// Field `idx`, or a parse error naming how many columns were needed
    pub fn field(&self, path: &Path, idx: usize) -> Result<&str> {
        match self.fields.get(idx) {
            Some(f) => Ok(f.trim()),
            None => Err(Error::parse(
                path,
                self.line,
                format!(
                    "expected at least {} columns, found {}",
                    idx + 1,
                    self.fields.len()
                ),
            )),
        }
    }

    pub fn coord(&self, path: &Path, idx: usize) -> Result<u64> {
        let raw = self.field(path, idx)?;
        raw.parse::<u64>().map_err(|_| {
            Error::parse(path, self.line, format!("non-numeric coordinate '{}'", raw))
        })
    }

    pub fn float(&self, path: &Path, idx: usize) -> Result<f64> {
        let raw = self.field(path, idx)?;
        raw.parse::<f64>()
            .map_err(|_| Error::parse(path, self.line, format!("non-numeric score '{}'", raw)))
    }

    /// Reads `chrom, start, end` from the first three columns
    pub fn interval(&self, path: &Path) -> Result<Interval> {
        let chrom = self.field(path, 0)?;
        let start = self.coord(path, 1)?;
        let end = self.coord(path, 2)?;
        if start > end {
            return Err(Error::parse(
                path,
                self.line,
                format!("start {} is after end {}", start, end),
            ));
        }
        Ok(Interval::new(chrom, start, end))
    }
}

/// Every interval of a BED file, in file order. Fails on the first bad line.
pub fn read_bed(path: &Path) -> Result<Vec<Interval>> {
    info!("parsing {}", path.display());
    let records = Records::open(path)?;
    let mut ret = vec![];
    for rec in records {
        let rec = rec?;
        ret.push(rec.interval(path)?);
    }
    info!("loaded {} intervals", ret.len());
    Ok(ret)
}

/// Buffered writer to `path`, or stdout when no path is given
pub fn create_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).map_err(|e| Error::io(e, p))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

/// Writes `chrom\tstart\tend\tvalue` lines with no header
pub fn write_bedgraph(path: &Path, rows: &[(Interval, f64)]) -> Result<()> {
    info!("writing {}", path.display());
    let mut out = create_output(Some(path))?;
    for (iv, value) in rows {
        writeln!(out, "{}\t{}\t{}\t{}", iv.chrom, iv.start, iv.end, value)
            .map_err(|e| Error::io(e, path))?;
    }
    out.flush().map_err(|e| Error::io(e, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn bed_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[rstest]
    fn skips_headers_and_blanks() {
        let f = bed_file("track name=x\n# comment\n\nchr1\t0\t10\textra\nchr2\t5\t6\n");
        let ivs = read_bed(f.path()).unwrap();
        assert_eq!(
            ivs,
            vec![Interval::new("chr1", 0, 10), Interval::new("chr2", 5, 6)]
        );
    }

    #[rstest]
    #[case("chr1\t0\n", 1)]
    #[case("chr1\t0\t10\nchr1\tx\t10\n", 2)]
    #[case("chr1\t20\t10\n", 1)]
    fn malformed_lines_report_position(#[case] content: &str, #[case] bad_line: usize) {
        let f = bed_file(content);
        match read_bed(f.path()) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, bad_line),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[rstest]
    fn interval_key_and_len() {
        let iv = Interval::new("chr1", 0, 100);
        assert_eq!(iv.key(), "chr1-0-100");
        assert_eq!(iv.len(), 100);
        assert!(Interval::new("chr1", 5, 5).is_empty());
    }

    #[rstest]
    fn bedgraph_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("up.bedgraph");
        write_bedgraph(&out, &[(Interval::new("chr1", 0, 10), -1.5)]).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text, "chr1\t0\t10\t-1.5\n");
    }
}
