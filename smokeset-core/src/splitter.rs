// ============================================================================
// smokeset-core/src/splitter.rs
// ============================================================================
//
// DATASET SPLITTER: Leakage-Free Train/Val/Test Partitioning
//
// Images extracted from the same fire sequence look almost identical, so the
// splitter partitions sequences, never individual images: every row of one
// sequence lands in the same subset. Requested ratios apply to sequence
// counts; the realized ratios (row fractions) are reported next to them.
//
// KEY COMPONENTS:
// - SplitRatios: validated, ordered split names and fractions
// - DatasetSplitter: configuration plus the fit operation
// - SplitAssignment: sequences and rows per subset of a plain table
// - DatasetSplits: per-subset dataset views with their transforms
//
// ALGORITHM (fixed_size):
// 1. Distinct sequence ids in first-appearance order, shuffled with the seed
// 2. Subsets filled in ratio order with round(ratio * sequences) sequences
// 3. Leftover sequences join the last subset

use crate::config::{DEFAULT_SEED, DEFAULT_SPLIT_RATIOS, RATIO_SUM_TOLERANCE, SEQUENCE_COLUMN};
use crate::dataset::WildfireDataset;
use crate::error::{CoreError, CoreResult};
use crate::table::Table;
use crate::transforms::ImageTransform;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// ALGORITHMS
// ============================================================================

/// Splitting algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAlgorithm {
    /// Subset sizes fixed by sequence-count ratios
    FixedSize,
}

impl SplitAlgorithm {
    pub const ALLOWED: [SplitAlgorithm; 1] = [SplitAlgorithm::FixedSize];

    pub fn as_str(&self) -> &'static str {
        match self {
            SplitAlgorithm::FixedSize => "fixed_size",
        }
    }
}

impl fmt::Display for SplitAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitAlgorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SplitAlgorithm::ALLOWED
            .into_iter()
            .find(|algorithm| algorithm.as_str() == s)
            .ok_or_else(|| {
                CoreError::Configuration(format!(
                    "Algorithm {} is unavailable. Please choose from: {}",
                    s,
                    SplitAlgorithm::FixedSize
                ))
            })
    }
}

// ============================================================================
// RATIOS
// ============================================================================

/// Split names and requested fractions, in assignment order.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRatios {
    entries: Vec<(String, f64)>,
}

impl SplitRatios {
    /// Validates ratios: at least one split, unique names, finite non-negative
    /// fractions summing to at most 1.0.
    pub fn new<I, S>(ratios: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let entries: Vec<(String, f64)> = ratios
            .into_iter()
            .map(|(name, ratio)| (name.into(), ratio))
            .collect();

        if entries.is_empty() {
            return Err(CoreError::Configuration(
                "At least one split ratio is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (name, ratio) in &entries {
            if !seen.insert(name.as_str()) {
                return Err(CoreError::Configuration(format!(
                    "Split '{}' is listed more than once",
                    name
                )));
            }
            if !ratio.is_finite() || *ratio < 0.0 {
                return Err(CoreError::Configuration(format!(
                    "Ratio of split '{}' must be a non-negative number, got {}",
                    name, ratio
                )));
            }
        }

        let sum: f64 = entries.iter().map(|(_, ratio)| ratio).sum();
        if sum > 1.0 + RATIO_SUM_TOLERANCE {
            return Err(CoreError::Configuration(format!(
                "Ratios sum to {:.4}, which is more than 1",
                sum
            )));
        }

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, ratio)| (name.as_str(), *ratio))
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| *n == name).map(|(_, ratio)| ratio)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            entries: DEFAULT_SPLIT_RATIOS
                .iter()
                .map(|(name, ratio)| (name.to_string(), *ratio))
                .collect(),
        }
    }
}

/// Parses one `name=fraction` pair, e.g. `train=0.7`.
pub fn parse_ratio(s: &str) -> CoreResult<(String, f64)> {
    let (name, ratio) = s.split_once('=').ok_or_else(|| {
        CoreError::Configuration(format!("Expected NAME=FRACTION, got '{}'", s))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Configuration(format!("Missing split name in '{}'", s)));
    }
    let ratio = ratio.trim().parse::<f64>().map_err(|_| {
        CoreError::Configuration(format!("Ratio '{}' of split '{}' is not a number", ratio, name))
    })?;
    Ok((name.to_string(), ratio))
}

// ============================================================================
// SPLITTER
// ============================================================================

/// Splits sequence-grouped datasets into named subsets.
///
/// The algorithm name is checked when fitting, so a splitter built with an
/// unknown algorithm only fails at [`DatasetSplitter::fit`]. Use
/// [`DatasetSplitter::with_algorithm_checked`] to fail at configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use smokeset_core::{DatasetSplitter, SplitRatios, WildfireDataset};
/// use std::path::Path;
///
/// let ratios = SplitRatios::new([("train", 0.7), ("val", 0.15), ("test", 0.15)])?;
/// let dataset = WildfireDataset::from_path(Path::new("wildfire.csv"), "frames")?;
/// let splits = DatasetSplitter::new(ratios).with_seed(42).fit(&dataset)?;
/// for (name, n) in splits.assignment().n_samples() {
///     println!("{}: {} images", name, n);
/// }
/// # Ok::<(), smokeset_core::CoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DatasetSplitter {
    ratios: SplitRatios,
    algorithm: String,
    seed: u64,
    sequence_column: String,
    transforms: HashMap<String, Arc<dyn ImageTransform>>,
}

impl DatasetSplitter {
    pub fn new(ratios: SplitRatios) -> Self {
        Self {
            ratios,
            algorithm: SplitAlgorithm::FixedSize.as_str().to_string(),
            seed: DEFAULT_SEED,
            sequence_column: SEQUENCE_COLUMN.to_string(),
            transforms: HashMap::new(),
        }
    }

    /// Sets the algorithm by name without validating it.
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Sets the algorithm by name, failing now if it is unknown.
    pub fn with_algorithm_checked(mut self, algorithm: &str) -> CoreResult<Self> {
        let parsed: SplitAlgorithm = algorithm.parse()?;
        self.algorithm = parsed.as_str().to_string();
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sequence_column(mut self, column: impl Into<String>) -> Self {
        self.sequence_column = column.into();
        self
    }

    /// Attaches a transform to one subset; subsets without one get none.
    pub fn with_transform(mut self, split: impl Into<String>, transform: Arc<dyn ImageTransform>) -> Self {
        self.transforms.insert(split.into(), transform);
        self
    }

    pub fn ratios(&self) -> &SplitRatios {
        &self.ratios
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Assigns every row of `table` to a subset.
    pub fn assign(&self, table: &Table) -> CoreResult<SplitAssignment> {
        let algorithm: SplitAlgorithm = self.algorithm.parse()?;
        match algorithm {
            SplitAlgorithm::FixedSize => self.assign_fixed_size(table),
        }
    }

    fn assign_fixed_size(&self, table: &Table) -> CoreResult<SplitAssignment> {
        let seq_col = table.column_index(&self.sequence_column)?;

        let mut sequences: Vec<&str> = Vec::new();
        let mut rows_of: Vec<Vec<usize>> = Vec::new();
        let mut index_of: HashMap<&str, usize> = HashMap::new();
        for row in 0..table.len() {
            let id = table.cell(row, seq_col);
            let index = *index_of.entry(id).or_insert_with(|| {
                sequences.push(id);
                rows_of.push(Vec::new());
                sequences.len() - 1
            });
            rows_of[index].push(row);
        }

        let mut order: Vec<usize> = (0..sequences.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        order.shuffle(&mut rng);

        let total = order.len();
        let last = self.ratios.len() - 1;
        let mut next = 0;
        let mut splits = Vec::with_capacity(self.ratios.len());
        for (i, (name, ratio)) in self.ratios.iter().enumerate() {
            let remaining = total - next;
            let take = if i == last {
                remaining
            } else {
                ((ratio * total as f64).round() as usize).min(remaining)
            };
            let picked = &order[next..next + take];
            next += take;

            let mut rows: Vec<usize> = picked.iter().flat_map(|&s| rows_of[s].iter().copied()).collect();
            rows.sort_unstable();
            debug!("Split '{}' gets {} sequences ({} rows)", name, take, rows.len());

            splits.push(SplitPart {
                name: name.to_string(),
                requested_ratio: ratio,
                sequences: picked.iter().map(|&s| sequences[s].to_string()).collect(),
                rows,
            });
        }

        let assignment = SplitAssignment {
            splits,
            total_rows: table.len(),
        };
        info!(
            "Split {} sequences ({} rows): {}",
            total,
            table.len(),
            assignment
                .n_samples()
                .iter()
                .map(|(name, n)| format!("{}={}", name, n))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(assignment)
    }

    /// Splits a dataset into per-subset views with their transforms attached.
    pub fn fit(&self, dataset: &WildfireDataset) -> CoreResult<DatasetSplits> {
        if let Some(unknown) = self.transforms.keys().find(|name| self.ratios.get(name).is_none()) {
            return Err(CoreError::Configuration(format!(
                "Transform given for unknown split '{}'",
                unknown
            )));
        }

        let assignment = self.assign(dataset.metadata())?;
        let subsets = assignment
            .splits
            .iter()
            .map(|part| {
                dataset
                    .subset(&part.rows)
                    .with_transform(self.transforms.get(&part.name).cloned())
            })
            .collect();

        Ok(DatasetSplits { assignment, subsets })
    }
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct SplitPart {
    name: String,
    requested_ratio: f64,
    sequences: Vec<String>,
    rows: Vec<usize>,
}

/// Sequences and rows of every subset.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitAssignment {
    splits: Vec<SplitPart>,
    total_rows: usize,
}

impl SplitAssignment {
    fn part(&self, name: &str) -> Option<&SplitPart> {
        self.splits.iter().find(|part| part.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.splits.iter().map(|part| part.name.as_str())
    }

    /// Row indices of one subset, ascending.
    pub fn rows(&self, name: &str) -> Option<&[usize]> {
        self.part(name).map(|part| part.rows.as_slice())
    }

    /// Sequence ids of one subset, in assignment order.
    pub fn sequences(&self, name: &str) -> Option<&[String]> {
        self.part(name).map(|part| part.sequences.as_slice())
    }

    /// Row count per subset.
    pub fn n_samples(&self) -> Vec<(&str, usize)> {
        self.splits
            .iter()
            .map(|part| (part.name.as_str(), part.rows.len()))
            .collect()
    }

    /// Realized row fraction per subset.
    pub fn ratios(&self) -> Vec<(&str, f64)> {
        self.splits
            .iter()
            .map(|part| (part.name.as_str(), self.fraction(part.rows.len())))
            .collect()
    }

    fn fraction(&self, rows: usize) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            rows as f64 / self.total_rows as f64
        }
    }

    /// Table of one subset's rows.
    pub fn table(&self, source: &Table, name: &str) -> Option<Table> {
        self.rows(name).map(|rows| source.select_rows(rows))
    }

    pub fn summary(&self, seed: u64, algorithm: &str) -> SplitSummary {
        SplitSummary {
            algorithm: algorithm.to_string(),
            seed,
            total_rows: self.total_rows,
            splits: self
                .splits
                .iter()
                .map(|part| SplitStats {
                    name: part.name.clone(),
                    requested_ratio: part.requested_ratio,
                    realized_ratio: self.fraction(part.rows.len()),
                    n_samples: part.rows.len(),
                    n_sequences: part.sequences.len(),
                })
                .collect(),
        }
    }
}

/// Serializable report of a split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSummary {
    pub algorithm: String,
    pub seed: u64,
    pub total_rows: usize,
    pub splits: Vec<SplitStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitStats {
    pub name: String,
    pub requested_ratio: f64,
    pub realized_ratio: f64,
    pub n_samples: usize,
    pub n_sequences: usize,
}

/// Dataset views produced by [`DatasetSplitter::fit`].
#[derive(Debug, Clone)]
pub struct DatasetSplits {
    assignment: SplitAssignment,
    subsets: Vec<WildfireDataset>,
}

impl DatasetSplits {
    pub fn subset(&self, name: &str) -> Option<&WildfireDataset> {
        self.assignment
            .splits
            .iter()
            .position(|part| part.name == name)
            .map(|index| &self.subsets[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WildfireDataset)> {
        self.assignment.names().zip(self.subsets.iter())
    }

    pub fn assignment(&self) -> &SplitAssignment {
        &self.assignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(groups: &[(&str, usize)]) -> Table {
        let mut table = Table::new(["imgFile", "fire_id", "fire"]);
        let mut n = 0;
        for (id, count) in groups {
            for _ in 0..*count {
                table
                    .push_row(vec![format!("{:04}.jpg", n), id.to_string(), "1".to_string()])
                    .unwrap();
                n += 1;
            }
        }
        table
    }

    #[test]
    fn test_consistent_ratios_keep_order() {
        let ratios = SplitRatios::new([("train", 0.7), ("val", 0.15), ("test", 0.15)]).unwrap();
        let names: Vec<&str> = ratios.names().collect();
        assert_eq!(names, ["train", "val", "test"]);
        assert_eq!(ratios.get("val"), Some(0.15));
    }

    #[test]
    fn test_inconsistent_ratios_are_rejected() {
        let result = SplitRatios::new([("train", 0.9), ("val", 0.2), ("test", 0.1)]);
        assert!(matches!(result, Err(CoreError::Configuration(_))));
        assert!(SplitRatios::new([("train", -0.1)]).is_err());
        assert!(SplitRatios::new([("train", 0.5), ("train", 0.2)]).is_err());
        assert!(SplitRatios::new(Vec::<(String, f64)>::new()).is_err());
    }

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("train=0.7").unwrap(), ("train".to_string(), 0.7));
        assert!(parse_ratio("train").is_err());
        assert!(parse_ratio("=0.2").is_err());
        assert!(parse_ratio("val=abc").is_err());
    }

    #[test]
    fn test_sequences_never_straddle_splits() {
        let groups: Vec<(String, usize)> = (0..20).map(|i| (format!("{}.0", i), 1 + i % 4)).collect();
        let groups: Vec<(&str, usize)> = groups.iter().map(|(id, n)| (id.as_str(), *n)).collect();
        let table = table(&groups);

        let ratios = SplitRatios::new([("train", 0.5), ("val", 0.25), ("test", 0.25)]).unwrap();
        let assignment = DatasetSplitter::new(ratios).assign(&table).unwrap();

        let mut seen_rows = HashSet::new();
        let mut owner: HashMap<&str, &str> = HashMap::new();
        for name in ["train", "val", "test"] {
            for &row in assignment.rows(name).unwrap() {
                assert!(seen_rows.insert(row));
                let id = table.cell(row, 1);
                assert_eq!(*owner.entry(id).or_insert(name), name);
            }
        }
        assert_eq!(seen_rows.len(), table.len());
        assert_eq!(assignment.sequences("train").unwrap().len(), 10);
        assert_eq!(assignment.sequences("val").unwrap().len(), 5);
        assert_eq!(assignment.sequences("test").unwrap().len(), 5);
    }

    #[test]
    fn test_leftover_sequences_join_last_split() {
        let table = table(&[("a", 1), ("b", 1), ("c", 1)]);
        let ratios = SplitRatios::new([("train", 0.5), ("val", 0.2)]).unwrap();
        let assignment = DatasetSplitter::new(ratios).assign(&table).unwrap();
        // round(1.5) = 2 for train, the remaining one for val
        assert_eq!(assignment.n_samples(), vec![("train", 2), ("val", 1)]);
    }

    #[test]
    fn test_same_seed_same_assignment() {
        let groups: Vec<(String, usize)> = (0..50).map(|i| (i.to_string(), 3)).collect();
        let groups: Vec<(&str, usize)> = groups.iter().map(|(id, n)| (id.as_str(), *n)).collect();
        let table = table(&groups);

        let splitter = DatasetSplitter::new(SplitRatios::default()).with_seed(7);
        assert_eq!(splitter.assign(&table).unwrap(), splitter.assign(&table).unwrap());

        let other = DatasetSplitter::new(SplitRatios::default()).with_seed(8);
        assert_ne!(
            splitter.assign(&table).unwrap().sequences("train"),
            other.assign(&table).unwrap().sequences("train")
        );
    }

    #[test]
    fn test_unknown_algorithm_fails_at_assign() {
        let table = table(&[("a", 2)]);
        let splitter = DatasetSplitter::new(SplitRatios::default()).with_algorithm("wtf");
        assert_eq!(splitter.algorithm(), "wtf");
        assert!(matches!(splitter.assign(&table), Err(CoreError::Configuration(_))));

        let eager = DatasetSplitter::new(SplitRatios::default()).with_algorithm_checked("wtf");
        assert!(eager.is_err());
    }

    #[test]
    fn test_missing_sequence_column() {
        let table = table(&[("a", 2)]);
        let splitter = DatasetSplitter::new(SplitRatios::default()).with_sequence_column("sequence");
        assert!(matches!(splitter.assign(&table), Err(CoreError::MissingColumn(_))));
    }

    #[test]
    fn test_summary_serializes() {
        let table = table(&[("a", 2), ("b", 2)]);
        let ratios = SplitRatios::new([("train", 0.5), ("val", 0.5)]).unwrap();
        let summary = DatasetSplitter::new(ratios).assign(&table).unwrap().summary(42, "fixed_size");
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_rows"], 4);
        assert_eq!(json["splits"][0]["n_samples"], 2);
        assert_eq!(json["splits"][1]["realized_ratio"], 0.5);
    }
}
