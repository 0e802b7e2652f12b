use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Lowest raw bureau score.
pub const SCORE_MIN: f64 = 300.0;
/// Highest raw bureau score.
pub const SCORE_MAX: f64 = 950.0;

/// Linear rescale of a raw bureau score onto `[0, 1]`. Scores outside the
/// bureau range are not clamped.
pub fn normalize_score(risk_score: f64) -> f64 {
    (risk_score - SCORE_MIN) / (SCORE_MAX - SCORE_MIN)
}

/// One historical customer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationRecord {
    pub risk_score: f64,
    pub normalized_score: f64,
    pub defaulted: bool,
    pub exposure_amount: f64,
}

impl PopulationRecord {
    pub fn new(risk_score: f64, defaulted: bool, exposure_amount: f64) -> Self {
        Self {
            risk_score,
            normalized_score: normalize_score(risk_score),
            defaulted,
            exposure_amount,
        }
    }

    /// Builds a record from an already normalized score; the raw score is
    /// derived back from the bureau range.
    pub fn with_normalized_score(
        normalized_score: f64,
        defaulted: bool,
        exposure_amount: f64,
    ) -> Self {
        Self {
            risk_score: SCORE_MIN + normalized_score * (SCORE_MAX - SCORE_MIN),
            normalized_score,
            defaulted,
            exposure_amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationStatus {
    Loaded,
    Unavailable,
}

/// Column-oriented, read-only population. Built once at startup and shared
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PopulationTable {
    risk_scores: Vec<f64>,
    normalized_scores: Vec<f64>,
    defaulted: Vec<bool>,
    exposures: Vec<f64>,
    average_exposure: f64,
    status: PopulationStatus,
}

impl PopulationTable {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PopulationRecord>,
    {
        let records = records.into_iter();
        let (lower, _) = records.size_hint();
        let mut table = Self {
            risk_scores: Vec::with_capacity(lower),
            normalized_scores: Vec::with_capacity(lower),
            defaulted: Vec::with_capacity(lower),
            exposures: Vec::with_capacity(lower),
            average_exposure: 0.0,
            status: PopulationStatus::Loaded,
        };

        for record in records {
            table.risk_scores.push(record.risk_score);
            table.normalized_scores.push(record.normalized_score);
            table.defaulted.push(record.defaulted);
            table.exposures.push(record.exposure_amount);
        }

        table.average_exposure = if table.exposures.is_empty() {
            0.0
        } else {
            table.exposures.iter().sum::<f64>() / table.exposures.len() as f64
        };

        table
    }

    /// Placeholder used when the population source could not be read.
    pub fn unavailable() -> Self {
        Self {
            risk_scores: Vec::new(),
            normalized_scores: Vec::new(),
            defaulted: Vec::new(),
            exposures: Vec::new(),
            average_exposure: 0.0,
            status: PopulationStatus::Unavailable,
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PopulationError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (index, row) in csv_reader.deserialize::<PopulationRow>().enumerate() {
            let row = row?;
            // header occupies line 1
            let line = index + 2;
            if !row.score.is_finite() {
                return Err(PopulationError::InvalidRow {
                    line,
                    reason: format!("score {} is not finite", row.score),
                });
            }
            if !row.exposure.is_finite() || row.exposure < 0.0 {
                return Err(PopulationError::InvalidRow {
                    line,
                    reason: format!("exposure {} must be a finite, non-negative amount", row.exposure),
                });
            }
            records.push(PopulationRecord::new(row.score, row.defaulted, row.exposure));
        }

        Ok(Self::from_records(records))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PopulationError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PopulationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Loads the population, degrading to [`PopulationTable::unavailable`] on
    /// failure so analytics callers see an explicit "no data" state.
    pub fn load_or_unavailable(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(table) => {
                info!(
                    path = %path.display(),
                    records = table.len(),
                    average_exposure = table.average_exposure(),
                    "population loaded"
                );
                table
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "population unavailable");
                Self::unavailable()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.normalized_scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized_scores.is_empty()
    }

    pub fn status(&self) -> PopulationStatus {
        self.status
    }

    /// Loaded with at least one record.
    pub fn is_available(&self) -> bool {
        self.status == PopulationStatus::Loaded && !self.is_empty()
    }

    pub fn average_exposure(&self) -> f64 {
        self.average_exposure
    }

    pub fn risk_scores(&self) -> &[f64] {
        &self.risk_scores
    }

    pub fn normalized_scores(&self) -> &[f64] {
        &self.normalized_scores
    }

    pub fn defaulted(&self) -> &[bool] {
        &self.defaulted
    }

    pub fn exposures(&self) -> &[f64] {
        &self.exposures
    }

    pub fn default_count(&self) -> usize {
        count(self.defaulted.iter().copied())
    }

    /// `normalized_score >= threshold` for every record.
    pub fn approval_mask(&self, threshold: f64) -> Vec<bool> {
        self.normalized_scores
            .iter()
            .map(|score| *score >= threshold)
            .collect()
    }

    /// Record count per integer bureau score, ascending by score.
    pub fn score_distribution(&self) -> ScoreDistribution {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for score in &self.risk_scores {
            *counts.entry(score.round() as i64).or_default() += 1;
        }

        ScoreDistribution {
            score_distribution: counts
                .into_iter()
                .map(|(score, count)| ScoreBucket { score, count })
                .collect(),
        }
    }
}

pub(crate) fn count(mask: impl Iterator<Item = bool>) -> usize {
    mask.filter(|selected| *selected).count()
}

pub(crate) fn masked_sum(values: &[f64], mask: impl Iterator<Item = bool>) -> f64 {
    values
        .iter()
        .zip(mask)
        .filter_map(|(value, selected)| selected.then_some(*value))
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBucket {
    pub score: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreDistribution {
    pub score_distribution: Vec<ScoreBucket>,
}

#[derive(Debug, Deserialize)]
struct PopulationRow {
    score: f64,
    #[serde(alias = "inadimplente", deserialize_with = "deserialize_flag")]
    defaulted: bool,
    #[serde(alias = "ticket")]
    exposure: f64,
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a 0/1 or true/false default flag, got '{other}'"
        ))),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    #[error("unable to open population file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed population csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid population row at line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
}
