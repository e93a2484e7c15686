//! Weather queries: parsing sentences into model inputs and clamping them to
//! the ranges seen in training data.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ForestError;

static QUERY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*today\s+is\s+(-?\d+(?:\.\d+)?)\s+degree\s+celcuis\s+with\s+(-?\d+(?:\.\d+)?)\s*%\s*humidity\s+in\s+([a-z]+)\s*\.?\s*$",
    )
    .expect("query pattern is valid")
});

const MONTHS: [(&str, u32); 24] = [
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
];

/// Inputs to the forest, in feature order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherParameters {
    pub temperature: f64,
    pub humidity: f64,
    pub month: u32,
}

impl WeatherParameters {
    /// Feature vector as seen by the trees: temperature, humidity, month.
    pub fn features(&self) -> [f64; 3] {
        [self.temperature, self.humidity, f64::from(self.month)]
    }

    /// Pull every value into `ranges`. Out-of-range values are never an
    /// error.
    pub fn clamped(self, ranges: &ClampRanges) -> Self {
        Self {
            temperature: ranges.temperature.clamp(self.temperature),
            humidity: ranges.humidity.clamp(self.humidity),
            month: ranges.month.clamp(self.month),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

/// Valid input ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClampRanges {
    pub temperature: Bounds<f64>,
    pub humidity: Bounds<f64>,
    pub month: Bounds<u32>,
}

impl ClampRanges {
    /// The ranges covered by the training data, including its four-month
    /// window.
    pub fn observed_training_window() -> Self {
        Self {
            month: Bounds { min: 1, max: 4 },
            ..Self::default()
        }
    }
}

impl Default for ClampRanges {
    fn default() -> Self {
        Self {
            temperature: Bounds {
                min: 5.1,
                max: 22.5,
            },
            humidity: Bounds {
                min: 40.0,
                max: 86.0,
            },
            month: Bounds { min: 1, max: 12 },
        }
    }
}

/// Map an English month name or abbreviation to 1-12.
pub fn month_number(token: &str) -> Option<u32> {
    let token = token.to_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|&(_, number)| number)
}

/// Parse `"Today is <n> degree celcuis with <n>% humidity in <month>"`.
///
/// Matching ignores case. The misspelt "celcuis" is the accepted spelling.
pub fn extract(sentence: &str, ranges: &ClampRanges) -> Result<WeatherParameters, ForestError> {
    let mismatch = || ForestError::PatternMismatch {
        input: sentence.to_owned(),
    };

    let captures = QUERY_PATTERN.captures(sentence).ok_or_else(mismatch)?;

    let temperature = captures[1].parse::<f64>().map_err(|_| mismatch())?;
    let humidity = captures[2].parse::<f64>().map_err(|_| mismatch())?;
    let month = month_number(&captures[3]).ok_or_else(|| ForestError::UnknownMonth {
        token: captures[3].to_owned(),
    })?;

    Ok(WeatherParameters {
        temperature,
        humidity,
        month,
    }
    .clamped(ranges))
}

/// A query given either as a sentence or as raw values.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    Sentence(String),
    Numeric(WeatherParameters),
}

impl WeatherQuery {
    pub fn resolve(&self, ranges: &ClampRanges) -> Result<WeatherParameters, ForestError> {
        match self {
            WeatherQuery::Sentence(sentence) => extract(sentence, ranges),
            WeatherQuery::Numeric(parameters) => Ok(parameters.clamped(ranges)),
        }
    }
}
