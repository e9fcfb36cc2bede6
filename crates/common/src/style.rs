//! Summary style settings shared by prompt building and the usage log

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SummaryBenchError;

/// Requested writing tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Academic,
    Casual,
}

/// Requested summary length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LengthSetting {
    Short,
    #[default]
    Medium,
    Long,
}

/// Where the input document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    #[default]
    Text,
    File,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Neutral, Tone::Academic, Tone::Casual];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "Neutral",
            Tone::Academic => "Academic",
            Tone::Casual => "Casual",
        }
    }
}

impl LengthSetting {
    pub const ALL: [LengthSetting; 3] =
        [LengthSetting::Short, LengthSetting::Medium, LengthSetting::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthSetting::Short => "Short",
            LengthSetting::Medium => "Medium",
            LengthSetting::Long => "Long",
        }
    }
}

impl InputSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputSource::Text => "text",
            InputSource::File => "file",
        }
    }
}

impl FromStr for Tone {
    type Err = SummaryBenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SummaryBenchError::invalid_input(format!("unknown tone: {}", s)))
    }
}

impl FromStr for LengthSetting {
    type Err = SummaryBenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LengthSetting::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SummaryBenchError::invalid_input(format!("unknown length: {}", s)))
    }
}

impl FromStr for InputSource {
    type Err = SummaryBenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(InputSource::Text),
            "file" => Ok(InputSource::File),
            other => Err(SummaryBenchError::invalid_input(format!(
                "unknown input source: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LengthSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
