//! Shared value types: difficulty tiers, grounding modes, identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TopicId = String;
pub type SubjectId = String;
pub type AuthorId = String;

/// Difficulty tier of a generated question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    /// Fixed join order for multi-tier generation.
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Tier::Easy),
            "medium" => Ok(Tier::Medium),
            "hard" => Ok(Tier::Hard),
            other => Err(format!(
                "Invalid tier: {} (must be easy, medium, or hard)",
                other
            )),
        }
    }
}

/// Requested number of questions per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    #[serde(default)]
    pub easy: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub hard: u32,
}

impl TierCounts {
    pub fn new(easy: u32, medium: u32, hard: u32) -> Self {
        Self { easy, medium, hard }
    }

    pub fn get(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Easy => self.easy,
            Tier::Medium => self.medium,
            Tier::Hard => self.hard,
        }
    }

    /// Tiers with a positive count, in join order.
    pub fn active_tiers(&self) -> impl Iterator<Item = (Tier, u32)> + '_ {
        Tier::ALL
            .into_iter()
            .map(|tier| (tier, self.get(tier)))
            .filter(|(_, count)| *count > 0)
    }

    pub fn total(&self) -> u64 {
        u64::from(self.easy) + u64::from(self.medium) + u64::from(self.hard)
    }
}

/// Grounding mode as requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedMode {
    Text,
    Pdf,
    Auto,
}

impl FromStr for RequestedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(RequestedMode::Text),
            "pdf" => Ok(RequestedMode::Pdf),
            "auto" => Ok(RequestedMode::Auto),
            other => Err(format!(
                "Invalid mode: {} (must be text, pdf, or auto)",
                other
            )),
        }
    }
}

/// Effective grounding mode after selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Text,
    Pdf,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Text => "text",
            Mode::Pdf => "pdf",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering mode of a visual scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualMode {
    #[serde(rename = "3d")]
    ThreeD,
    #[serde(rename = "2d")]
    TwoD,
}

impl VisualMode {
    pub fn as_str(self) -> &'static str {
        match self {
            VisualMode::ThreeD => "3d",
            VisualMode::TwoD => "2d",
        }
    }
}

impl fmt::Display for VisualMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "3d" => Ok(VisualMode::ThreeD),
            "2d" => Ok(VisualMode::TwoD),
            other => Err(format!("Invalid visual mode: {} (must be 3d or 2d)", other)),
        }
    }
}
