// Manufacturer domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Manufacturer {
    Piaggio,
    Altigreen,
    Euler,
    Bajaj,
    Mahindra,
}

impl Manufacturer {
    pub const ALL: [Manufacturer; 5] = [
        Manufacturer::Piaggio,
        Manufacturer::Altigreen,
        Manufacturer::Euler,
        Manufacturer::Bajaj,
        Manufacturer::Mahindra,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Manufacturer::Piaggio => "Piaggio",
            Manufacturer::Altigreen => "Altigreen",
            Manufacturer::Euler => "Euler",
            Manufacturer::Bajaj => "Bajaj",
            Manufacturer::Mahindra => "Mahindra",
        }
    }

    /// Lowercase identifier substituted into source queries.
    pub fn slug(&self) -> String {
        self.name().to_ascii_lowercase()
    }
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Manufacturer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("unknown manufacturer: {}", s))
    }
}
