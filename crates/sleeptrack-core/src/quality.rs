//! Sleep quality ratings.

use serde::{Deserialize, Serialize};

/// How well a night went, rated after the session is stopped.
///
/// Persisted as its numeric value (`0..=5`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum SleepQuality {
    VeryBad = 0,
    Poor = 1,
    SoSo = 2,
    #[default]
    Okay = 3,
    PrettyGood = 4,
    Excellent = 5,
}

impl SleepQuality {
    pub fn all() -> &'static [SleepQuality] {
        &[
            SleepQuality::VeryBad,
            SleepQuality::Poor,
            SleepQuality::SoSo,
            SleepQuality::Okay,
            SleepQuality::PrettyGood,
            SleepQuality::Excellent,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            SleepQuality::VeryBad => "Very bad",
            SleepQuality::Poor => "Poor",
            SleepQuality::SoSo => "So-so",
            SleepQuality::Okay => "OK",
            SleepQuality::PrettyGood => "Pretty good",
            SleepQuality::Excellent => "Excellent",
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Self::all().get(usize::from(value)).copied()
    }

    /// Next rating up, saturating at `Excellent`.
    #[must_use]
    pub fn raise(self) -> Self {
        Self::from_value(self.value() + 1).unwrap_or(self)
    }

    /// Next rating down, saturating at `VeryBad`.
    #[must_use]
    pub fn lower(self) -> Self {
        self.value()
            .checked_sub(1)
            .and_then(Self::from_value)
            .unwrap_or(self)
    }
}

impl std::fmt::Display for SleepQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<SleepQuality> for u8 {
    fn from(quality: SleepQuality) -> Self {
        quality.value()
    }
}

impl TryFrom<u8> for SleepQuality {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| format!("sleep quality must be 0-5, got {value}"))
    }
}

impl std::str::FromStr for SleepQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u8>() {
            return Self::try_from(value);
        }
        Self::all()
            .iter()
            .copied()
            .find(|quality| quality.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown sleep quality '{trimmed}' (expected 0-5)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_numeric_scale() {
        let labels: Vec<_> = SleepQuality::all().iter().map(|q| q.label()).collect();
        assert_eq!(
            labels,
            ["Very bad", "Poor", "So-so", "OK", "Pretty good", "Excellent"]
        );
        assert_eq!(SleepQuality::from_value(6), None);
    }

    #[test]
    fn raise_and_lower_saturate() {
        assert_eq!(SleepQuality::Excellent.raise(), SleepQuality::Excellent);
        assert_eq!(SleepQuality::VeryBad.lower(), SleepQuality::VeryBad);
        assert_eq!(SleepQuality::Okay.raise(), SleepQuality::PrettyGood);
        assert_eq!(SleepQuality::Okay.lower(), SleepQuality::SoSo);
    }

    #[test]
    fn parses_numbers_and_labels() {
        assert_eq!("4".parse::<SleepQuality>(), Ok(SleepQuality::PrettyGood));
        assert_eq!("so-so".parse::<SleepQuality>(), Ok(SleepQuality::SoSo));
        assert!("9".parse::<SleepQuality>().is_err());
        assert!("great".parse::<SleepQuality>().is_err());
    }
}
