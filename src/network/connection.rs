use std::fmt;

use serde::{Deserialize, Serialize};

use crate::network::station::LineDirection;

/// A track between two stations on one line, the unit of every graph mutation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionDescriptor {
    from: String,
    to: String,
    line: LineDirection,
    #[serde(default)]
    time: f64,
}

impl ConnectionDescriptor {
    pub fn new(from: &str, to: &str, line: &str, time: f64) -> Self {
        Self {
            from: from.to_owned(),
            to: to.to_owned(),
            line: LineDirection::new(line),
            time,
        }
    }

    /// A descriptor for operations that ignore the time (closures, reopenings, clearing delays).
    pub fn track(from: &str, to: &str, line: &str) -> Self {
        Self::new(from, to, line, 0.0)
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn line(&self) -> &LineDirection {
        &self.line
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn key(&self) -> TrackKey {
        TrackKey::new(&self.from, &self.to, &self.line)
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} on {} ({} mins)",
            self.from, self.to, self.line, self.time
        )
    }
}

/// Identifies a track for closure and delay bookkeeping.
///
/// Tracks are traversable both ways, so the endpoints are stored in lexical
/// order and `(A, B, L)` and `(B, A, L)` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TrackKey {
    from: String,
    to: String,
    line: LineDirection,
}

impl TrackKey {
    pub fn new(from: &str, to: &str, line: &LineDirection) -> Self {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        Self {
            from: from.to_owned(),
            to: to.to_owned(),
            line: line.clone(),
        }
    }

    pub fn line(&self) -> &LineDirection {
        &self.line
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.from, self.to, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_orientation() {
        let there = ConnectionDescriptor::track("Stratford", "West Ham", "Jubilee-Westbound");
        let back = ConnectionDescriptor::track("West Ham", "Stratford", "Jubilee-Westbound");

        assert_eq!(there.key(), back.key());
        assert_eq!(there.key().to_string(), "Stratford-West Ham-Jubilee-Westbound");
    }

    #[test]
    fn key_distinguishes_lines() {
        let jubilee = ConnectionDescriptor::track("Stratford", "West Ham", "Jubilee-Westbound");
        let district = ConnectionDescriptor::track("Stratford", "West Ham", "District-Westbound");

        assert_ne!(jubilee.key(), district.key());
    }
}
