use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationIdx(usize);

impl StationIdx {
    pub fn new(idx: usize) -> Self {
        Self(idx)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

/// A line and direction of travel, e.g. `Jubilee-Eastbound`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineDirection(String);

impl LineDirection {
    pub fn new(str: &str) -> Self {
        Self(str.to_owned())
    }
}

impl fmt::Display for LineDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Station {
    name: String,
    connections: BTreeMap<LineDirection, BTreeMap<StationIdx, f64>>,
}

impl Station {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            connections: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last write wins for a given neighbour and line.
    pub fn add_connection(&mut self, neighbor: StationIdx, line: &LineDirection, time: f64) {
        self.connections
            .entry(line.clone())
            .or_default()
            .insert(neighbor, time);
    }

    pub fn remove_connection(&mut self, neighbor: StationIdx, line: &LineDirection) -> Option<f64> {
        let neighbors = self.connections.get_mut(line)?;
        let time = neighbors.remove(&neighbor);
        if neighbors.is_empty() {
            self.connections.remove(line);
        }
        time
    }

    /// Neighbours reachable under `line`. Unknown lines yield nothing.
    pub fn connections<'a>(
        &'a self,
        line: &LineDirection,
    ) -> impl Iterator<Item = (StationIdx, f64)> + 'a {
        self.connections
            .get(line)
            .into_iter()
            .flatten()
            .map(|(&neighbor, &time)| (neighbor, time))
    }

    pub fn time_to(&self, neighbor: StationIdx, line: &LineDirection) -> Option<f64> {
        self.connections.get(line)?.get(&neighbor).copied()
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineDirection> {
        self.connections.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut station = Station::new("Bank");
        let line = LineDirection::new("Central-Westbound");
        station.add_connection(StationIdx::new(1), &line, 3.0);
        station.add_connection(StationIdx::new(1), &line, 4.5);

        assert_eq!(station.time_to(StationIdx::new(1), &line), Some(4.5));
        assert_eq!(station.connections(&line).count(), 1);
    }

    #[test]
    fn unknown_line_has_no_connections() {
        let station = Station::new("Bank");
        assert_eq!(
            station
                .connections(&LineDirection::new("Waterloo-City"))
                .count(),
            0
        );
    }

    #[test]
    fn remove_connection_drops_empty_lines() {
        let mut station = Station::new("Bank");
        let line = LineDirection::new("Northern-Southbound");
        station.add_connection(StationIdx::new(2), &line, 2.0);

        assert_eq!(station.remove_connection(StationIdx::new(2), &line), Some(2.0));
        assert_eq!(station.remove_connection(StationIdx::new(2), &line), None);
        assert_eq!(station.lines().count(), 0);
    }

    #[test]
    fn lines_are_independent() {
        let mut station = Station::new("Green Park");
        let jubilee = LineDirection::new("Jubilee-Eastbound");
        let victoria = LineDirection::new("Victoria-Northbound");
        station.add_connection(StationIdx::new(1), &jubilee, 2.0);
        station.add_connection(StationIdx::new(1), &victoria, 1.0);

        assert_eq!(station.time_to(StationIdx::new(1), &jubilee), Some(2.0));
        assert_eq!(station.time_to(StationIdx::new(1), &victoria), Some(1.0));
        assert_eq!(
            station.lines().collect::<Vec<_>>(),
            vec![&jubilee, &victoria]
        );
    }
}
