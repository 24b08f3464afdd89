pub mod connection;
pub mod error;
pub mod io;
pub mod station;

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::{
    dijkstra::InterchangePolicy,
    network::{
        connection::{ConnectionDescriptor, TrackKey},
        error::NetworkError,
        station::{LineDirection, Station, StationIdx},
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct AppliedDelay {
    /// Travel time with the delay removed.
    base: f64,
    minutes: f64,
}

/// Stations plus the closure and delay bookkeeping that mutates their tracks.
#[derive(Debug, Default)]
pub struct NetworkGraph {
    stations: Vec<Station>,
    index: HashMap<String, StationIdx>,
    closed_tracks: HashSet<TrackKey>,
    delays: HashMap<TrackKey, AppliedDelay>,
    /// Base time of each closed track, restored on reopening.
    original_times: HashMap<TrackKey, f64>,
    interchange: InterchangePolicy,
}

fn validate_time(key: &TrackKey, time: f64) -> Result<(), NetworkError> {
    if time.is_finite() && time >= 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidTime {
            key: key.clone(),
            time,
        })
    }
}

impl NetworkGraph {
    pub fn new(interchange: InterchangePolicy) -> Self {
        Self {
            interchange,
            ..Default::default()
        }
    }

    pub fn interchange(&self) -> InterchangePolicy {
        self.interchange
    }

    pub fn add_station(&mut self, name: &str) -> StationIdx {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }

        let idx = StationIdx::new(self.stations.len());
        self.stations.push(Station::new(name));
        self.index.insert(name.to_owned(), idx);
        debug!(station = name, "Added station");
        idx
    }

    pub fn station_index(&self, name: &str) -> Result<StationIdx, NetworkError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownStation(name.to_owned()))
    }

    pub fn station(&self, idx: StationIdx) -> &Station {
        &self.stations[idx.get()]
    }

    pub fn station_name(&self, idx: StationIdx) -> &str {
        self.station(idx).name()
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Active delays, sorted by track.
    pub fn delays(&self) -> Vec<(&TrackKey, f64)> {
        self.delays
            .iter()
            .map(|(key, delay)| (key, delay.minutes))
            .sorted_by(|a, b| a.0.cmp(b.0))
            .collect()
    }

    pub fn closed_tracks(&self) -> Vec<&TrackKey> {
        self.closed_tracks.iter().sorted().collect()
    }

    fn endpoints(
        &self,
        desc: &ConnectionDescriptor,
    ) -> Result<(StationIdx, StationIdx), NetworkError> {
        Ok((
            self.station_index(desc.from())?,
            self.station_index(desc.to())?,
        ))
    }

    /// Writes the track on both endpoints unless it is closed.
    fn put_track(&mut self, from: StationIdx, to: StationIdx, key: &TrackKey, time: f64) -> bool {
        if self.closed_tracks.contains(key) {
            return false;
        }

        self.stations[from.get()].add_connection(to, key.line(), time);
        self.stations[to.get()].add_connection(from, key.line(), time);
        true
    }

    fn remove_track(&mut self, from: StationIdx, to: StationIdx, line: &LineDirection) {
        self.stations[from.get()].remove_connection(to, line);
        self.stations[to.get()].remove_connection(from, line);
    }

    /// Travel time of the track with any applied delay removed, if the track is known.
    fn base_time(&self, from: StationIdx, to: StationIdx, key: &TrackKey) -> Option<f64> {
        if let Some(delay) = self.delays.get(key) {
            return Some(delay.base);
        }
        if self.closed_tracks.contains(key) {
            return self.original_times.get(key).copied();
        }
        self.station(from).time_to(to, key.line())
    }

    pub fn add_connection(&mut self, desc: &ConnectionDescriptor) -> Result<(), NetworkError> {
        let (from, to) = self.endpoints(desc)?;
        let key = desc.key();
        validate_time(&key, desc.time())?;

        // An explicit time on a delayed track is the delayed time.
        let base = match self.delays.get(&key) {
            Some(delay) => {
                let base = desc.time() - delay.minutes;
                validate_time(&key, base)?;
                Some(base)
            }
            None => None,
        };

        if !self.put_track(from, to, &key, desc.time()) {
            warn!(track = %key, "Track is closed, connection not added");
            return Ok(());
        }

        if let (Some(delay), Some(base)) = (self.delays.get_mut(&key), base) {
            delay.base = base;
        }

        debug!(track = %key, time = desc.time(), "Added connection");
        Ok(())
    }

    /// Delays the track by `desc.time()` minutes, replacing any earlier delay.
    pub fn add_delay(&mut self, desc: &ConnectionDescriptor) -> Result<(), NetworkError> {
        let (from, to) = self.endpoints(desc)?;
        let key = desc.key();
        let base = self
            .base_time(from, to, &key)
            .ok_or_else(|| NetworkError::UnknownTrack(key.clone()))?;

        let minutes = desc.time();
        let delayed = base + minutes;
        validate_time(&key, delayed)?;

        self.delays.insert(key.clone(), AppliedDelay { base, minutes });
        if self.put_track(from, to, &key, delayed) {
            debug!(track = %key, delay = minutes, time = delayed, "Applied delay");
        } else {
            debug!(track = %key, delay = minutes, "Recorded delay on closed track");
        }
        Ok(())
    }

    pub fn remove_delay(&mut self, desc: &ConnectionDescriptor) -> Result<(), NetworkError> {
        let (from, to) = self.endpoints(desc)?;
        let key = desc.key();
        let base = self
            .base_time(from, to, &key)
            .ok_or_else(|| NetworkError::UnknownTrack(key.clone()))?;
        validate_time(&key, base)?;

        self.delays.remove(&key);
        self.put_track(from, to, &key, base);
        debug!(track = %key, time = base, "Removed delay");
        Ok(())
    }

    pub fn close_track(&mut self, desc: &ConnectionDescriptor) -> Result<(), NetworkError> {
        let (from, to) = self.endpoints(desc)?;
        let key = desc.key();

        if self.station(from).time_to(to, desc.line()).is_some() {
            if let Some(base) = self.base_time(from, to, &key) {
                self.original_times.insert(key.clone(), base);
            }
        } else if !self.original_times.contains_key(&key) {
            warn!(track = %key, "Closing a track that has no connection");
        }

        self.closed_tracks.insert(key.clone());
        self.remove_track(from, to, desc.line());
        debug!(track = %key, "Closed track");
        Ok(())
    }

    /// Reopens a closed track at its pre-closure base time plus any delay applied since.
    pub fn open_track(&mut self, desc: &ConnectionDescriptor) -> Result<(), NetworkError> {
        let (from, to) = self.endpoints(desc)?;
        let key = desc.key();

        if !self.closed_tracks.contains(&key) {
            return Err(NetworkError::TrackNotClosed(key));
        }
        let base = self
            .original_times
            .get(&key)
            .copied()
            .ok_or_else(|| NetworkError::MissingOriginalTime(key.clone()))?;
        let time = base + self.delays.get(&key).map_or(0.0, |delay| delay.minutes);

        self.closed_tracks.remove(&key);
        self.original_times.remove(&key);
        self.put_track(from, to, &key, time);
        debug!(track = %key, time, "Reopened track");
        Ok(())
    }
}
