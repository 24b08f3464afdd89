use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use serde::Deserialize;

use crate::{
    dijkstra::InterchangePolicy,
    network::{connection::ConnectionDescriptor, error::NetworkError, NetworkGraph},
};

/// A network and the disruptions applied to it, as read from a JSON file.
///
/// Groups are applied in field order: stations, connections, delays, cleared
/// delays, closures and finally reopenings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub interchange_penalty: Option<f64>,
    pub stations: Vec<String>,
    pub connections: Vec<ConnectionDescriptor>,
    pub delays: Vec<ConnectionDescriptor>,
    pub cleared_delays: Vec<ConnectionDescriptor>,
    pub closures: Vec<ConnectionDescriptor>,
    pub reopenings: Vec<ConnectionDescriptor>,
}

fn apply_all<F>(
    graph: &mut NetworkGraph,
    descs: &[ConnectionDescriptor],
    operation: &str,
    f: F,
) -> anyhow::Result<()>
where
    F: Fn(&mut NetworkGraph, &ConnectionDescriptor) -> Result<(), NetworkError>,
{
    for desc in descs {
        f(graph, desc).with_context(|| format!("Failed to {operation}: {desc}"))?;
    }
    Ok(())
}

impl Scenario {
    pub fn read<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let f = File::open(&path)
            .with_context(|| format!("Failed to open {}", path.as_ref().display()))?;
        let rdr = BufReader::new(f);

        serde_json::from_reader(rdr).context("Failed to parse network file")
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("Failed to parse network")
    }

    pub fn interchange_policy(&self) -> Result<InterchangePolicy, NetworkError> {
        self.interchange_penalty
            .map_or(Ok(InterchangePolicy::Strict), InterchangePolicy::penalty)
    }

    pub fn apply(&self, graph: &mut NetworkGraph) -> anyhow::Result<()> {
        for name in &self.stations {
            graph.add_station(name);
        }

        apply_all(graph, &self.connections, "add connection", NetworkGraph::add_connection)?;
        apply_all(graph, &self.delays, "add delay", NetworkGraph::add_delay)?;
        apply_all(graph, &self.cleared_delays, "remove delay", NetworkGraph::remove_delay)?;
        apply_all(graph, &self.closures, "close track", NetworkGraph::close_track)?;
        apply_all(graph, &self.reopenings, "open track", NetworkGraph::open_track)?;

        Ok(())
    }
}
