use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
};

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::network::{
    error::NetworkError,
    station::{LineDirection, StationIdx},
    NetworkGraph,
};

pub const DEFAULT_INTERCHANGE_PENALTY: f64 = 2.0;

/// Whether a route may change line part way through.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InterchangePolicy {
    /// Routes stay on the line they start on.
    #[default]
    Strict,
    /// Changing line at a station costs a fixed number of minutes.
    Penalty(f64),
}

impl InterchangePolicy {
    pub fn penalty(minutes: f64) -> Result<Self, NetworkError> {
        if minutes.is_finite() && minutes >= 0.0 {
            Ok(Self::Penalty(minutes))
        } else {
            Err(NetworkError::InvalidPenalty(minutes))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    pub from: String,
    pub to: String,
    pub line: LineDirection,
    pub minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub stations: Vec<String>,
    pub total_minutes: f64,
    pub legs: Vec<RouteLeg>,
    pub interchanges: usize,
}

impl RouteResult {
    pub fn empty() -> Self {
        Self {
            stations: vec![],
            total_minutes: 0.0,
            legs: vec![],
            interchanges: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// A station as reached while riding a particular line.
type Node<'a> = (StationIdx, &'a LineDirection);

struct Reached<'a> {
    minutes: f64,
    predecessor: Option<Node<'a>>,
    seq: usize,
}

struct Candidate<'a> {
    minutes: f64,
    seq: usize,
    node: Node<'a>,
}

// Reversed so that `BinaryHeap` pops the earliest-reached cheapest node first.
impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .minutes
            .total_cmp(&self.minutes)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

struct Search<'a> {
    graph: &'a NetworkGraph,
    reached: HashMap<Node<'a>, Reached<'a>>,
    settled: HashSet<Node<'a>>,
    queue: BinaryHeap<Candidate<'a>>,
    pushes: usize,
}

impl<'a> Search<'a> {
    fn new(graph: &'a NetworkGraph) -> Self {
        Self {
            graph,
            reached: HashMap::new(),
            settled: HashSet::new(),
            queue: BinaryHeap::new(),
            pushes: 0,
        }
    }

    fn relax(&mut self, node: Node<'a>, minutes: f64, predecessor: Option<Node<'a>>) {
        if self.settled.contains(&node) {
            return;
        }

        let improves = self
            .reached
            .get(&node)
            .map_or(true, |reached| minutes < reached.minutes);
        if !improves {
            return;
        }

        let seq = self.pushes;
        self.pushes += 1;
        self.reached.insert(
            node,
            Reached {
                minutes,
                predecessor,
                seq,
            },
        );
        self.queue.push(Candidate { minutes, seq, node });
    }

    /// Settles every node reachable from `start`.
    fn run(&mut self, start: StationIdx, line: &'a LineDirection) {
        self.relax((start, line), 0.0, None);

        while let Some(Candidate { minutes, node, .. }) = self.queue.pop() {
            if !self.settled.insert(node) {
                continue;
            }

            let (idx, line) = node;
            let graph = self.graph;
            let station = graph.station(idx);

            for (neighbor, time) in station.connections(line) {
                self.relax((neighbor, line), minutes + time, Some(node));
            }

            if let InterchangePolicy::Penalty(penalty) = graph.interchange() {
                for other in station.lines().filter(|&other| other != line) {
                    self.relax((idx, other), minutes + penalty, Some(node));
                }
            }
        }

        debug!(settled = self.settled.len(), "Route search finished");
    }

    /// The cheapest way of arriving at `end` on any line.
    fn best_arrival(&self, end: StationIdx) -> Option<Node<'a>> {
        self.reached
            .iter()
            .filter(|((idx, _), _)| *idx == end)
            .min_by(|(_, a), (_, b)| a.minutes.total_cmp(&b.minutes).then(a.seq.cmp(&b.seq)))
            .map(|(&node, _)| node)
    }

    fn path_to(&self, end: Node<'a>) -> Vec<Node<'a>> {
        let mut path = vec![end];
        let mut current = end;
        while let Some(previous) = self.reached[&current].predecessor {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        path
    }
}

impl NetworkGraph {
    /// Finds the quickest route from `start` to `end` boarding on `line`.
    ///
    /// Unknown station names are an error, an unreachable destination is not: it
    /// yields an empty [`RouteResult`].
    pub fn find_shortest_route(
        &self,
        start: &str,
        end: &str,
        line: &str,
    ) -> Result<RouteResult, NetworkError> {
        let start = self.station_index(start)?;
        let end = self.station_index(end)?;
        let line = LineDirection::new(line);

        let mut search = Search::new(self);
        search.run(start, &line);

        let Some(arrival) = search.best_arrival(end) else {
            return Ok(RouteResult::empty());
        };
        let path = search.path_to(arrival);

        let mut legs = vec![];
        let mut interchanges = 0;
        for (previous, node) in path.iter().tuple_windows() {
            let ((from, _), (to, to_line)) = (*previous, *node);
            if from == to {
                interchanges += 1;
                continue;
            }

            // Consecutive stations on one line were relaxed over this edge.
            let minutes = self
                .station(from)
                .time_to(to, to_line)
                .unwrap_or_default();
            legs.push(RouteLeg {
                from: self.station_name(from).to_owned(),
                to: self.station_name(to).to_owned(),
                line: to_line.clone(),
                minutes,
            });
        }

        let stations = path
            .iter()
            .map(|&(idx, _)| idx)
            .dedup()
            .map(|idx| self.station_name(idx).to_owned())
            .collect();

        Ok(RouteResult {
            stations,
            total_minutes: search.reached[&arrival].minutes,
            legs,
            interchanges,
        })
    }
}
