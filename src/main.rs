use std::time::Instant;

use anyhow::bail;
use chrono::{NaiveTime, TimeDelta};
use clap::Parser;
use itertools::Itertools;
use tracing::info;

use crate::{
    dijkstra::{InterchangePolicy, RouteResult, DEFAULT_INTERCHANGE_PENALTY},
    network::{io::Scenario, NetworkGraph},
};
mod dijkstra;
mod logging;
mod network;

#[derive(Parser)]
struct Args {
    /// Path to network file
    network: String,
    /// Origin station
    #[arg(requires_all = ["destination", "line"])]
    origin: Option<String>,
    /// Destination station
    destination: Option<String>,
    /// Line and direction to board, e.g. Jubilee-Eastbound
    line: Option<String>,
    /// Allow changing line at the default penalty
    #[arg(long)]
    interchanges: bool,
    /// Minutes charged for changing line
    #[arg(long, value_name = "MINUTES")]
    interchange_penalty: Option<f64>,
    /// Departure time (HH:MM)
    #[arg(long)]
    depart: Option<NaiveTime>,
    /// Print stations, delays and closed tracks
    #[arg(long)]
    status: bool,
    /// Print the route as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    logging::init_logger();
    let args = Args::parse();

    let now = Instant::now();
    let scenario = Scenario::read(&args.network)?;
    let policy = match (args.interchange_penalty, args.interchanges) {
        (Some(penalty), _) => InterchangePolicy::penalty(penalty)?,
        (None, true) => InterchangePolicy::Penalty(DEFAULT_INTERCHANGE_PENALTY),
        (None, false) => scenario.interchange_policy()?,
    };
    let mut graph = NetworkGraph::new(policy);
    scenario.apply(&mut graph)?;
    info!("Read network in {:?}", now.elapsed());

    if args.status {
        print_status(&graph);
    }

    let (Some(origin), Some(destination), Some(line)) = (args.origin, args.destination, args.line)
    else {
        return Ok(());
    };

    if origin.eq_ignore_ascii_case(&destination) {
        bail!("Start and end stations are the same");
    }

    let now = Instant::now();
    let result = graph.find_shortest_route(&origin, &destination, &line)?;
    info!("Found route in {:?}", now.elapsed());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_route(&result, args.depart);
    }

    Ok(())
}

fn print_status(graph: &NetworkGraph) {
    println!("Stations:");
    for station in graph.stations() {
        println!("  {}", station.name());
        for line in station.lines() {
            let neighbors = station
                .connections(line)
                .map(|(neighbor, time)| format!("{} ({time} mins)", graph.station_name(neighbor)))
                .join(", ");
            println!("    {line}: {neighbors}");
        }
    }

    println!("Delays:");
    for (track, minutes) in graph.delays() {
        println!("  {track}: +{minutes} mins");
    }

    println!("Closed tracks:");
    for track in graph.closed_tracks() {
        println!("  {track}");
    }
}

fn print_route(result: &RouteResult, depart: Option<NaiveTime>) {
    if result.is_empty() {
        println!("No route found.");
        return;
    }

    println!("Route found:");
    for leg in &result.legs {
        println!(
            "{} -> {} on {} ({} mins)",
            leg.from, leg.to, leg.line, leg.minutes
        );
    }
    if result.interchanges > 0 {
        println!("Interchanges: {}", result.interchanges);
    }
    println!("Total Journey Time: {} minutes", result.total_minutes);

    if let Some(depart) = depart {
        let arrival = depart + TimeDelta::seconds((result.total_minutes * 60.0).round() as i64);
        println!("Departing at {depart}, arriving at {arrival}");
    }
}
