use crate::airport::AirportDirectory;
use crate::duration::FlightDuration;
use crate::error::Error;
use crate::offer::{group_route, rank_by_price, Offer, OfferResponse};
use crate::status::FlightStatus;
use crate::timepoint::TimePoint;
use crate::tracker::{project_position, Progress, Projection};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tabled::settings::Style;
use tabled::Tabled;

mod airport;
mod duration;
mod error;
mod offer;
mod status;
mod timepoint;
mod tracker;

#[derive(Parser)]
struct Args {
    /// Path to the airport reference JSON file (map keyed by ICAO code)
    #[arg(short, long, value_name = "FILE", default_value = "data/airports.json")]
    airports: PathBuf,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

fn paginate(content: String) {
    let mut pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn())
        .expect("Failed to spawn pager");

    let mut stdin = pager.stdin.take().expect("Failed to open stdin for pager");

    if let Err(e) = stdin.write_all(content.as_bytes()) {
        // Broken pipe is common if the user quits the pager early
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            eprintln!("Error writing to pager: {}", e);
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

#[derive(Tabled)]
struct OfferRow {
    id: String,
    price: String,
    route: String,
    duration: String,
    carrier: String,
    aircraft: String,
    travelers: String,
}

impl OfferRow {
    fn new(offer: &Offer, response: &OfferResponse) -> OfferRow {
        let outbound = offer.itineraries.first();
        let first_segment = outbound.and_then(|it| it.segments.first());
        let route = outbound
            .map(|it| {
                let mut codes: Vec<&str> = it
                    .segments
                    .first()
                    .map(|s| vec![s.departure.iata_code.as_str()])
                    .unwrap_or_default();
                codes.extend(it.segments.iter().map(|s| s.arrival.iata_code.as_str()));
                codes.join(" > ")
            })
            .unwrap_or_default();
        let duration = outbound
            .and_then(|it| it.duration.as_deref())
            .map(|d| FlightDuration::parse(d).to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let carrier = first_segment
            .map(|s| response.dictionaries.carrier_name(&s.carrier_code).to_string())
            .unwrap_or_default();
        let aircraft = first_segment
            .and_then(|s| s.aircraft.as_ref())
            .map(|a| response.dictionaries.aircraft_name(&a.code).to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let travelers = match offer
            .traveler_pricings
            .first()
            .and_then(|t| t.traveler_type.as_deref())
        {
            Some(kind) => format!("{} {}", offer.traveler_pricings.len(), kind),
            None => offer.traveler_pricings.len().to_string(),
        };
        OfferRow {
            id: offer.id.clone(),
            price: format!("{} {}", offer.price.total, offer.price.currency),
            route,
            duration,
            carrier,
            aircraft,
            travelers,
        }
    }
}

#[derive(Tabled)]
struct LegRow {
    role: String,
    from: String,
    to: String,
    day: String,
    departs: String,
    arrives: String,
    terminal: String,
    gate: String,
    duration: String,
    delay: String,
}

#[derive(Tabled)]
struct SegmentRow {
    flight: String,
    from: String,
    to: String,
    departs: String,
    arrives: String,
    duration: String,
    operated_by: String,
}

#[derive(Tabled)]
struct RouteRow {
    code: String,
    role: String,
    latitude: f64,
    longitude: f64,
}

fn print_table<R: Tabled>(rows: &[R]) {
    let mut table = tabled::Table::new(rows);
    table.with(Style::rounded());
    table.with(tabled::settings::Alignment::left());
    if rows.len() > 20 {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn load_offers(path: &str) -> Result<OfferResponse, Error> {
    let json = std::fs::read_to_string(path)?;
    OfferResponse::from_json(&json)
}

fn load_status(path: &str) -> Result<FlightStatus, Error> {
    let json = std::fs::read_to_string(path)?;
    FlightStatus::from_json(&json)
}

fn show_offers(path: &str) -> Result<(), Error> {
    let response = load_offers(path)?;
    let ranked = rank_by_price(&response.data);
    if ranked.is_empty() {
        println!("No offers in this result set.");
        return Ok(());
    }
    let rows: Vec<OfferRow> = ranked.iter().map(|o| OfferRow::new(o, &response)).collect();
    print_table(&rows);
    Ok(())
}

fn show_route(path: &str, offer_id: Option<&str>, directory: &AirportDirectory) -> Result<(), Error> {
    let response = load_offers(path)?;
    let ranked = rank_by_price(&response.data);
    let offer = match offer_id {
        Some(id) => ranked.iter().find(|o| o.id == id),
        // Route the cheapest offer when none is named.
        None => ranked.first(),
    };
    let Some(offer) = offer else {
        println!("No matching offer found.");
        return Ok(());
    };
    for (i, itinerary) in offer.itineraries.iter().enumerate() {
        let label = itinerary
            .duration
            .as_deref()
            .map(|d| FlightDuration::parse(d).to_string())
            .unwrap_or_else(|| "N/A".to_string());
        println!("Itinerary {} ({}):", i + 1, label);
        let segments: Vec<SegmentRow> = itinerary
            .segments
            .iter()
            .map(|s| segment_row(s))
            .collect::<Result<_, _>>()?;
        print_table(&segments);
        let points = group_route(itinerary, directory);
        if points.is_empty() {
            println!("  no leg with known coordinates");
            continue;
        }
        let rows: Vec<RouteRow> = points
            .into_iter()
            .map(|p| RouteRow {
                code: p.code,
                role: p.role.to_string(),
                latitude: p.latitude,
                longitude: p.longitude,
            })
            .collect();
        print_table(&rows);
    }
    Ok(())
}

fn segment_row(segment: &offer::Segment) -> Result<SegmentRow, Error> {
    let departs = TimePoint::parse(&segment.departure.at)?;
    let arrives = TimePoint::parse(&segment.arrival.at)?;
    let arrival_clock = if departs.day_offset(&arrives) {
        format!("{} +1", arrives.clock)
    } else {
        arrives.clock.clone()
    };
    let departs_label = match &segment.departure.terminal {
        Some(terminal) => format!("{} (T{})", departs.clock, terminal),
        None => departs.clock.clone(),
    };
    Ok(SegmentRow {
        flight: format!("{} {}", segment.carrier_code, segment.number),
        from: segment.departure.iata_code.clone(),
        to: segment.arrival.iata_code.clone(),
        departs: departs_label,
        arrives: arrival_clock,
        duration: segment
            .duration
            .as_deref()
            .map(|d| FlightDuration::parse(d).to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        operated_by: segment
            .operating
            .as_ref()
            .and_then(|o| o.carrier_code.clone())
            .unwrap_or_else(|| "-".to_string()),
    })
}

fn show_status(path: &str) -> Result<(), Error> {
    let status = load_status(path)?;
    println!("Flight {}", status.designator.bold());
    if let Some(aircraft) = &status.aircraft_type {
        println!("Aircraft: {}", aircraft);
    }
    if let Some(operating) = &status.operating_carrier {
        println!("Operated by {}", operating);
    }
    let rows: Vec<LegRow> = status
        .legs
        .iter()
        .map(|leg| LegRow {
            role: leg.role.to_string(),
            from: leg.origin.clone(),
            to: leg.destination.clone(),
            day: leg.departure.day.clone(),
            departs: leg.departure.clock.clone(),
            arrives: if leg.day_offset() {
                format!("{} +1", leg.arrival.clock)
            } else {
                leg.arrival.clock.clone()
            },
            terminal: format!(
                "{} > {}",
                leg.departure_terminal.as_deref().unwrap_or("-"),
                leg.arrival_terminal.as_deref().unwrap_or("-")
            ),
            gate: leg.departure_gate.clone().unwrap_or_else(|| "-".to_string()),
            duration: leg.scheduled.label().to_string(),
            delay: leg.delay_text(),
        })
        .collect();
    print_table(&rows);
    Ok(())
}

fn track_flight(path: &str, directory: &AirportDirectory) -> Result<(), Error> {
    let status = load_status(path)?;
    let Some(leg) = status.legs.first() else {
        return Err(Error::MalformedPayload("flight without legs"));
    };
    let origin = directory.resolve(&leg.origin);
    let destination = directory.resolve(&leg.destination);
    let now = Utc::now().fixed_offset();
    let projection = project_position(
        &leg.departure,
        &leg.scheduled,
        origin.coords(),
        destination.coords(),
        now,
    );
    println!(
        "Flight {} {} > {} ({})",
        status.designator.bold(),
        origin.city,
        destination.city,
        leg.delay_text()
    );
    match projection {
        Projection::Position {
            latitude,
            longitude,
            state,
        } => {
            let state_label = match state {
                Progress::Scheduled => state.to_string().yellow(),
                Progress::EnRoute => state.to_string().green(),
                Progress::Landed => state.to_string().blue(),
            };
            println!("Status: {}", state_label);
            println!("Estimated position: {:.4}, {:.4}", latitude, longitude);
        }
        Projection::Unavailable => {
            println!("{}", "Position unavailable (missing coordinates or unknown duration).".red());
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let directory = match AirportDirectory::load_from_file(args.airports.to_string_lossy().as_ref()) {
        Ok(directory) => {
            println!(
                "Flight deck online. {} airports loaded from {}",
                directory.len(),
                args.airports.display()
            );
            directory
        }
        Err(e) => {
            // Searches still work without reference data; positions and
            // route points degrade to unavailable.
            eprintln!("{} {}", "Airport reference unavailable:".yellow(), e);
            AirportDirectory::new([])
        }
    };

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "offers".to_string(),
            "route".to_string(),
            "status".to_string(),
            "track".to_string(),
            "airport".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() { continue; }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                let outcome = match parts[0] {
                    "offers" => match parts.get(1) {
                        Some(path) => show_offers(path),
                        None => {
                            println!("Usage: offers <response.json>");
                            Ok(())
                        }
                    },
                    "route" => match parts.get(1) {
                        Some(path) => show_route(path, parts.get(2).copied(), &directory),
                        None => {
                            println!("Usage: route <response.json> [offer_id]");
                            Ok(())
                        }
                    },
                    "status" => match parts.get(1) {
                        Some(path) => show_status(path),
                        None => {
                            println!("Usage: status <response.json>");
                            Ok(())
                        }
                    },
                    "track" => match parts.get(1) {
                        Some(path) => track_flight(path, &directory),
                        None => {
                            println!("Usage: track <response.json>");
                            Ok(())
                        }
                    },
                    "airport" => {
                        match parts.get(1) {
                            Some(code) => print_table(&[directory.resolve(code)]),
                            None => println!("Usage: airport <iata_code>"),
                        }
                        Ok(())
                    },
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  offers <file>             - Rank a captured offer-search response by total price");
                        println!("  route <file> [offer_id]   - Grouped route points for an offer (cheapest by default)");
                        println!("  status <file>             - Normalize a captured flight-status response");
                        println!("  track <file>              - Estimate the flight's current position");
                        println!("  airport <code>            - Resolve an IATA code against the reference set");
                        println!("  help / ?                  - Show this help menu");
                        println!("  exit / quit               - Leave the shell\n");
                        Ok(())
                    },
                    "exit" | "quit" => break,
                    _ => {
                        println!("Unknown command: {}", parts[0]);
                        Ok(())
                    }
                };
                if let Err(e) = outcome {
                    // Hard errors abandon the request; the shell stays up.
                    eprintln!("{} {}", "Error:".red(), e);
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            },
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            },
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
