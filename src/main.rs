use std::{env, fs, path::PathBuf, process::ExitCode};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use freight_rate_quoter::domain::{
    estimate, QuoteError, QuoteRecord, RateCard, RouteEndpoints, ShipmentProfile,
};
use freight_rate_quoter::infra::{CacheStatus, ZipLookupError, ZippopotamClient};
use freight_rate_quoter::util::datasets;
use freight_rate_quoter::VERSION;

/// One quote request, read from the JSON file named on the command line.
/// Dimensions may be given directly or resolved from the equipment
/// catalog by manufacturer and model; explicit dimensions win.
#[derive(Debug, Deserialize)]
struct QuoteRequest {
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    manufacturer: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    freight_description: Option<String>,
    #[serde(default)]
    dimensions: Option<ShipmentProfile>,
    origin_zip: String,
    destination_zip: String,
    /// Route data; no default, the caller has to know their lane.
    states_traversed: u32,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("usage: freight_rate_quoter <request.json>")]
    Usage,
    #[error("failed to read {path}: {source}")]
    ReadRequest {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid request JSON: {0}")]
    ParseRequest(serde_json::Error),
    #[error("failed to encode quote record: {0}")]
    EncodeRecord(serde_json::Error),
    #[error("no catalog entry for {manufacturer} {model}; pass dimensions directly")]
    UnknownEquipment { manufacturer: String, model: String },
    #[error("request needs either dimensions or a cataloged manufacturer + model")]
    MissingDimensions,
    #[error(transparent)]
    Zip(#[from] ZipLookupError),
    #[error(transparent)]
    Quote(#[from] QuoteError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CliError> {
    info!(version = VERSION, "freight rate quoter starting");

    let path = env::args().nth(1).map(PathBuf::from).ok_or(CliError::Usage)?;
    let raw = fs::read_to_string(&path).map_err(|source| CliError::ReadRequest {
        path: path.clone(),
        source,
    })?;
    let request: QuoteRequest = serde_json::from_str(&raw).map_err(CliError::ParseRequest)?;

    let shipment = resolve_shipment(&request)?;

    let client = ZippopotamClient::new()?;
    let (origin, destination) = client
        .lookup_pair(&request.origin_zip, &request.destination_zip)
        .await?;
    for payload in [&origin, &destination] {
        if payload.status == CacheStatus::Stale {
            warn!(zip = %payload.data.zip, "serving stale zip coordinates");
        }
    }

    let route = RouteEndpoints::new(
        origin.data.point,
        destination.data.point,
        request.states_traversed,
    )
    .with_states(origin.data.state.clone(), destination.data.state.clone());

    let quote = estimate(
        &shipment,
        &route,
        datasets::reference_data(),
        &RateCard::default(),
    )?;
    let record = QuoteRecord::new(shipment, quote).with_endpoints(origin.data, destination.data);

    print_breakdown(&request, &record);
    let json = serde_json::to_string_pretty(&record).map_err(CliError::EncodeRecord)?;
    println!("{json}");
    Ok(())
}

fn resolve_shipment(request: &QuoteRequest) -> Result<ShipmentProfile, CliError> {
    if let Some(dimensions) = request.dimensions {
        return Ok(dimensions);
    }
    match (request.manufacturer.as_deref(), request.model.as_deref()) {
        (Some(manufacturer), Some(model)) => {
            match datasets::equipment_dimensions(manufacturer, model) {
                Some(dimensions) => Ok(dimensions),
                None => {
                    let catalog: Vec<String> = datasets::equipment_models()
                        .map(|(make, model)| format!("{make} {model}"))
                        .collect();
                    info!(catalog = %catalog.join(", "), "cataloged equipment");
                    Err(CliError::UnknownEquipment {
                        manufacturer: manufacturer.to_string(),
                        model: model.to_string(),
                    })
                }
            }
        }
        _ => Err(CliError::MissingDimensions),
    }
}

fn describe_equipment(request: &QuoteRequest) -> Option<String> {
    match (&request.manufacturer, &request.model) {
        (Some(make), Some(model)) => {
            let mut name = String::new();
            if let Some(year) = &request.year {
                name.push_str(year);
                name.push(' ');
            }
            name.push_str(make);
            name.push(' ');
            name.push_str(model);
            Some(name)
        }
        _ => request.freight_description.clone(),
    }
}

fn print_breakdown(request: &QuoteRequest, record: &QuoteRecord) {
    let quote = &record.quote;

    println!("Quote {}", record.reference);
    if let Some(equipment) = describe_equipment(request) {
        println!("  Equipment:    {equipment}");
    }
    if let (Some(origin), Some(destination)) = (&record.origin, &record.destination) {
        println!(
            "  Route:        {}, {} {} -> {}, {} {}",
            origin.city,
            origin.state_abbreviation,
            origin.zip,
            destination.city,
            destination.state_abbreviation,
            destination.zip
        );
    }
    println!("  Distance:     {:.1} mi", quote.distance_miles);
    println!(
        "  Load class:   {:?}, {} pilot car(s)",
        quote.classification.class, quote.pilot_cars
    );
    println!("  Base cost:    ${:.2}", quote.breakdown.base_cost);
    println!("  Overweight:   ${:.2}", quote.breakdown.overweight_surcharge);
    println!("  Pilot cars:   ${:.2}", quote.breakdown.pilot_car_cost);
    println!("  Permits:      ${:.2}", quote.breakdown.permit_cost);
    println!("  Escorts:      ${:.2}", quote.breakdown.escort_cost);
    println!("  Service fee:  ${:.2}", quote.service_fee);
    println!("  Total:        ${:.2}", quote.final_cost);
    for check in &quote.jurisdiction_checks {
        if check.permit_required() {
            println!(
                "  Note: {} requires an oversize/overweight permit for this load",
                check.state
            );
        }
    }
}
