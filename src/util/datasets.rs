use std::collections::HashMap;
use std::sync::OnceLock;

use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::{EscortRule, ReferenceData, ShipmentProfile, StateLimits};

/// Embed the reference datasets under `assets/` into the binary.
#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedAssets;

static EQUIPMENT: OnceLock<Vec<EquipmentEntry>> = OnceLock::new();
static REFERENCE: OnceLock<ReferenceData> = OnceLock::new();

/// One catalog row of `equipment_dims.json`; the file keeps the
/// PascalCase keys of the industry dataset it is drawn from.
#[derive(Clone, Debug, Deserialize)]
struct EquipmentEntry {
    #[serde(rename = "Manufacturer")]
    manufacturer: String,
    #[serde(rename = "Model")]
    model: String,
    dimensions: EquipmentDimensions,
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct EquipmentDimensions {
    #[serde(rename = "Length")]
    length: f64,
    #[serde(rename = "Width")]
    width: f64,
    #[serde(rename = "Height")]
    height: f64,
    #[serde(rename = "Weight")]
    weight: f64,
}

impl From<EquipmentDimensions> for ShipmentProfile {
    fn from(dims: EquipmentDimensions) -> Self {
        ShipmentProfile::new(dims.length, dims.width, dims.height, dims.weight)
    }
}

fn equipment() -> &'static [EquipmentEntry] {
    EQUIPMENT.get_or_init(|| load_json("equipment_dims.json"))
}

/// Factory dimensions for a manufacturer and model, by exact match.
pub fn equipment_dimensions(manufacturer: &str, model: &str) -> Option<ShipmentProfile> {
    equipment()
        .iter()
        .find(|entry| entry.manufacturer == manufacturer && entry.model == model)
        .map(|entry| entry.dimensions.into())
}

/// Every (manufacturer, model) pair in the catalog, in file order.
pub fn equipment_models() -> impl Iterator<Item = (&'static str, &'static str)> {
    equipment()
        .iter()
        .map(|entry| (entry.manufacturer.as_str(), entry.model.as_str()))
}

/// State legal limits and escort rule tables, parsed once per process.
pub fn reference_data() -> &'static ReferenceData {
    REFERENCE.get_or_init(|| {
        let state_limits: HashMap<String, StateLimits> = load_json("state_limits.json");
        let escort_rules: HashMap<String, Vec<EscortRule>> = load_json("escort_rules.json");
        ReferenceData {
            state_limits,
            escort_rules,
        }
    })
}

fn load_json<T: DeserializeOwned>(path: &str) -> T {
    let file = EmbeddedAssets::get(path)
        .unwrap_or_else(|| panic!("Failed to locate embedded asset: {path}"));
    serde_json::from_slice(file.data.as_ref())
        .unwrap_or_else(|err| panic!("Embedded asset {path} is not valid JSON: {err}"))
}
