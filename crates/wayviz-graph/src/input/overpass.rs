use std::{collections::BTreeMap, io::Read};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{GraphError, geometry::LatLon};

/// Response of an Overpass query with `out geom;`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub version: f64,
    #[serde(default)]
    pub generator: String,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
    Relation,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub id: i64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub geometry: Vec<LatLon>,
    #[serde(default)]
    pub nodes: Vec<i64>,
}

impl Element {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

pub fn parse_overpass(json: &str) -> Result<OverpassResponse, GraphError> {
    let response: OverpassResponse = serde_json::from_str(json)?;
    debug!("Parsed {} overpass elements", response.elements.len());
    Ok(response)
}

pub fn read_overpass<R: Read>(reader: R) -> Result<OverpassResponse, GraphError> {
    let response: OverpassResponse = serde_json::from_reader(reader)?;
    debug!("Read {} overpass elements", response.elements.len());
    Ok(response)
}
