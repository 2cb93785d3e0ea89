use std::sync::Arc;

use log::debug;
use rustc_hash::FxHashSet;

use crate::{
    geometry::LatLon,
    types::{WayMeta, WayRef},
};

pub mod overpass;

pub use overpass::{Element, ElementKind, OverpassResponse, parse_overpass, read_overpass};

/// Highway classes requested by the street viewer's Overpass query.
pub const DEFAULT_HIGHWAY_CLASSES: [&str; 7] = [
    "motorway",
    "trunk",
    "primary",
    "secondary",
    "tertiary",
    "residential",
    "service",
];

/// A routable way: its metadata and at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub meta: WayRef,
    pub geometry: Vec<LatLon>,
}

impl Way {
    pub fn new(
        id: i64,
        tags: impl IntoIterator<Item = (String, String)>,
        geometry: Vec<LatLon>,
    ) -> Self {
        Self {
            meta: Arc::new(WayMeta {
                id,
                tags: tags.into_iter().collect(),
            }),
            geometry,
        }
    }

    /// Converts an element into a way if `filter` accepts it and it has
    /// enough geometry to form at least one segment.
    pub fn from_element(element: &Element, filter: &RoutableFilter) -> Option<Way> {
        if !filter.accepts(element) || element.geometry.len() < 2 {
            return None;
        }

        Some(Way::new(
            element.id,
            element.tags.clone(),
            element.geometry.clone(),
        ))
    }
}

/// Decides which map elements take part in the road graph.
#[derive(Debug, Clone, Default)]
pub struct RoutableFilter {
    classes: Option<FxHashSet<String>>,
}

impl RoutableFilter {
    /// Accepts every way carrying a `highway` tag.
    pub fn any_highway() -> Self {
        Self::default()
    }

    /// Accepts ways whose `highway` tag is one of `classes`.
    pub fn highway_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: Some(classes.into_iter().map(Into::into).collect()),
        }
    }

    pub fn street_classes() -> Self {
        Self::highway_classes(DEFAULT_HIGHWAY_CLASSES)
    }

    pub fn accepts(&self, element: &Element) -> bool {
        if element.kind != ElementKind::Way {
            return false;
        }

        match (element.tag("highway"), &self.classes) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(class), Some(classes)) => classes.contains(class),
        }
    }
}

/// Extracts the routable ways of an Overpass response.
pub fn ways(response: &OverpassResponse, filter: &RoutableFilter) -> Vec<Way> {
    let ways: Vec<Way> = response
        .elements
        .iter()
        .filter_map(|element| Way::from_element(element, filter))
        .collect();

    debug!(
        "Kept {} routable ways, skipped {} elements",
        ways.len(),
        response.elements.len() - ways.len()
    );

    ways
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use crate::geometry::LatLon;

    use super::{Element, ElementKind, OverpassResponse, RoutableFilter, ways};

    fn element(kind: ElementKind, highway: Option<&str>, points: usize) -> Element {
        Element {
            kind,
            id: 1,
            tags: highway
                .map(|h| BTreeMap::from([("highway".to_string(), h.to_string())]))
                .unwrap_or_default(),
            geometry: (0..points)
                .map(|i| LatLon::new(47.0 + i as f64 * 0.001, 9.0))
                .collect(),
            nodes: vec![],
        }
    }

    #[test]
    fn any_highway() {
        let filter = RoutableFilter::any_highway();

        assert!(filter.accepts(&element(ElementKind::Way, Some("footway"), 2)));
        assert!(!filter.accepts(&element(ElementKind::Way, None, 2)));
        assert!(!filter.accepts(&element(ElementKind::Relation, Some("primary"), 2)));
    }

    #[test]
    fn street_classes() {
        let filter = RoutableFilter::street_classes();

        assert!(filter.accepts(&element(ElementKind::Way, Some("residential"), 2)));
        assert!(!filter.accepts(&element(ElementKind::Way, Some("footway"), 2)));
    }

    #[test]
    fn short_and_untagged_geometry_is_skipped() {
        let response = OverpassResponse {
            elements: vec![
                element(ElementKind::Way, Some("primary"), 3),
                element(ElementKind::Way, Some("primary"), 1),
                element(ElementKind::Way, None, 4),
                element(ElementKind::Node, None, 0),
            ],
            ..Default::default()
        };

        let ways = ways(&response, &RoutableFilter::any_highway());

        assert_eq!(ways.len(), 1);
        assert_eq!(ways[0].geometry.len(), 3);
        assert_eq!(ways[0].meta.tags["highway"], "primary");
    }
}
