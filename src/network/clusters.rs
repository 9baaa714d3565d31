//! Organizational clusters and their viewport-derived anchors.
//!
//! The set of clusters is fixed; only the anchor positions depend on the
//! viewport, so the registry is rebuilt whenever the drawing surface resizes.

use std::f32::consts::TAU;

use eframe::egui::{Color32, Rect, Vec2, vec2};

/// Cluster that partners fall back to when neither their contact nor their
/// sector identifies one.
pub const DEFAULT_CLUSTER_ID: &str = "glo";

/// Cluster id given to staff members without a declared directorate.
pub const UNKNOWN_CLUSTER_ID: &str = "unknown";

/// Radius of the clickable background disc drawn around each anchor.
pub const CLUSTER_AREA_RADIUS: f32 = 80.0;

/// Vertical offset of a cluster label above its anchor.
pub const CLUSTER_LABEL_OFFSET: f32 = 90.0;

const ANCHOR_RING_FRACTION: f32 = 0.35;

struct UnitDefinition {
    id: &'static str,
    name: &'static str,
    color: Color32,
}

const ORGANIZATIONAL_UNITS: [UnitDefinition; 5] = [
    UnitDefinition {
        id: "odg",
        name: "Office of the Director General",
        color: Color32::from_rgb(0x2c, 0x3e, 0x50),
    },
    UnitDefinition {
        id: "spp",
        name: "Directorate of Strategic Planning, Programming and Policy",
        color: Color32::from_rgb(0xe7, 0x4c, 0x3c),
    },
    UnitDefinition {
        id: "iet",
        name: "Directorate of SDG Innovation and Economic Transformation",
        color: Color32::from_rgb(0x34, 0x98, 0xdb),
    },
    UnitDefinition {
        id: "glo",
        name: "Directorate of Global Partnerships and External Relations",
        color: Color32::from_rgb(0x16, 0xa0, 0x85),
    },
    UnitDefinition {
        id: "tcs",
        name: "Technical Cooperation and Sustainable Industrial Development",
        color: Color32::from_rgb(0x27, 0xae, 0x60),
    },
];

/// Keyword table used when a partner's contact does not resolve to a cluster.
/// Checked in order against the lower-cased sector name.
const SECTOR_KEYWORDS: [(&str, &str); 8] = [
    ("director general", "odg"),
    ("strategic planning", "spp"),
    ("programming and policy", "spp"),
    ("innovation", "iet"),
    ("economic transformation", "iet"),
    ("global partnerships", "glo"),
    ("external relations", "glo"),
    ("technical cooperation", "tcs"),
];

/// Color used for nodes whose cluster is not registered.
pub const UNREGISTERED_CLUSTER_COLOR: Color32 = Color32::from_rgb(0x95, 0xa5, 0xa6);

pub fn is_registered_cluster(id: &str) -> bool {
    ORGANIZATIONAL_UNITS.iter().any(|unit| unit.id == id)
}

pub fn normalize_directorate(directorate: &str) -> String {
    directorate.trim().to_lowercase()
}

pub fn sector_cluster(sector: &str) -> Option<&'static str> {
    let sector = sector.to_lowercase();
    if sector.trim().is_empty() {
        return None;
    }

    SECTOR_KEYWORDS
        .iter()
        .find(|(keyword, _)| sector.contains(keyword))
        .map(|(_, cluster)| *cluster)
}

/// Size of the drawing surface the layout is computed for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_available(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub id: &'static str,
    pub name: &'static str,
    pub color: Color32,
    pub anchor: Vec2,
}

impl Cluster {
    pub fn label_position(&self) -> Vec2 {
        self.anchor - vec2(0.0, CLUSTER_LABEL_OFFSET)
    }

    /// Rough bounds of the rendered label, wide enough for click targeting.
    pub fn label_rect(&self) -> Rect {
        let width = (self.name.chars().count() as f32 * 5.6).max(40.0);
        Rect::from_center_size(self.label_position().to_pos2(), vec2(width, 14.0))
    }

    pub fn hit(&self, point: Vec2) -> bool {
        (point - self.anchor).length_sq() <= CLUSTER_AREA_RADIUS * CLUSTER_AREA_RADIUS
            || self.label_rect().contains(point.to_pos2())
    }
}

/// Read-only set of clusters laid out on a ring around the viewport center.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterRegistry {
    viewport: Viewport,
    clusters: Vec<Cluster>,
}

impl ClusterRegistry {
    pub fn new(viewport: Viewport) -> Self {
        let center = viewport.center();
        let radius = viewport.width.min(viewport.height).max(0.0) * ANCHOR_RING_FRACTION;
        let count = ORGANIZATIONAL_UNITS.len() as f32;

        let clusters = ORGANIZATIONAL_UNITS
            .iter()
            .enumerate()
            .map(|(index, unit)| {
                let angle = (index as f32 / count) * TAU;
                Cluster {
                    id: unit.id,
                    name: unit.name,
                    color: unit.color,
                    anchor: center + vec2(angle.cos(), angle.sin()) * radius,
                }
            })
            .collect();

        Self { viewport, clusters }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn get(&self, id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|cluster| cluster.id == id)
    }

    pub fn anchor(&self, id: &str) -> Option<Vec2> {
        self.get(id).map(|cluster| cluster.anchor)
    }

    pub fn color(&self, id: &str) -> Color32 {
        self.get(id)
            .map(|cluster| cluster.color)
            .unwrap_or(UNREGISTERED_CLUSTER_COLOR)
    }

    pub fn name(&self, id: &str) -> Option<&'static str> {
        self.get(id).map(|cluster| cluster.name)
    }

    /// Cluster whose area or label contains `point`; the nearest anchor wins.
    pub fn cluster_at(&self, point: Vec2) -> Option<&Cluster> {
        self.clusters
            .iter()
            .filter(|cluster| cluster.hit(point))
            .min_by(|a, b| {
                (a.anchor - point)
                    .length_sq()
                    .total_cmp(&(b.anchor - point).length_sq())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchors_sit_on_ring() {
        let registry = ClusterRegistry::new(Viewport::new(800.0, 420.0));
        let center = vec2(400.0, 210.0);
        let expected_radius = 420.0 * 0.35;

        assert_eq!(registry.len(), 5);
        for cluster in registry.iter() {
            let distance = (cluster.anchor - center).length();
            assert!((distance - expected_radius).abs() < 1e-3, "{}", cluster.id);
        }

        let first = registry.iter().next().unwrap();
        assert!((first.anchor.x - (400.0 + expected_radius)).abs() < 1e-3);
        assert!((first.anchor.y - 210.0).abs() < 1e-3);
    }

    #[test]
    fn test_anchors_are_evenly_spaced() {
        let registry = ClusterRegistry::new(Viewport::new(1000.0, 1000.0));
        let anchors = registry.iter().map(|cluster| cluster.anchor).collect::<Vec<_>>();
        let chord = (anchors[0] - anchors[1]).length();

        for window in anchors.windows(2) {
            assert!(((window[0] - window[1]).length() - chord).abs() < 1e-2);
        }
    }

    #[test]
    fn test_registry_is_pure_function_of_viewport() {
        let a = ClusterRegistry::new(Viewport::new(640.0, 480.0));
        let b = ClusterRegistry::new(Viewport::new(640.0, 480.0));
        let c = ClusterRegistry::new(Viewport::new(1280.0, 480.0));

        assert_eq!(a, b);
        assert_ne!(a.anchor("spp"), c.anchor("spp"));
    }

    #[test]
    fn test_viewport_availability() {
        assert!(Viewport::new(10.0, 10.0).is_available());
        assert!(!Viewport::new(0.0, 10.0).is_available());
        assert!(!Viewport::new(10.0, f32::NAN).is_available());
    }

    #[test]
    fn test_sector_keywords() {
        assert_eq!(
            sector_cluster("Directorate of SDG Innovation and Economic Transformation"),
            Some("iet")
        );
        assert_eq!(sector_cluster("Office of the Director General"), Some("odg"));
        assert_eq!(
            sector_cluster("technical cooperation and sustainable industrial development"),
            Some("tcs")
        );
        assert_eq!(sector_cluster("Agriculture"), None);
        assert_eq!(sector_cluster(""), None);
    }

    #[test]
    fn test_cluster_hit_testing() {
        let registry = ClusterRegistry::new(Viewport::new(800.0, 800.0));
        let spp = registry.get("spp").unwrap();

        assert_eq!(registry.cluster_at(spp.anchor).map(|c| c.id), Some("spp"));
        assert_eq!(
            registry.cluster_at(spp.label_position()).map(|c| c.id),
            Some("spp")
        );
        assert!(registry.cluster_at(vec2(400.0, 400.0)).is_none());
    }

    #[test]
    fn test_unknown_cluster_color_falls_back() {
        let registry = ClusterRegistry::new(Viewport::new(100.0, 100.0));

        assert_eq!(registry.color("dg"), UNREGISTERED_CLUSTER_COLOR);
        assert_eq!(normalize_directorate(" IET "), "iet");
        assert!(is_registered_cluster("iet"));
        assert!(!is_registered_cluster(UNKNOWN_CLUSTER_ID));
    }
}
