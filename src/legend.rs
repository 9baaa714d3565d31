//! Colors and shapes shared by the graph view and its legend.

use eframe::egui::Color32;

use crate::network::{ClusterRegistry, LinkKind, Node, NodeKind};

pub const FALLBACK_COLOR: Color32 = Color32::from_rgb(0x95, 0xa5, 0xa6);
pub const STAFF_BORDER_COLOR: Color32 = Color32::WHITE;

const PARTNER_TYPES: [(&str, Color32); 6] = [
    ("Private Sector", Color32::from_rgb(0x00, 0x9c, 0xdc)),
    ("Government", Color32::from_rgb(0xf4, 0x7a, 0x42)),
    ("NGO", Color32::from_rgb(0x4c, 0xaf, 0x50)),
    ("Academic", Color32::from_rgb(0x9c, 0x27, 0xb0)),
    ("UN Agency", Color32::from_rgb(0x19, 0x76, 0xd2)),
    (
        "International Organization",
        Color32::from_rgb(0xff, 0x98, 0x00),
    ),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
    Rectangle,
    Circle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkStyle {
    pub color: Color32,
    pub dashed: bool,
}

pub fn node_shape(kind: NodeKind) -> NodeShape {
    match kind {
        NodeKind::Partner => NodeShape::Rectangle,
        NodeKind::Staff => NodeShape::Circle,
    }
}

pub fn partner_type_color(partner_type: &str) -> Color32 {
    PARTNER_TYPES
        .iter()
        .find(|(name, _)| *name == partner_type)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

pub fn link_style(kind: LinkKind) -> LinkStyle {
    match kind {
        LinkKind::ContactRelationship => LinkStyle {
            color: Color32::from_rgb(0xe7, 0x4c, 0x3c),
            dashed: false,
        },
        LinkKind::SameDivision => LinkStyle {
            color: Color32::from_rgb(0x34, 0x98, 0xdb),
            dashed: false,
        },
        LinkKind::SameDirectorate => LinkStyle {
            color: Color32::from_rgb(0x95, 0xa5, 0xa6),
            dashed: true,
        },
        LinkKind::Partnership => LinkStyle {
            color: Color32::from_gray(0x99),
            dashed: false,
        },
    }
}

/// Partners are filled by type and outlined in their cluster color; staff
/// are filled by cluster with a white outline.
pub fn node_colors(node: &Node, clusters: &ClusterRegistry) -> (Color32, Color32) {
    let cluster = clusters.color(&node.cluster_id);
    match node.kind {
        NodeKind::Partner => (partner_type_color(&node.attributes.partner_type), cluster),
        NodeKind::Staff => (cluster, STAFF_BORDER_COLOR),
    }
}

pub struct LegendEntry {
    pub label: String,
    pub swatch: Swatch,
}

pub enum Swatch {
    Shape { shape: NodeShape, fill: Color32 },
    Line(LinkStyle),
}

pub struct Legend {
    pub shapes: Vec<LegendEntry>,
    pub partner_types: Vec<LegendEntry>,
    pub clusters: Vec<LegendEntry>,
    pub links: Vec<LegendEntry>,
}

impl Legend {
    pub fn new(clusters: &ClusterRegistry) -> Self {
        let shapes = [NodeKind::Partner, NodeKind::Staff]
            .into_iter()
            .map(|kind| LegendEntry {
                label: kind.label().to_owned(),
                swatch: Swatch::Shape {
                    shape: node_shape(kind),
                    fill: FALLBACK_COLOR,
                },
            })
            .collect();

        let partner_types = PARTNER_TYPES
            .iter()
            .map(|(name, color)| LegendEntry {
                label: (*name).to_owned(),
                swatch: Swatch::Shape {
                    shape: NodeShape::Rectangle,
                    fill: *color,
                },
            })
            .collect();

        let cluster_entries = clusters
            .iter()
            .map(|cluster| LegendEntry {
                label: cluster.name.to_owned(),
                swatch: Swatch::Shape {
                    shape: NodeShape::Circle,
                    fill: cluster.color,
                },
            })
            .collect();

        let links = [
            (LinkKind::ContactRelationship, "Staff contact"),
            (LinkKind::SameDivision, "Same division"),
            (LinkKind::SameDirectorate, "Same directorate"),
            (LinkKind::Partnership, "Partnership"),
        ]
        .into_iter()
        .map(|(kind, label)| LegendEntry {
            label: label.to_owned(),
            swatch: Swatch::Line(link_style(kind)),
        })
        .collect();

        Self {
            shapes,
            partner_types,
            clusters: cluster_entries,
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Viewport;

    #[test]
    fn test_partner_type_colors() {
        assert_eq!(
            partner_type_color("Private Sector"),
            Color32::from_rgb(0x00, 0x9c, 0xdc)
        );
        assert_eq!(partner_type_color("Cooperative"), FALLBACK_COLOR);
    }

    #[test]
    fn test_only_directorate_links_are_dashed() {
        let dashed = [
            LinkKind::ContactRelationship,
            LinkKind::Partnership,
            LinkKind::SameDivision,
            LinkKind::SameDirectorate,
        ]
        .into_iter()
        .filter(|kind| link_style(*kind).dashed)
        .collect::<Vec<_>>();

        assert_eq!(dashed, vec![LinkKind::SameDirectorate]);
    }

    #[test]
    fn test_legend_lists_every_cluster() {
        let registry = ClusterRegistry::new(Viewport::new(400.0, 400.0));
        let legend = Legend::new(&registry);

        assert_eq!(legend.clusters.len(), registry.len());
        assert_eq!(legend.links.len(), 4);
        assert!(matches!(
            legend.shapes[0].swatch,
            Swatch::Shape {
                shape: NodeShape::Rectangle,
                ..
            }
        ));
    }
}
