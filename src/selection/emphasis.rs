use std::collections::HashSet;

use crate::network::{LinkKind, Node, NodeKind};
use crate::simulation::ForceSimulation;

use super::Selection;

const FADED_NODE_OPACITY: f32 = 0.3;
const FADED_CLUSTER_MEMBER_OPACITY: f32 = 0.2;
const FADED_LINK_OPACITY: f32 = 0.1;
const FADED_LINK_WIDTH: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Selected,
    Neighbor,
    Member,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeEmphasis {
    pub class: NodeClass,
    pub opacity: f32,
    pub border_width: f32,
    pub border_opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkEmphasis {
    pub highlighted: bool,
    pub opacity: f32,
    pub width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterEmphasis {
    pub highlighted: bool,
    pub background_opacity: f32,
    pub label_opacity: f32,
}

/// How every node, link and cluster should be drawn for the current
/// selection. Indices follow the simulation's node, link and cluster order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Emphasis {
    pub nodes: Vec<NodeEmphasis>,
    pub links: Vec<LinkEmphasis>,
    pub clusters: Vec<ClusterEmphasis>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub selected: usize,
    pub neighbor: usize,
    pub member: usize,
    pub other: usize,
}

impl Emphasis {
    pub fn class_counts(&self) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for node in &self.nodes {
            match node.class {
                NodeClass::Selected => counts.selected += 1,
                NodeClass::Neighbor => counts.neighbor += 1,
                NodeClass::Member => counts.member += 1,
                NodeClass::Other => counts.other += 1,
            }
        }
        counts
    }
}

fn default_border(node: &Node) -> f32 {
    match node.kind {
        NodeKind::Staff => 1.5,
        NodeKind::Partner => 2.0,
    }
}

fn default_link(kind: LinkKind, strength: f32) -> LinkEmphasis {
    let opacity = match kind {
        LinkKind::ContactRelationship => 0.8,
        LinkKind::SameDivision => 0.7,
        LinkKind::Partnership | LinkKind::SameDirectorate => 0.5,
    };
    LinkEmphasis {
        highlighted: false,
        opacity,
        width: 1.0 + strength * 0.5,
    }
}

fn faded_link() -> LinkEmphasis {
    LinkEmphasis {
        highlighted: false,
        opacity: FADED_LINK_OPACITY,
        width: FADED_LINK_WIDTH,
    }
}

/// Highlights `focused` and fades every other cluster area and label.
fn focus_cluster(simulation: &ForceSimulation, focused: &str) -> Vec<ClusterEmphasis> {
    simulation
        .clusters()
        .iter()
        .map(|cluster| {
            let highlighted = cluster.id == focused;
            ClusterEmphasis {
                highlighted,
                background_opacity: if highlighted { 0.2 } else { 0.05 },
                label_opacity: if highlighted { 1.0 } else { 0.3 },
            }
        })
        .collect()
}

pub(super) fn classify(
    selection: &Selection,
    focus: Option<usize>,
    related: &HashSet<usize>,
    simulation: &ForceSimulation,
) -> Emphasis {
    let nodes = simulation.nodes();
    let clusters = simulation.clusters();

    match (selection, focus) {
        (Selection::Node(_), Some(selected)) => {
            let node_emphasis = nodes
                .iter()
                .enumerate()
                .map(|(index, node)| {
                    if index == selected {
                        NodeEmphasis {
                            class: NodeClass::Selected,
                            opacity: 1.0,
                            border_width: 4.0,
                            border_opacity: 1.0,
                        }
                    } else if related.contains(&index) {
                        NodeEmphasis {
                            class: NodeClass::Neighbor,
                            opacity: 1.0,
                            border_width: 3.0,
                            border_opacity: 1.0,
                        }
                    } else {
                        NodeEmphasis {
                            class: NodeClass::Other,
                            opacity: FADED_NODE_OPACITY,
                            border_width: default_border(node),
                            border_opacity: FADED_NODE_OPACITY,
                        }
                    }
                })
                .collect();

            let links = simulation
                .link_pairs()
                .iter()
                .zip(simulation.links())
                .map(|(&(source, target), link)| {
                    if source == selected || target == selected {
                        LinkEmphasis {
                            highlighted: true,
                            opacity: 1.0,
                            width: 2.0 + link.strength * 0.5,
                        }
                    } else {
                        faded_link()
                    }
                })
                .collect();

            let cluster_emphasis = focus_cluster(simulation, &nodes[selected].cluster_id);

            Emphasis {
                nodes: node_emphasis,
                links,
                clusters: cluster_emphasis,
            }
        }
        (Selection::Cluster(cluster_id), _) => {
            let node_emphasis = nodes
                .iter()
                .enumerate()
                .map(|(index, _)| {
                    if related.contains(&index) {
                        NodeEmphasis {
                            class: NodeClass::Member,
                            opacity: 1.0,
                            border_width: 3.0,
                            border_opacity: 1.0,
                        }
                    } else {
                        NodeEmphasis {
                            class: NodeClass::Other,
                            opacity: FADED_CLUSTER_MEMBER_OPACITY,
                            border_width: 1.0,
                            border_opacity: FADED_NODE_OPACITY,
                        }
                    }
                })
                .collect();

            let links = simulation
                .link_pairs()
                .iter()
                .map(|(source, target)| {
                    if related.contains(source) && related.contains(target) {
                        LinkEmphasis {
                            highlighted: true,
                            opacity: 1.0,
                            width: 2.0,
                        }
                    } else {
                        faded_link()
                    }
                })
                .collect();

            let cluster_emphasis = focus_cluster(simulation, cluster_id);

            Emphasis {
                nodes: node_emphasis,
                links,
                clusters: cluster_emphasis,
            }
        }
        _ => Emphasis {
            nodes: nodes
                .iter()
                .map(|node| NodeEmphasis {
                    class: NodeClass::Other,
                    opacity: 1.0,
                    border_width: default_border(node),
                    border_opacity: 1.0,
                })
                .collect(),
            links: simulation
                .links()
                .iter()
                .map(|link| default_link(link.kind, link.strength))
                .collect(),
            clusters: clusters
                .iter()
                .map(|_| ClusterEmphasis {
                    highlighted: false,
                    background_opacity: 0.1,
                    label_opacity: 1.0,
                })
                .collect(),
        },
    }
}
