//! Current selection and the force overrides it implies.

mod emphasis;

use std::collections::HashSet;

use eframe::egui::vec2;
use tracing::debug;

use crate::network::adjacency;
use crate::simulation::{ForceSimulation, NodeForces};
use crate::util::stable_pair;

pub use emphasis::Emphasis;

const NODE_SELECTION_ALPHA: f32 = 0.3;
const CLUSTER_SELECTION_ALPHA: f32 = 0.5;
const CLEAR_AFTER_CLUSTER_ALPHA: f32 = 0.3;
const CLEAR_AFTER_NODE_ALPHA: f32 = 0.2;

const NEIGHBOR_SPREAD: f32 = 50.0;
const OTHER_SPREAD: f32 = 100.0;
const MEMBER_SPREAD: f32 = 50.0;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Unselected,
    Node(String),
    Cluster(String),
}

impl Selection {
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::Node(id) => Some(id),
            _ => None,
        }
    }

    pub fn cluster_id(&self) -> Option<&str> {
        match self {
            Self::Cluster(id) => Some(id),
            _ => None,
        }
    }

    /// State reached from `self` on `input`. Clicking the current node or
    /// cluster again clears the selection.
    pub fn next(&self, input: SelectionInput<'_>) -> Self {
        match input {
            SelectionInput::Background => Self::Unselected,
            SelectionInput::Node(id) if self.node_id() == Some(id) => Self::Unselected,
            SelectionInput::Node(id) => Self::Node(id.to_owned()),
            SelectionInput::Cluster(id) if self.cluster_id() == Some(id) => Self::Unselected,
            SelectionInput::Cluster(id) => Self::Cluster(id.to_owned()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionInput<'a> {
    Background,
    Node(&'a str),
    Cluster(&'a str),
}

/// Raised whenever the selected node changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionEvent {
    pub node_id: Option<String>,
}

pub struct SelectionMachine {
    selection: Selection,
    neighbors: Vec<Vec<usize>>,
    focus: Option<usize>,
    related: HashSet<usize>,
}

impl SelectionMachine {
    pub fn new(simulation: &ForceSimulation) -> Self {
        Self {
            selection: Selection::Unselected,
            neighbors: adjacency(simulation.nodes().len(), simulation.link_pairs()),
            focus: None,
            related: HashSet::new(),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Index of the selected node, if any.
    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Neighbors of the selected node, or members of the selected cluster.
    pub fn related(&self) -> &HashSet<usize> {
        &self.related
    }

    pub fn select(
        &mut self,
        input: SelectionInput<'_>,
        simulation: &mut ForceSimulation,
    ) -> Option<SelectionEvent> {
        match input {
            SelectionInput::Node(id) if simulation.index_of(id).is_none() => {
                debug!(id, "ignoring selection of unknown node");
                return None;
            }
            SelectionInput::Cluster(id) if simulation.clusters().get(id).is_none() => {
                debug!(id, "ignoring selection of unregistered cluster");
                return None;
            }
            _ => {}
        }

        let next = self.selection.next(input);
        if next == self.selection {
            return None;
        }

        let previous = std::mem::replace(&mut self.selection, next);
        self.refresh_related(simulation);
        self.apply_forces(simulation);

        let alpha = match (&previous, &self.selection) {
            (_, Selection::Node(_)) => NODE_SELECTION_ALPHA,
            (_, Selection::Cluster(_)) => CLUSTER_SELECTION_ALPHA,
            (Selection::Cluster(_), Selection::Unselected) => CLEAR_AFTER_CLUSTER_ALPHA,
            (_, Selection::Unselected) => CLEAR_AFTER_NODE_ALPHA,
        };
        simulation.reheat(alpha);
        debug!(from = ?previous, to = ?self.selection, alpha, "selection changed");

        (previous.node_id() != self.selection.node_id()).then(|| SelectionEvent {
            node_id: self.selection.node_id().map(str::to_owned),
        })
    }

    /// Writes the per-node forces for the current selection into the
    /// simulation. Also used after a resize has restored defaults.
    pub fn apply_forces(&self, simulation: &mut ForceSimulation) {
        simulation.reset_forces();
        let center = simulation.viewport().center();
        let overrides = match &self.selection {
            Selection::Unselected => return,
            Selection::Node(_) => {
                let Some(selected) = self.focus else {
                    return;
                };
                simulation
                    .nodes()
                    .iter()
                    .enumerate()
                    .map(|(index, node)| {
                        let (jx, jy) = stable_pair(&node.id);
                        let jitter = vec2(jx, jy);
                        if index == selected {
                            NodeForces {
                                charge: -200.0,
                                target: center,
                                target_strength: 0.2,
                            }
                        } else if self.related.contains(&index) {
                            NodeForces {
                                charge: -150.0,
                                target: center + jitter * NEIGHBOR_SPREAD,
                                target_strength: 0.1,
                            }
                        } else {
                            NodeForces {
                                charge: -100.0,
                                target: center + jitter * OTHER_SPREAD,
                                target_strength: 0.05,
                            }
                        }
                    })
                    .collect::<Vec<_>>()
            }
            Selection::Cluster(cluster_id) => {
                let Some(anchor) = simulation.clusters().anchor(cluster_id) else {
                    return;
                };
                simulation
                    .nodes()
                    .iter()
                    .enumerate()
                    .map(|(index, node)| {
                        let (jx, jy) = stable_pair(&node.id);
                        let jitter = vec2(jx, jy);
                        if self.related.contains(&index) {
                            NodeForces {
                                charge: -100.0,
                                target: anchor + jitter * MEMBER_SPREAD,
                                target_strength: 0.2,
                            }
                        } else {
                            NodeForces {
                                charge: -30.0,
                                target: center + jitter * OTHER_SPREAD,
                                target_strength: 0.05,
                            }
                        }
                    })
                    .collect::<Vec<_>>()
            }
        };

        for (index, forces) in overrides.into_iter().enumerate() {
            simulation.set_node_forces(index, forces);
        }
    }

    pub fn emphasis(&self, simulation: &ForceSimulation) -> Emphasis {
        emphasis::classify(&self.selection, self.focus, &self.related, simulation)
    }

    fn refresh_related(&mut self, simulation: &ForceSimulation) {
        self.related.clear();
        self.focus = None;

        match &self.selection {
            Selection::Unselected => {}
            Selection::Node(id) => {
                if let Some(index) = simulation.index_of(id) {
                    self.focus = Some(index);
                    self.related.extend(self.neighbors[index].iter().copied());
                }
            }
            Selection::Cluster(cluster_id) => {
                self.related.extend(
                    simulation
                        .nodes()
                        .iter()
                        .enumerate()
                        .filter(|(_, node)| node.cluster_id == *cluster_id)
                        .map(|(index, _)| index),
                );
            }
        }
    }
}
