//! Iterative force-directed layout.
//!
//! Each tick cools `alpha` towards `alpha_target`, accumulates link, charge,
//! collision, positioning and cluster forces into node velocities, then
//! integrates positions. The loop stops by itself once `alpha` falls below
//! `alpha_min`; dragging and selection changes re-energize it.

mod forces;
mod quadtree;
mod sizing;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, info};

use crate::error::LayoutError;
use crate::network::{ClusterRegistry, Link, LinkKind, NetworkGraph, Node, Viewport};
use crate::util::stable_pair;
use forces::{
    ChargeParams, LinkConstraint, accumulate_charge_for_node, accumulate_collision_pairs,
    apply_link_force,
};
use quadtree::QuadNode;
pub use sizing::{PARTNER_SIDE_SCALE, half_extent, node_radius};

/// Alpha the layout is kept warm at while a node is dragged.
pub const DRAG_ALPHA_TARGET: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,
    pub link_distance: f32,
    pub link_distance_per_strength: f32,
    pub charge: f32,
    pub theta: f32,
    pub distance_min: f32,
    pub collision_margin: f32,
    pub center_strength: f32,
    pub cluster_strength: f32,
    pub seed_jitter: f32,
    pub max_speed: Option<f32>,
}

impl Default for ForceParams {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            link_distance: 60.0,
            link_distance_per_strength: 10.0,
            charge: -150.0,
            theta: 0.9,
            distance_min: 1.0,
            collision_margin: 2.0,
            center_strength: 0.01,
            cluster_strength: 0.2,
            seed_jitter: 50.0,
            max_speed: None,
        }
    }
}

/// Per-node many-body charge and positioning target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeForces {
    pub charge: f32,
    pub target: Vec2,
    pub target_strength: f32,
}

/// Link endpoints resolved to current coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkFrame {
    pub source: usize,
    pub target: usize,
    pub from: Vec2,
    pub to: Vec2,
    pub kind: LinkKind,
    pub strength: f32,
}

/// Read-only view of the layout after a tick.
pub struct LayoutSnapshot<'a> {
    pub nodes: &'a [Node],
    pub radii: &'a [f32],
    pub links: Vec<LinkFrame>,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    predicted: Vec<Vec2>,
    corrections: Vec<Vec2>,
    charges: Vec<f32>,
    collision_radii: Vec<f32>,
}

pub struct ForceSimulation {
    params: ForceParams,
    nodes: Vec<Node>,
    links: Vec<Link>,
    index_by_id: HashMap<String, usize>,
    link_pairs: Vec<(usize, usize)>,
    constraints: Vec<LinkConstraint>,
    radii: Vec<f32>,
    node_forces: Vec<NodeForces>,
    clusters: ClusterRegistry,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    ticks: u64,
    scratch: Scratch,
}

impl ForceSimulation {
    pub fn new(
        graph: NetworkGraph,
        viewport: Viewport,
        params: ForceParams,
    ) -> Result<Self, LayoutError> {
        if graph.is_empty() {
            return Err(LayoutError::EmptyGraph);
        }
        if !viewport.is_available() {
            return Err(LayoutError::ViewportUnavailable {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let clusters = ClusterRegistry::new(viewport);
        let (mut nodes, links, index_by_id) = graph.into_parts();
        let (links, link_pairs): (Vec<Link>, Vec<(usize, usize)>) = links
            .into_iter()
            .filter_map(|link| {
                let source = *index_by_id.get(&link.source)?;
                let target = *index_by_id.get(&link.target)?;
                Some((link, (source, target)))
            })
            .unzip();

        let mut degrees = vec![0usize; nodes.len()];
        for &(source, target) in &link_pairs {
            degrees[source] += 1;
            degrees[target] += 1;
        }
        let constraints = link_pairs
            .iter()
            .zip(&links)
            .map(|(&(source, target), link)| {
                let distance =
                    params.link_distance + link.strength * params.link_distance_per_strength;
                LinkConstraint::between(source, target, distance, &degrees)
            })
            .collect();

        let center = viewport.center();
        for node in &mut nodes {
            let (jx, jy) = stable_pair(&node.id);
            let origin = clusters.anchor(&node.cluster_id).unwrap_or(center);
            node.position = origin + vec2(jx, jy) * params.seed_jitter;
            node.velocity = Vec2::ZERO;
            node.pinned = None;
        }

        let radii = nodes.iter().map(node_radius).collect();
        let defaults = NodeForces {
            charge: params.charge,
            target: center,
            target_strength: params.center_strength,
        };

        info!(
            nodes = nodes.len(),
            links = link_pairs.len(),
            width = viewport.width,
            height = viewport.height,
            "starting force simulation"
        );

        Ok(Self {
            params,
            node_forces: vec![defaults; nodes.len()],
            nodes,
            links,
            index_by_id,
            link_pairs,
            constraints,
            radii,
            clusters,
            alpha: 1.0,
            alpha_target: 0.0,
            running: true,
            ticks: 0,
            scratch: Scratch::default(),
        })
    }

    pub fn params(&self) -> &ForceParams {
        &self.params
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link_pairs(&self) -> &[(usize, usize)] {
        &self.link_pairs
    }

    pub fn radii(&self) -> &[f32] {
        &self.radii
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn clusters(&self) -> &ClusterRegistry {
        &self.clusters
    }

    pub fn viewport(&self) -> Viewport {
        self.clusters.viewport()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn node_forces(&self) -> &[NodeForces] {
        &self.node_forces
    }

    /// Advances the layout by one step. Returns whether the loop is still
    /// running afterwards.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        self.accumulate_forces();
        self.integrate();
        self.ticks += 1;

        if self.alpha < self.params.alpha_min {
            self.running = false;
            debug!(ticks = self.ticks, "force simulation cooled down");
        }
        self.running
    }

    /// Sets alpha and resumes ticking.
    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = alpha.max(0.0);
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn default_forces(&self) -> NodeForces {
        NodeForces {
            charge: self.params.charge,
            target: self.viewport().center(),
            target_strength: self.params.center_strength,
        }
    }

    pub fn set_node_forces(&mut self, index: usize, forces: NodeForces) {
        if let Some(slot) = self.node_forces.get_mut(index) {
            *slot = forces;
        }
    }

    pub fn reset_forces(&mut self) {
        let defaults = self.default_forces();
        self.node_forces.fill(defaults);
    }

    /// Re-anchors clusters for a new viewport and restores default forces.
    /// Returns whether the viewport actually changed.
    pub fn resize(&mut self, viewport: Viewport) -> Result<bool, LayoutError> {
        if !viewport.is_available() {
            return Err(LayoutError::ViewportUnavailable {
                width: viewport.width,
                height: viewport.height,
            });
        }
        if viewport == self.viewport() {
            return Ok(false);
        }

        debug!(width = viewport.width, height = viewport.height, "re-anchoring clusters");
        self.clusters = ClusterRegistry::new(viewport);
        self.reset_forces();
        Ok(true)
    }

    /// Pins a node where it stands and keeps the layout warm until release.
    pub fn begin_drag(&mut self, index: usize) {
        let Some(node) = self.nodes.get_mut(index) else {
            return;
        };
        node.pinned = Some(node.position);
        self.alpha_target = DRAG_ALPHA_TARGET;
        self.running = true;
    }

    pub fn drag_to(&mut self, index: usize, point: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = Some(point);
        }
    }

    pub fn end_drag(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = None;
        }
        self.alpha_target = 0.0;
    }

    /// Topmost node whose drawn shape contains `point`.
    pub fn node_at(&self, point: Vec2) -> Option<usize> {
        self.nodes
            .iter()
            .zip(&self.radii)
            .enumerate()
            .rev()
            .find(|(_, (node, radius))| sizing::shape_contains(node, **radius, point))
            .map(|(index, _)| index)
    }

    pub fn snapshot(&self) -> LayoutSnapshot<'_> {
        let links = self
            .link_pairs
            .iter()
            .zip(&self.links)
            .map(|(&(source, target), link)| LinkFrame {
                source,
                target,
                from: self.nodes[source].position,
                to: self.nodes[target].position,
                kind: link.kind,
                strength: link.strength,
            })
            .collect();

        LayoutSnapshot {
            nodes: &self.nodes,
            radii: &self.radii,
            links,
        }
    }

    fn accumulate_forces(&mut self) {
        let alpha = self.alpha;
        let params = self.params;
        let scratch = &mut self.scratch;

        scratch.positions.clear();
        scratch.velocities.clear();
        scratch.charges.clear();
        for (node, forces) in self.nodes.iter().zip(&self.node_forces) {
            scratch.positions.push(node.position);
            scratch.velocities.push(node.velocity);
            scratch.charges.push(forces.charge);
        }

        apply_link_force(
            &self.constraints,
            &scratch.positions,
            &mut scratch.velocities,
            alpha,
        );

        if let Some(tree) = QuadNode::with_charges(&scratch.positions, &scratch.charges) {
            let charge_params = ChargeParams {
                theta: params.theta,
                distance_min_sq: params.distance_min * params.distance_min,
                alpha,
            };
            for (index, velocity) in scratch.velocities.iter_mut().enumerate() {
                accumulate_charge_for_node(
                    &tree,
                    index,
                    &scratch.positions,
                    &scratch.charges,
                    charge_params,
                    velocity,
                );
            }
        }

        scratch.predicted.clear();
        scratch.collision_radii.clear();
        let mut max_radius = 0.0_f32;
        for ((position, velocity), radius) in scratch
            .positions
            .iter()
            .zip(&scratch.velocities)
            .zip(&self.radii)
        {
            let padded = radius + params.collision_margin;
            scratch.predicted.push(*position + *velocity);
            scratch.collision_radii.push(padded);
            max_radius = max_radius.max(padded);
        }
        scratch.corrections.clear();
        scratch.corrections.resize(self.nodes.len(), Vec2::ZERO);
        if let Some(tree) = QuadNode::spatial(&scratch.predicted) {
            let reach = max_radius * 2.0;
            accumulate_collision_pairs(
                &tree,
                &tree,
                true,
                &scratch.predicted,
                &scratch.collision_radii,
                reach * reach,
                &mut scratch.corrections,
            );
        }

        for (index, velocity) in scratch.velocities.iter_mut().enumerate() {
            let position = scratch.positions[index];
            let forces = self.node_forces[index];
            *velocity += scratch.corrections[index];
            *velocity += (forces.target - position) * (forces.target_strength * alpha);
            if let Some(anchor) = self.clusters.anchor(&self.nodes[index].cluster_id) {
                *velocity += (anchor - position) * (alpha * params.cluster_strength);
            }
        }
    }

    fn integrate(&mut self) {
        let retain = 1.0 - self.params.velocity_decay;
        for (node, velocity) in self.nodes.iter_mut().zip(&self.scratch.velocities) {
            if let Some(pinned) = node.pinned {
                node.position = pinned;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = *velocity * retain;
            if let Some(max_speed) = self.params.max_speed {
                let speed = velocity.length();
                if speed > max_speed {
                    velocity *= max_speed / speed;
                }
            }
            node.velocity = velocity;
            node.position += velocity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{BuildOptions, PartnerRecord, build_network, load_dataset};

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn isolated_partners(clusters: &[&str]) -> NetworkGraph {
        let partners = clusters
            .iter()
            .enumerate()
            .map(|(index, cluster)| PartnerRecord {
                id: format!("p{index}"),
                sector: (*cluster).to_owned(),
                ..PartnerRecord::default()
            })
            .collect::<Vec<_>>();
        build_network(&partners, &[], BuildOptions::default())
    }

    fn sample_simulation() -> ForceSimulation {
        let dataset = load_dataset(None).unwrap();
        let graph = build_network(&dataset.partners, &dataset.staff, BuildOptions::default());
        ForceSimulation::new(graph, viewport(), ForceParams::default()).unwrap()
    }

    fn run_to_rest(simulation: &mut ForceSimulation) -> u64 {
        while simulation.tick() {
            assert!(simulation.ticks() < 10_000, "simulation never cooled down");
        }
        simulation.ticks()
    }

    #[test]
    fn test_start_rejects_empty_graph() {
        let result =
            ForceSimulation::new(NetworkGraph::default(), viewport(), ForceParams::default());

        assert_eq!(result.err(), Some(LayoutError::EmptyGraph));
    }

    #[test]
    fn test_start_rejects_missing_viewport() {
        let result = ForceSimulation::new(
            isolated_partners(&["Innovation"]),
            Viewport::new(0.0, 600.0),
            ForceParams::default(),
        );

        assert!(matches!(
            result.err(),
            Some(LayoutError::ViewportUnavailable { width, .. }) if width == 0.0
        ));
    }

    #[test]
    fn test_alpha_cools_and_loop_stops() {
        let mut simulation = sample_simulation();
        assert_eq!(simulation.alpha(), 1.0);

        let ticks = run_to_rest(&mut simulation);

        assert!((295..=305).contains(&ticks), "stopped after {ticks} ticks");
        assert!(!simulation.is_running());
        assert!(simulation.alpha() < simulation.params().alpha_min);
    }

    #[test]
    fn test_stopped_simulation_does_not_move() {
        let mut simulation = sample_simulation();
        simulation.tick();
        simulation.stop();
        let before = simulation.nodes().to_vec();

        assert!(!simulation.tick());
        assert_eq!(simulation.nodes(), before.as_slice());
    }

    #[test]
    fn test_reheat_resumes_loop() {
        let mut simulation = sample_simulation();
        run_to_rest(&mut simulation);

        simulation.reheat(0.3);

        assert!(simulation.is_running());
        assert!(simulation.tick());
        assert!(simulation.alpha() < 0.3);
    }

    #[test]
    fn test_seeding_is_deterministic_and_near_anchor() {
        let first = sample_simulation();
        let second = sample_simulation();

        for (a, b) in first.nodes().iter().zip(second.nodes()) {
            assert_eq!(a.position, b.position);
            let origin = first
                .clusters()
                .anchor(&a.cluster_id)
                .unwrap_or(viewport().center());
            assert!((a.position - origin).x.abs() <= 50.001);
            assert!((a.position - origin).y.abs() <= 50.001);
        }
    }

    #[test]
    fn test_drag_pins_node_and_release_cools() {
        let mut simulation = sample_simulation();
        let start = simulation.nodes()[0].position;

        simulation.begin_drag(0);
        for _ in 0..20 {
            simulation.tick();
        }

        assert_eq!(simulation.nodes()[0].position, start);
        assert_eq!(simulation.nodes()[0].velocity, Vec2::ZERO);
        assert_eq!(simulation.alpha_target(), DRAG_ALPHA_TARGET);

        let moved = vec2(300.0, 200.0);
        simulation.drag_to(0, moved);
        simulation.tick();
        assert_eq!(simulation.nodes()[0].position, moved);

        simulation.end_drag(0);
        assert_eq!(simulation.nodes()[0].pinned, None);
        assert_eq!(simulation.alpha_target(), 0.0);
    }

    #[test]
    fn test_dragging_keeps_loop_alive() {
        let mut simulation = sample_simulation();
        simulation.begin_drag(1);

        for _ in 0..1_000 {
            assert!(simulation.tick());
        }
        assert!((simulation.alpha() - DRAG_ALPHA_TARGET).abs() < 0.01);
    }

    #[test]
    fn test_settled_layout_has_no_overlaps() {
        let mut simulation = sample_simulation();
        run_to_rest(&mut simulation);

        let nodes = simulation.nodes();
        let radii = simulation.radii();
        for first in 0..nodes.len() {
            for second in first + 1..nodes.len() {
                let distance = (nodes[first].position - nodes[second].position).length();
                let required = radii[first] + radii[second];
                assert!(
                    distance >= required * 0.95,
                    "{} and {} overlap: {distance} < {required}",
                    nodes[first].id,
                    nodes[second].id
                );
            }
        }
    }

    #[test]
    fn test_isolated_nodes_settle_at_their_anchor() {
        let graph = isolated_partners(&[
            "Office of the Director General",
            "Technical Cooperation",
            "Innovation",
        ]);
        let mut simulation = ForceSimulation::new(graph, viewport(), ForceParams::default()).unwrap();
        run_to_rest(&mut simulation);

        for node in simulation.nodes() {
            let anchor = simulation.clusters().anchor(&node.cluster_id).unwrap();
            assert!(
                (node.position - anchor).length() < 25.0,
                "{} is {} away from its anchor",
                node.id,
                (node.position - anchor).length()
            );
        }
    }

    #[test]
    fn test_position_override_moves_node_toward_target() {
        let mut simulation = ForceSimulation::new(
            isolated_partners(&["Innovation", "Innovation"]),
            viewport(),
            ForceParams::default(),
        )
        .unwrap();
        let target = viewport().center();
        let start = (simulation.nodes()[0].position - target).length();

        simulation.set_node_forces(
            0,
            NodeForces {
                charge: -150.0,
                target,
                target_strength: 0.2,
            },
        );
        for _ in 0..60 {
            simulation.tick();
        }

        assert!((simulation.nodes()[0].position - target).length() < start);
        simulation.reset_forces();
        assert_eq!(simulation.node_forces()[0], simulation.default_forces());
    }

    #[test]
    fn test_resize_reanchors_and_resets_forces() {
        let mut simulation = sample_simulation();
        let before = simulation.clusters().anchor("spp").unwrap();
        simulation.set_node_forces(
            0,
            NodeForces {
                charge: -30.0,
                target: Vec2::ZERO,
                target_strength: 0.5,
            },
        );

        assert!(simulation.resize(Viewport::new(1600.0, 1200.0)).unwrap());
        assert!(!simulation.resize(Viewport::new(1600.0, 1200.0)).unwrap());

        assert_ne!(simulation.clusters().anchor("spp").unwrap(), before);
        assert_eq!(simulation.node_forces()[0].target, vec2(800.0, 600.0));
        assert!(simulation.resize(Viewport::new(-1.0, 5.0)).is_err());
    }

    #[test]
    fn test_snapshot_resolves_links_and_hit_testing() {
        let simulation = sample_simulation();
        let snapshot = simulation.snapshot();

        assert_eq!(snapshot.links.len(), simulation.links().len());
        for frame in &snapshot.links {
            assert_eq!(frame.from, snapshot.nodes[frame.source].position);
            assert_eq!(frame.to, snapshot.nodes[frame.target].position);
        }

        let topmost = snapshot.nodes.len() - 1;
        assert_eq!(
            simulation.node_at(snapshot.nodes[topmost].position),
            Some(topmost)
        );
        assert_eq!(simulation.node_at(vec2(-500.0, -500.0)), None);
    }
}
