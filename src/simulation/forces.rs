use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

/// A resolved link with its precomputed rest length, stiffness and the share
/// of the correction carried by the target end.
#[derive(Clone, Copy, Debug)]
pub(super) struct LinkConstraint {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) distance: f32,
    pub(super) stiffness: f32,
    pub(super) bias: f32,
}

impl LinkConstraint {
    /// Stiffness is inversely proportional to the lesser endpoint degree and
    /// the correction is split by relative degree, so hubs move less.
    pub(super) fn between(
        source: usize,
        target: usize,
        distance: f32,
        degrees: &[usize],
    ) -> Self {
        let source_degree = degrees[source].max(1) as f32;
        let target_degree = degrees[target].max(1) as f32;
        Self {
            source,
            target,
            distance,
            stiffness: 1.0 / source_degree.min(target_degree),
            bias: source_degree / (source_degree + target_degree),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct ChargeParams {
    pub(super) theta: f32,
    pub(super) distance_min_sq: f32,
    pub(super) alpha: f32,
}

/// Small deterministic offset that separates coincident points.
fn jiggle(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * TAU;
    vec2(angle.cos(), angle.sin()) * 1e-3
}

pub(super) fn apply_link_force(
    constraints: &[LinkConstraint],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    alpha: f32,
) {
    for link in constraints {
        let (source, target) = (link.source, link.target);
        if source == target {
            continue;
        }

        let mut delta =
            positions[target] + velocities[target] - positions[source] - velocities[source];
        if delta.length_sq() == 0.0 {
            delta = jiggle(source, target);
        }
        let distance = delta.length();
        let correction = delta * ((distance - link.distance) / distance * alpha * link.stiffness);

        velocities[target] -= correction * link.bias;
        velocities[source] += correction * (1.0 - link.bias);
    }
}

fn charge_from(delta: Vec2, charge: f32, params: ChargeParams) -> Vec2 {
    let mut distance_sq = delta.length_sq();
    if distance_sq < params.distance_min_sq {
        distance_sq = (params.distance_min_sq * distance_sq).sqrt();
    }
    delta * (charge * params.alpha / distance_sq)
}

/// Velocity change on node `index` from every charge in `node`, approximating
/// cells that are far enough away by their total charge.
pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    charges: &[f32],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let mut delta = positions[other] - point;
            if delta.length_sq() == 0.0 {
                delta = jiggle(index, other);
            }
            *velocity += charge_from(delta, charges[other], params);
        }
        return;
    }

    let delta = node.center_of_charge - point;
    let distance_sq = delta.length_sq();
    let width = node.bounds.width();
    let far_enough = !node.bounds.contains(point)
        && distance_sq > 0.0
        && width * width < params.theta * params.theta * distance_sq;

    if far_enough {
        *velocity += charge_from(delta, node.charge, params);
        return;
    }

    for child in node.children() {
        accumulate_charge_for_node(child, index, positions, charges, params, velocity);
    }
}

/// Velocity corrections that push overlapping pairs apart on their predicted
/// positions. The lighter node (by squared radius) moves further.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    predicted: &[Vec2],
    radii: &[f32],
    max_reach_sq: f32,
    corrections: &mut [Vec2],
) {
    if node_a.bounds.gap_sq(node_b.bounds) > max_reach_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    separate_pair(from, to, predicted, radii, corrections);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    separate_pair(from, to, predicted, radii, corrections);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(
                child_a,
                child_a,
                true,
                predicted,
                radii,
                max_reach_sq,
                corrections,
            );
            for child_b in &children[offset + 1..] {
                accumulate_collision_pairs(
                    child_a,
                    child_b,
                    false,
                    predicted,
                    radii,
                    max_reach_sq,
                    corrections,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(
                child,
                node_b,
                false,
                predicted,
                radii,
                max_reach_sq,
                corrections,
            );
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(
                node_a,
                child,
                false,
                predicted,
                radii,
                max_reach_sq,
                corrections,
            );
        }
    }
}

fn separate_pair(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    radii: &[f32],
    corrections: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to];
    let mut delta = predicted[from] - predicted[to];
    if delta.length_sq() >= min_distance * min_distance {
        return;
    }
    if delta.length_sq() == 0.0 {
        delta = jiggle(from, to);
    }

    let distance = delta.length();
    let push = delta * ((min_distance - distance) / distance);
    let from_mass = radii[from] * radii[from];
    let to_mass = radii[to] * radii[to];
    let share = to_mass / (from_mass + to_mass);

    corrections[from] += push * share;
    corrections[to] -= push * (1.0 - share);
}
