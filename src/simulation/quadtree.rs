use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let span = (max - min).max(vec2(1.0, 1.0));
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span.x.max(span.y) * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    pub(super) fn width(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Squared gap between two boxes, zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        dx * dx + dy * dy
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign_x = if quadrant & 1 == 0 { -1.0 } else { 1.0 };
        let sign_y = if quadrant & 2 == 0 { -1.0 } else { 1.0 };
        Self {
            center: self.center + vec2(sign_x, sign_y) * quarter,
            half_extent: quarter,
        }
    }
}

/// Region tree over node positions. Each cell carries the summed charge of
/// the nodes inside it and their charge-weighted center, so distant cells can
/// stand in for their members.
pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) center_of_charge: Vec2,
    pub(super) charge: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    /// Builds a tree carrying the given per-node charges.
    pub(super) fn with_charges(positions: &[Vec2], charges: &[f32]) -> Option<Self> {
        let bounds = QuadBounds::enclosing(positions)?;
        let indices = (0..positions.len()).collect();
        Some(Self::build_node(bounds, indices, positions, &|index| charges[index], 0))
    }

    /// Builds a tree used only for spatial pruning.
    pub(super) fn spatial(positions: &[Vec2]) -> Option<Self> {
        let bounds = QuadBounds::enclosing(positions)?;
        let indices = (0..positions.len()).collect();
        Some(Self::build_node(bounds, indices, positions, &|_| 0.0, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        charge_of: &dyn Fn(usize) -> f32,
        depth: usize,
    ) -> Self {
        let mut charge = 0.0;
        let mut weight = 0.0;
        let mut weighted = Vec2::ZERO;
        for &index in &indices {
            let value = charge_of(index);
            charge += value;
            weight += value.abs();
            weighted += positions[index] * value.abs();
        }
        let center_of_charge = if weight > 0.0 {
            weighted / weight
        } else {
            bounds.center
        };

        let mut node = Self {
            bounds,
            center_of_charge,
            charge,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || node.indices.len() <= LEAF_CAPACITY {
            return node;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.quadrant_of(positions[index])].push(index);
        }
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                positions,
                charge_of,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadNode> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}
