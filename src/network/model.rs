use std::collections::HashMap;

use eframe::egui::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Partner,
    Staff,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Partner => "Partner",
            Self::Staff => "Staff",
        }
    }
}

/// Functional role a partner is assumed to play, inferred from its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartnerRole {
    Implementation,
    Financing,
    Policy,
    Knowledge,
    Innovation,
    Coordination,
}

impl PartnerRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::Implementation => "Implementation",
            Self::Financing => "Financing",
            Self::Policy => "Policy",
            Self::Knowledge => "Knowledge",
            Self::Innovation => "Innovation",
            Self::Coordination => "Coordination",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeAttributes {
    pub partner_type: String,
    pub sector: String,
    pub region: String,
    pub country: String,
    pub contribution_value: f64,
    pub project_count: usize,
    pub directorate: Option<String>,
    pub division: Option<String>,
    pub roles: Vec<PartnerRole>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub display_name: String,
    pub kind: NodeKind,
    pub attributes: NodeAttributes,
    pub cluster_id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Fixed position while the node is being dragged.
    pub pinned: Option<Vec2>,
}

impl Node {
    pub fn is_partner(&self) -> bool {
        self.kind == NodeKind::Partner
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    ContactRelationship,
    Partnership,
    SameDivision,
    SameDirectorate,
}

impl LinkKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::ContactRelationship => "contact-relationship",
            Self::Partnership => "partnership",
            Self::SameDivision => "same-division",
            Self::SameDirectorate => "same-directorate",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
    pub strength: f32,
}

/// Data-quality counters gathered while building a graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub dangling_references: usize,
    pub duplicate_ids: usize,
}

/// Node arena plus links keyed by node id.
#[derive(Clone, Debug, Default)]
pub struct NetworkGraph {
    pub(super) nodes: Vec<Node>,
    pub(super) links: Vec<Link>,
    pub(super) index_by_id: HashMap<String, usize>,
    pub(super) report: BuildReport,
}

impl NetworkGraph {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn report(&self) -> BuildReport {
        self.report
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    /// Splits the graph into its arena parts for the simulation to own.
    pub fn into_parts(self) -> (Vec<Node>, Vec<Link>, HashMap<String, usize>) {
        (self.nodes, self.links, self.index_by_id)
    }

    /// Resolves each link to an index pair. Links are guaranteed resolvable by
    /// the builder, so this never drops entries for a built graph.
    pub fn link_indices(&self) -> Vec<(usize, usize)> {
        resolve_links(&self.links, &self.index_by_id)
    }
}

pub fn resolve_links(links: &[Link], index_by_id: &HashMap<String, usize>) -> Vec<(usize, usize)> {
    links
        .iter()
        .filter_map(|link| {
            Some((
                *index_by_id.get(&link.source)?,
                *index_by_id.get(&link.target)?,
            ))
        })
        .collect()
}

/// Undirected adjacency lists for the given link index pairs.
pub fn adjacency(node_count: usize, links: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut neighbors = vec![Vec::new(); node_count];
    for &(source, target) in links {
        if source >= node_count || target >= node_count || source == target {
            continue;
        }
        if !neighbors[source].contains(&target) {
            neighbors[source].push(target);
        }
        if !neighbors[target].contains(&source) {
            neighbors[target].push(source);
        }
    }
    neighbors
}
