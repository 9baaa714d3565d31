use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;
use tracing::{debug, info};

use super::clusters::{
    DEFAULT_CLUSTER_ID, UNKNOWN_CLUSTER_ID, is_registered_cluster, normalize_directorate,
    sector_cluster,
};
use super::model::{
    BuildReport, Link, LinkKind, NetworkGraph, Node, NodeAttributes, NodeKind, PartnerRole,
};
use super::records::{PartnerRecord, StaffRecord};

const FINANCING_CONTRIBUTION_THRESHOLD: f64 = 100_000.0;
const CONTACT_LINK_STRENGTH: f32 = 1.0;
const SAME_DIVISION_STRENGTH: f32 = 1.0;
const SAME_DIRECTORATE_STRENGTH: f32 = 0.5;

#[derive(Clone, Copy, Debug)]
pub struct BuildOptions {
    /// Link staff members that share a division or directorate.
    pub staff_ties: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { staff_ties: true }
    }
}

pub fn build_network(
    partners: &[PartnerRecord],
    staff: &[StaffRecord],
    options: BuildOptions,
) -> NetworkGraph {
    let mut builder = GraphBuilder::default();

    let mut staff_by_id: HashMap<&str, &StaffRecord> = HashMap::with_capacity(staff.len());
    for record in staff {
        if !record.id.is_empty() {
            staff_by_id.entry(record.id.as_str()).or_insert(record);
        }
    }

    let mut declared_ids = partners
        .iter()
        .map(|partner| partner.id.as_str())
        .chain(staff.iter().map(|record| record.id.as_str()))
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect::<HashSet<_>>();

    let mut partner_ids = Vec::with_capacity(partners.len());
    for (position, partner) in partners.iter().enumerate() {
        let id = if partner.id.is_empty() {
            fallback_partner_id(position, &mut declared_ids)
        } else {
            partner.id.clone()
        };
        let cluster_id = assign_partner_cluster(partner, &staff_by_id);
        if builder.push(make_partner_node(id.clone(), partner, cluster_id)) {
            partner_ids.push(Some(id));
        } else {
            partner_ids.push(None);
        }
    }

    // Only partners that made it into the graph pull their contacts in.
    let included_staff = partners
        .iter()
        .zip(&partner_ids)
        .filter(|(_, id)| id.is_some())
        .filter_map(|(partner, _)| partner.main_contact.as_deref())
        .filter(|contact| staff_by_id.contains_key(contact))
        .collect::<HashSet<_>>();

    let mut staff_indices = Vec::new();
    for record in staff {
        if !included_staff.contains(record.id.as_str()) {
            continue;
        }
        if builder.push(make_staff_node(record)) {
            staff_indices.push(builder.nodes.len() - 1);
        }
    }

    for (partner, id) in partners.iter().zip(&partner_ids) {
        let Some(id) = id else {
            continue;
        };

        if let Some(contact) = partner.main_contact.as_deref() {
            if builder.is_kind(contact, NodeKind::Staff) {
                builder.link(id, contact, LinkKind::ContactRelationship, CONTACT_LINK_STRENGTH);
            } else {
                debug!(partner = %id, contact, "dropping contact reference to unknown staff");
                builder.report.dangling_references += 1;
            }
        }

        for connection in &partner.connections {
            if connection == id {
                continue;
            }
            if !builder.is_kind(connection, NodeKind::Partner) {
                debug!(partner = %id, connection = %connection, "dropping unresolved partnership");
                builder.report.dangling_references += 1;
                continue;
            }
            let strength = builder.partnership_strength(id, connection);
            builder.link(id, connection, LinkKind::Partnership, strength);
        }
    }

    if options.staff_ties {
        builder.link_staff_ties(&staff_indices);
    }

    let graph = builder.finish();
    info!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        dangling = graph.report.dangling_references,
        duplicates = graph.report.duplicate_ids,
        "built partner network"
    );
    graph
}

/// Id for a partner record without one, unique among every declared id.
fn fallback_partner_id(position: usize, taken: &mut HashSet<String>) -> String {
    let base = format!("partner-{}", position + 1);
    let mut candidate = base.clone();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Contact directorate first, then the sector keyword table, then the
/// default cluster.
pub fn assign_partner_cluster(
    partner: &PartnerRecord,
    staff_by_id: &HashMap<&str, &StaffRecord>,
) -> String {
    partner
        .main_contact
        .as_deref()
        .and_then(|contact| staff_by_id.get(contact))
        .and_then(|staff| staff.unit.directorate.as_deref())
        .map(normalize_directorate)
        .filter(|cluster| is_registered_cluster(cluster))
        .or_else(|| sector_cluster(&partner.sector).map(str::to_owned))
        .unwrap_or_else(|| DEFAULT_CLUSTER_ID.to_owned())
}

pub fn infer_partner_roles(partner_type: &str, contribution_value: f64) -> Vec<PartnerRole> {
    match partner_type {
        "Private Sector" => {
            let mut roles = vec![PartnerRole::Implementation];
            if contribution_value > FINANCING_CONTRIBUTION_THRESHOLD {
                roles.push(PartnerRole::Financing);
            }
            roles
        }
        "Government" => vec![PartnerRole::Policy, PartnerRole::Financing],
        "Academic" => vec![PartnerRole::Knowledge, PartnerRole::Innovation],
        "NGO" => vec![PartnerRole::Implementation, PartnerRole::Knowledge],
        "UN Agency" | "International Organization" => vec![
            PartnerRole::Coordination,
            PartnerRole::Policy,
            PartnerRole::Knowledge,
        ],
        _ => Vec::new(),
    }
}

/// Complementary roles and a shared region strengthen a partnership tie.
pub fn partnership_strength(source: &NodeAttributes, target: &NodeAttributes) -> f32 {
    let mut strength = 1.0;
    if source.roles.contains(&PartnerRole::Implementation)
        && target.roles.contains(&PartnerRole::Financing)
    {
        strength += 1.0;
    }
    if source.roles.contains(&PartnerRole::Knowledge)
        && target.roles.contains(&PartnerRole::Implementation)
    {
        strength += 0.8;
    }
    if !source.region.is_empty() && source.region == target.region {
        strength += 0.5;
    }
    strength
}

fn make_partner_node(id: String, partner: &PartnerRecord, cluster_id: String) -> Node {
    let contribution_value = partner.contribution_value();
    let region = if partner.region.is_empty() {
        "Unknown".to_owned()
    } else {
        partner.region.clone()
    };
    let display_name = if partner.name.is_empty() {
        id.clone()
    } else {
        partner.name.clone()
    };

    Node {
        id,
        display_name,
        kind: NodeKind::Partner,
        attributes: NodeAttributes {
            partner_type: partner.partner_type.clone(),
            sector: partner.sector.clone(),
            region,
            country: partner.country.clone(),
            contribution_value,
            project_count: partner.projects.len(),
            directorate: None,
            division: None,
            roles: infer_partner_roles(&partner.partner_type, contribution_value),
        },
        cluster_id,
        position: Vec2::ZERO,
        velocity: Vec2::ZERO,
        pinned: None,
    }
}

fn make_staff_node(record: &StaffRecord) -> Node {
    let cluster_id = record
        .unit
        .directorate
        .as_deref()
        .map(normalize_directorate)
        .unwrap_or_else(|| UNKNOWN_CLUSTER_ID.to_owned());
    let display_name = if record.name.is_empty() {
        record.id.clone()
    } else {
        record.name.clone()
    };

    Node {
        id: record.id.clone(),
        display_name,
        kind: NodeKind::Staff,
        attributes: NodeAttributes {
            partner_type: record.title.clone(),
            region: "Unknown".to_owned(),
            directorate: record.unit.directorate.clone(),
            division: record.unit.division.clone(),
            ..NodeAttributes::default()
        },
        cluster_id,
        position: Vec2::ZERO,
        velocity: Vec2::ZERO,
        pinned: None,
    }
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<Node>,
    links: Vec<Link>,
    index_by_id: HashMap<String, usize>,
    link_pairs: HashSet<(usize, usize)>,
    report: BuildReport,
}

impl GraphBuilder {
    fn is_kind(&self, id: &str, kind: NodeKind) -> bool {
        self.index_by_id
            .get(id)
            .is_some_and(|&index| self.nodes[index].kind == kind)
    }

    fn push(&mut self, node: Node) -> bool {
        if self.index_by_id.contains_key(&node.id) {
            debug!(id = %node.id, "skipping node with duplicate id");
            self.report.duplicate_ids += 1;
            return false;
        }
        self.index_by_id.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    fn partnership_strength(&self, source: &str, target: &str) -> f32 {
        match (self.index_by_id.get(source), self.index_by_id.get(target)) {
            (Some(&source), Some(&target)) => partnership_strength(
                &self.nodes[source].attributes,
                &self.nodes[target].attributes,
            ),
            _ => 1.0,
        }
    }

    /// Adds a link between two existing nodes; a pair is linked at most once
    /// regardless of direction.
    fn link(&mut self, source: &str, target: &str, kind: LinkKind, strength: f32) {
        let (Some(&from), Some(&to)) = (self.index_by_id.get(source), self.index_by_id.get(target))
        else {
            return;
        };
        if from == to || !self.link_pairs.insert((from.min(to), from.max(to))) {
            return;
        }

        self.links.push(Link {
            source: source.to_owned(),
            target: target.to_owned(),
            kind,
            strength,
        });
    }

    fn link_staff_ties(&mut self, staff_indices: &[usize]) {
        for (offset, &first) in staff_indices.iter().enumerate() {
            for &second in &staff_indices[offset + 1..] {
                let a = &self.nodes[first].attributes;
                let b = &self.nodes[second].attributes;

                let same_division = a.division.is_some() && a.division == b.division;
                let same_directorate = a.directorate.as_deref().map(normalize_directorate)
                    == b.directorate.as_deref().map(normalize_directorate)
                    && a.directorate.is_some();

                let tie = if same_division {
                    Some((LinkKind::SameDivision, SAME_DIVISION_STRENGTH))
                } else if same_directorate {
                    Some((LinkKind::SameDirectorate, SAME_DIRECTORATE_STRENGTH))
                } else {
                    None
                };

                if let Some((kind, strength)) = tie {
                    let source = self.nodes[first].id.clone();
                    let target = self.nodes[second].id.clone();
                    self.link(&source, &target, kind, strength);
                }
            }
        }
    }

    fn finish(self) -> NetworkGraph {
        NetworkGraph {
            nodes: self.nodes,
            links: self.links,
            index_by_id: self.index_by_id,
            report: self.report,
        }
    }
}
