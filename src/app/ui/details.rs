use eframe::egui::{RichText, Ui};

use crate::network::{Node, NodeKind};
use crate::selection::Selection;
use crate::session::LayoutSession;
use crate::util::format_amount;

use super::super::ViewModel;

const MEMBER_ROWS: usize = 24;

fn node_summary(ui: &mut Ui, node: &Node, session: &LayoutSession) {
    let clusters = session.simulation().clusters();
    let attributes = &node.attributes;

    ui.label(RichText::new(node.display_name.as_str()).strong());
    ui.small(format!("{}  ({})", node.id, node.kind.label()));
    ui.add_space(6.0);

    ui.label(format!(
        "Organizational unit: {}",
        clusters.name(&node.cluster_id).unwrap_or("Unknown")
    ));

    match node.kind {
        NodeKind::Partner => {
            ui.label(format!("Type: {}", attributes.partner_type));
            ui.label(format!("Sector: {}", attributes.sector));
            ui.label(format!("Region: {}", attributes.region));
            if !attributes.country.is_empty() {
                ui.label(format!("Country: {}", attributes.country));
            }
            ui.label(format!(
                "Contributions: {}",
                format_amount(attributes.contribution_value)
            ));
            ui.label(format!("Projects: {}", attributes.project_count));
            if !attributes.roles.is_empty() {
                let roles = attributes
                    .roles
                    .iter()
                    .map(|role| role.label())
                    .collect::<Vec<_>>();
                ui.label(format!("Roles: {}", roles.join(", ")));
            }
        }
        NodeKind::Staff => {
            ui.label(format!(
                "Directorate: {}",
                attributes.directorate.as_deref().unwrap_or("-")
            ));
            ui.label(format!(
                "Division: {}",
                attributes.division.as_deref().unwrap_or("-")
            ));
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(session) = self.session.as_ref() else {
            ui.label("No layout is running.");
            return;
        };

        let mut follow = None;
        match session.selection() {
            Selection::Unselected => {
                ui.label("Click a node or a cluster area to focus it.");
            }
            Selection::Node(_) => {
                let index = self
                    .details
                    .as_deref()
                    .and_then(|id| session.simulation().index_of(id));
                if let Some(index) = index {
                    follow = Self::draw_node_details(ui, session, index);
                }
            }
            Selection::Cluster(cluster_id) => {
                follow = Self::draw_cluster_details(ui, session, cluster_id);
            }
        }

        if !matches!(session.selection(), Selection::Unselected) {
            let counts = session.emphasis().class_counts();
            ui.add_space(4.0);
            ui.small(format!(
                "{} emphasized, {} faded",
                counts.selected + counts.neighbor + counts.member,
                counts.other
            ));
        }

        ui.separator();
        if let Some(id) = Self::draw_insights(ui, session) {
            follow = Some(id);
        }

        if let Some(id) = follow {
            self.focus_node(&id);
        }
    }

    fn draw_node_details(ui: &mut Ui, session: &LayoutSession, index: usize) -> Option<String> {
        let simulation = session.simulation();
        let node = &simulation.nodes()[index];
        node_summary(ui, node, session);

        ui.separator();
        ui.label(RichText::new("Connections").strong());

        let mut connections = simulation
            .link_pairs()
            .iter()
            .zip(simulation.links())
            .filter_map(|(&(source, target), link)| {
                let other = if source == index {
                    target
                } else if target == index {
                    source
                } else {
                    return None;
                };
                Some((other, link.kind))
            })
            .collect::<Vec<_>>();
        connections.sort_by(|a, b| {
            simulation.nodes()[a.0]
                .display_name
                .cmp(&simulation.nodes()[b.0].display_name)
        });

        if connections.is_empty() {
            ui.label("No connections in the current layout.");
            return None;
        }

        let mut picked = None;
        for (other, kind) in connections {
            let neighbor = &simulation.nodes()[other];
            let label = format!("{}  ({})", neighbor.display_name, kind.label());
            if ui.link(label).on_hover_text(neighbor.id.as_str()).clicked() {
                picked = Some(neighbor.id.clone());
            }
        }
        picked
    }

    fn draw_cluster_details(
        ui: &mut Ui,
        session: &LayoutSession,
        cluster_id: &str,
    ) -> Option<String> {
        let simulation = session.simulation();
        let name = simulation.clusters().name(cluster_id).unwrap_or(cluster_id);
        ui.label(RichText::new(name).strong());

        let mut members = session
            .selection_machine()
            .related()
            .iter()
            .map(|&index| &simulation.nodes()[index])
            .collect::<Vec<_>>();
        members.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        let partners = members.iter().filter(|node| node.is_partner()).count();
        ui.label(format!(
            "{} partners, {} staff",
            partners,
            members.len() - partners
        ));
        let contributions = members
            .iter()
            .map(|node| node.attributes.contribution_value)
            .sum::<f64>();
        ui.label(format!("Contributions: {}", format_amount(contributions)));

        ui.separator();
        let mut picked = None;
        for node in members.iter().take(MEMBER_ROWS) {
            if ui
                .link(format!("{}  ({})", node.display_name, node.kind.label()))
                .clicked()
            {
                picked = Some(node.id.clone());
            }
        }
        if members.len() > MEMBER_ROWS {
            ui.small(format!("{} more members", members.len() - MEMBER_ROWS));
        }
        picked
    }

    fn draw_insights(ui: &mut Ui, session: &LayoutSession) -> Option<String> {
        let insights = session.insights();
        let nodes = session.simulation().nodes();

        ui.label(RichText::new("Network insights").strong());
        ui.label(format!("Density: {:.1}%", insights.density * 100.0));

        let mut picked = None;
        ui.add_space(4.0);
        ui.label("Key connectors");
        for connector in &insights.key_connectors {
            let node = &nodes[connector.node_index];
            if ui
                .link(format!("{}  ({} links)", node.display_name, connector.degree))
                .clicked()
            {
                picked = Some(node.id.clone());
            }
        }

        ui.add_space(4.0);
        ui.label("Partnership opportunities");
        if insights.opportunities.is_empty() {
            ui.small("No complementary unlinked partners.");
        }
        for opportunity in &insights.opportunities {
            let (first, second) = (&nodes[opportunity.first], &nodes[opportunity.second]);
            let (first_role, second_role) = opportunity.roles;
            ui.label(format!(
                "{} + {}  ({} / {})",
                first.display_name,
                second.display_name,
                first_role.label(),
                second_role.label()
            ));
        }

        picked
    }
}
