use super::model::{NetworkGraph, PartnerRole, adjacency};

const KEY_CONNECTOR_LIMIT: usize = 5;
const OPPORTUNITY_LIMIT: usize = 10;

/// Role pairs where one partner covers what the other lacks.
const COMPLEMENTARY_ROLES: [(PartnerRole, PartnerRole); 4] = [
    (PartnerRole::Implementation, PartnerRole::Financing),
    (PartnerRole::Knowledge, PartnerRole::Implementation),
    (PartnerRole::Innovation, PartnerRole::Financing),
    (PartnerRole::Policy, PartnerRole::Implementation),
];

#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    pub node_index: usize,
    pub degree: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Opportunity {
    pub first: usize,
    pub second: usize,
    pub roles: (PartnerRole, PartnerRole),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkInsights {
    pub density: f64,
    pub key_connectors: Vec<Connector>,
    pub opportunities: Vec<Opportunity>,
}

impl NetworkInsights {
    pub fn compute(graph: &NetworkGraph) -> Self {
        let node_count = graph.nodes().len();
        let neighbors = adjacency(node_count, &graph.link_indices());

        Self {
            density: density(node_count, graph.links().len()),
            key_connectors: key_connectors(&neighbors),
            opportunities: opportunities(graph, &neighbors),
        }
    }
}

pub fn density(node_count: usize, link_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    let possible = node_count as f64 * (node_count as f64 - 1.0) / 2.0;
    link_count as f64 / possible
}

fn key_connectors(neighbors: &[Vec<usize>]) -> Vec<Connector> {
    let mut connectors = neighbors
        .iter()
        .enumerate()
        .filter(|(_, adjacent)| !adjacent.is_empty())
        .map(|(node_index, adjacent)| Connector {
            node_index,
            degree: adjacent.len(),
        })
        .collect::<Vec<_>>();

    // Stable sort keeps arena order among equal degrees.
    connectors.sort_by(|a, b| b.degree.cmp(&a.degree));
    connectors.truncate(KEY_CONNECTOR_LIMIT);
    connectors
}

fn opportunities(graph: &NetworkGraph, neighbors: &[Vec<usize>]) -> Vec<Opportunity> {
    let partners = graph
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_partner() && !node.attributes.roles.is_empty())
        .map(|(index, _)| index)
        .collect::<Vec<_>>();

    let mut found = Vec::new();
    for (offset, &first) in partners.iter().enumerate() {
        for &second in &partners[offset + 1..] {
            if neighbors[first].contains(&second) {
                continue;
            }
            let first_roles = &graph.nodes()[first].attributes.roles;
            let second_roles = &graph.nodes()[second].attributes.roles;

            let matched = COMPLEMENTARY_ROLES.iter().find_map(|&(give, take)| {
                if first_roles.contains(&give) && second_roles.contains(&take) {
                    Some((give, take))
                } else if second_roles.contains(&give) && first_roles.contains(&take) {
                    Some((take, give))
                } else {
                    None
                }
            });

            if let Some(roles) = matched {
                found.push(Opportunity {
                    first,
                    second,
                    roles,
                });
                if found.len() == OPPORTUNITY_LIMIT {
                    return found;
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::build::{BuildOptions, build_network};
    use crate::network::records::PartnerRecord;

    fn partner(id: &str, partner_type: &str, connections: &[&str]) -> PartnerRecord {
        PartnerRecord {
            id: id.to_owned(),
            partner_type: partner_type.to_owned(),
            connections: connections.iter().map(|c| (*c).to_owned()).collect(),
            ..PartnerRecord::default()
        }
    }

    #[test]
    fn test_density() {
        assert_eq!(density(0, 0), 0.0);
        assert_eq!(density(1, 0), 0.0);
        assert_eq!(density(4, 3), 0.5);
    }

    #[test]
    fn test_key_connectors_rank_by_degree() {
        let partners = vec![
            partner("hub", "NGO", &["a", "b", "c"]),
            partner("a", "NGO", &["b"]),
            partner("b", "NGO", &[]),
            partner("c", "NGO", &[]),
            partner("lonely", "NGO", &[]),
        ];
        let graph = build_network(&partners, &[], BuildOptions::default());

        let insights = NetworkInsights::compute(&graph);
        let ids = insights
            .key_connectors
            .iter()
            .map(|connector| graph.nodes()[connector.node_index].id.as_str())
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["hub", "a", "b", "c"]);
        assert_eq!(insights.key_connectors[0].degree, 3);
    }

    #[test]
    fn test_opportunities_skip_linked_pairs() {
        let partners = vec![
            partner("ngo", "NGO", &["gov"]),
            partner("gov", "Government", &[]),
            partner("uni", "Academic", &[]),
            partner("misc", "Other", &[]),
        ];
        let graph = build_network(&partners, &[], BuildOptions::default());

        let insights = NetworkInsights::compute(&graph);
        let pairs = insights
            .opportunities
            .iter()
            .map(|opportunity| {
                (
                    graph.nodes()[opportunity.first].id.as_str(),
                    graph.nodes()[opportunity.second].id.as_str(),
                )
            })
            .collect::<Vec<_>>();

        assert!(!pairs.contains(&("ngo", "gov")));
        assert!(pairs.contains(&("ngo", "uni")));
        assert!(pairs.contains(&("gov", "uni")));
        assert!(pairs.iter().all(|(a, b)| *a != "misc" && *b != "misc"));
    }

    #[test]
    fn test_opportunities_are_capped() {
        let partners = (0..12)
            .map(|index| {
                let kind = if index % 2 == 0 { "NGO" } else { "Government" };
                partner(&format!("p{index}"), kind, &[])
            })
            .collect::<Vec<_>>();
        let graph = build_network(&partners, &[], BuildOptions::default());

        assert_eq!(NetworkInsights::compute(&graph).opportunities.len(), 10);
    }
}
