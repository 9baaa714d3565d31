use eframe::egui::Vec2;

use crate::network::{Node, NodeKind};

/// Partners are drawn as squares this many radii wide.
pub const PARTNER_SIDE_SCALE: f32 = 1.8;
pub const MIN_PARTNER_RADIUS: f32 = 6.0;
pub const MAX_PARTNER_RADIUS: f32 = 22.0;
const STAFF_RADIUS: f32 = 8.0;
const STAFF_IN_DIVISION_RADIUS: f32 = 6.0;

pub fn node_radius(node: &Node) -> f32 {
    match node.kind {
        NodeKind::Staff if node.attributes.division.is_some() => STAFF_IN_DIVISION_RADIUS,
        NodeKind::Staff => STAFF_RADIUS,
        NodeKind::Partner => partner_radius(
            node.attributes.contribution_value,
            node.attributes.project_count,
        ),
    }
}

/// Grows logarithmically with contributions and with the square root of the
/// project count.
pub fn partner_radius(contribution_value: f64, project_count: usize) -> f32 {
    let contribution = contribution_value.max(0.0);
    let size = 6.0 + (contribution + 1.0).log10() * 2.5 + (project_count as f64).sqrt() * 1.2;
    (size as f32).clamp(MIN_PARTNER_RADIUS, MAX_PARTNER_RADIUS)
}

/// Distance from a node's center to the edge of its drawn shape.
pub fn half_extent(kind: NodeKind, radius: f32) -> f32 {
    match kind {
        NodeKind::Partner => radius * PARTNER_SIDE_SCALE * 0.5,
        NodeKind::Staff => radius,
    }
}

/// Whether `point` lies on the node's square (partners) or disc (staff).
pub fn shape_contains(node: &Node, radius: f32, point: Vec2) -> bool {
    let offset = point - node.position;
    match node.kind {
        NodeKind::Partner => {
            let half = half_extent(node.kind, radius);
            offset.x.abs() <= half && offset.y.abs() <= half
        }
        NodeKind::Staff => offset.length_sq() <= radius * radius,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::network::{BuildOptions, PartnerRecord, StaffRecord, build_network};

    #[test]
    fn test_partner_radius_grows_with_contribution() {
        let empty = partner_radius(0.0, 4);
        let funded = partner_radius(1_000_000.0, 4);

        assert!(funded > empty);
        assert!((empty - 8.4).abs() < 1e-4);
        assert_eq!(funded, MAX_PARTNER_RADIUS);
        assert!((partner_radius(999.0, 0) - 13.5).abs() < 1e-4);
    }

    #[test]
    fn test_empty_partner_gets_minimum() {
        assert_eq!(partner_radius(0.0, 0), MIN_PARTNER_RADIUS);
        assert_eq!(partner_radius(-50.0, 0), MIN_PARTNER_RADIUS);
    }

    #[test]
    fn test_staff_radius_depends_on_division() {
        let partners = vec![
            PartnerRecord {
                id: "p1".to_owned(),
                main_contact: Some("s1".to_owned()),
                ..PartnerRecord::default()
            },
            PartnerRecord {
                id: "p2".to_owned(),
                main_contact: Some("s2".to_owned()),
                ..PartnerRecord::default()
            },
        ];
        let staff = serde_json::from_str::<Vec<StaffRecord>>(
            r#"[
                {"id": "s1", "unit": {"directorate": "IET", "division": "IET/DAI"}},
                {"id": "s2", "unit": {"directorate": "ODG", "division": null}}
            ]"#,
        )
        .unwrap();

        let graph = build_network(&partners, &staff, BuildOptions::default());
        let s1 = graph.node("s1").unwrap();
        let s2 = graph.node("s2").unwrap();

        assert_eq!(s1.kind, NodeKind::Staff);
        assert_eq!(node_radius(s1), 6.0);
        assert_eq!(node_radius(s2), 8.0);
    }

    #[test]
    fn test_hit_shape_follows_drawn_shape() {
        let partners = vec![PartnerRecord {
            id: "p1".to_owned(),
            main_contact: Some("s1".to_owned()),
            ..PartnerRecord::default()
        }];
        let staff = serde_json::from_str::<Vec<StaffRecord>>(r#"[{"id": "s1"}]"#).unwrap();
        let graph = build_network(&partners, &staff, BuildOptions::default());
        let partner = graph.node("p1").unwrap();
        let member = graph.node("s1").unwrap();

        // Square of side 18 around the origin.
        assert!(shape_contains(partner, 10.0, Vec2::new(8.5, 8.5)));
        assert!(!shape_contains(partner, 10.0, Vec2::new(9.5, 0.0)));

        assert!(shape_contains(member, 10.0, Vec2::new(9.5, 0.0)));
        assert!(!shape_contains(member, 10.0, Vec2::new(8.5, 8.5)));
        assert_eq!(half_extent(NodeKind::Partner, 10.0), 9.0);
    }

    proptest! {
        #[test]
        fn prop_partner_radius_is_clamped_and_monotonic(
            contribution in 0.0_f64..1e9,
            extra in 0.0_f64..1e9,
            projects in 0_usize..200,
            more_projects in 0_usize..50,
        ) {
            let base = partner_radius(contribution, projects);
            prop_assert!((MIN_PARTNER_RADIUS..=MAX_PARTNER_RADIUS).contains(&base));
            prop_assert!(partner_radius(contribution + extra, projects) >= base);
            prop_assert!(partner_radius(contribution, projects + more_projects) >= base);
        }
    }
}
