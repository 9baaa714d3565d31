use std::collections::HashSet;

use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Shape, Stroke, StrokeKind, Ui,
    Vec2, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::error::LayoutError;
use crate::legend::{NodeShape, link_style, node_colors, node_shape};
use crate::network::{CLUSTER_AREA_RADIUS, ClusterRegistry, NodeKind};
use crate::selection::Emphasis;
use crate::session::LayoutSession;
use crate::simulation::{LayoutSnapshot, PARTNER_SIDE_SCALE, half_extent};
use crate::util::short_label;

use super::super::ViewModel;
use super::super::render_utils::{
    LABEL_COLOR, blend_color, circle_visible, draw_background, segment_visible, with_opacity,
    world_to_screen,
};

const SEARCH_HALO: Color32 = Color32::from_rgb(103, 196, 255);

pub(in crate::app) fn fuzzy_match_score(
    matcher: &SkimMatcherV2,
    text: &str,
    query: &str,
) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Screen transform for one frame.
#[derive(Clone, Copy)]
struct View {
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    world_center: Vec2,
}

impl View {
    fn to_screen(self, world: Vec2) -> Pos2 {
        world_to_screen(self.rect, self.pan, self.zoom, self.world_center, world)
    }

    fn scale(self, length: f32) -> f32 {
        length * self.zoom
    }

    /// Strokes thin out when zoomed out but never vanish.
    fn stroke_width(self, width: f32) -> f32 {
        (width * self.zoom.sqrt()).max(0.4)
    }
}

impl ViewModel {
    /// Indices of laid-out nodes whose name matches the search box.
    pub(in crate::app) fn search_matches(&self, session: &LayoutSession) -> HashSet<usize> {
        let query = self.search.trim();
        if query.is_empty() {
            return HashSet::new();
        }

        let matcher = SkimMatcherV2::default();
        session
            .simulation()
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| fuzzy_match_score(&matcher, &node.display_name, query).is_some())
            .map(|(index, _)| index)
            .collect()
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.sync_viewport(rect);

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_node_drag(ui, rect, &response);
        self.handle_graph_pan(&response);
        self.handle_graph_click(rect, &response);

        let live_physics = self.live_physics;
        if let Some(session) = self.session.as_mut()
            && (live_physics || session.dragging().is_some())
            && session.tick()
        {
            ui.ctx().request_repaint();
        }

        let Some(session) = self.session.as_ref() else {
            let message = match &self.layout_error {
                Some(LayoutError::EmptyGraph) => {
                    "No partners match the current filters.".to_owned()
                }
                Some(error) => format!("Waiting for the graph area: {error}"),
                None => "Preparing layout...".to_owned(),
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(15.0),
                LABEL_COLOR,
            );
            return;
        };

        let view = View {
            rect,
            pan: self.pan,
            zoom: self.zoom,
            world_center: self.world_center(),
        };
        let hovered = self.hovered_index(ui, rect);
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let emphasis = session.emphasis();
        let snapshot = session.snapshot();
        let clusters = session.simulation().clusters();
        let matches = self.search_matches(session);

        draw_clusters(&painter, view, clusters, &emphasis);
        draw_links(&painter, view, &snapshot, &emphasis);
        draw_nodes(&painter, view, &snapshot, clusters, &emphasis, hovered, &matches);
        draw_focus_caption(&painter, view, session);

        if let Some(index) = hovered {
            let node = &snapshot.nodes[index];
            let unit = clusters.name(&node.cluster_id).unwrap_or("Unknown");
            let caption = match node.kind {
                NodeKind::Partner => format!(
                    "{}  |  {}  |  {}  |  projects {}  |  {}",
                    node.display_name,
                    node.attributes.partner_type,
                    unit,
                    node.attributes.project_count,
                    node.attributes.region
                ),
                NodeKind::Staff => format!(
                    "{}  |  staff  |  {}  |  {}",
                    node.display_name,
                    unit,
                    node.attributes.division.as_deref().unwrap_or("no division")
                ),
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                caption,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}

fn draw_clusters(
    painter: &egui::Painter,
    view: View,
    clusters: &ClusterRegistry,
    emphasis: &Emphasis,
) {
    for (cluster, style) in clusters.iter().zip(&emphasis.clusters) {
        let center = view.to_screen(cluster.anchor);
        let radius = view.scale(CLUSTER_AREA_RADIUS);
        if !circle_visible(view.rect, center, radius + view.scale(100.0)) {
            continue;
        }

        painter.circle(
            center,
            radius,
            with_opacity(cluster.color, style.background_opacity),
            Stroke::new(
                if style.highlighted { 2.0 } else { 1.0 },
                with_opacity(cluster.color, 0.3),
            ),
        );
        painter.text(
            view.to_screen(cluster.label_position()),
            Align2::CENTER_CENTER,
            cluster.name,
            FontId::proportional((12.0 * view.zoom.sqrt()).clamp(9.0, 18.0)),
            with_opacity(blend_color(cluster.color, Color32::WHITE, 0.35), style.label_opacity),
        );
    }
}

fn draw_links(
    painter: &egui::Painter,
    view: View,
    snapshot: &LayoutSnapshot<'_>,
    emphasis: &Emphasis,
) {
    for (frame, style) in snapshot.links.iter().zip(&emphasis.links) {
        let start = view.to_screen(frame.from);
        let end = view.to_screen(frame.to);
        if !segment_visible(view.rect, start, end, 2.0) {
            continue;
        }

        let line = link_style(frame.kind);
        let stroke = Stroke::new(
            view.stroke_width(style.width),
            with_opacity(line.color, style.opacity),
        );

        if line.dashed {
            let dash = view.scale(3.0).max(1.5);
            painter.extend(Shape::dashed_line(&[start, end], stroke, dash, dash));
        } else {
            painter.line_segment([start, end], stroke);
        }
    }
}

fn draw_nodes(
    painter: &egui::Painter,
    view: View,
    snapshot: &LayoutSnapshot<'_>,
    clusters: &ClusterRegistry,
    emphasis: &Emphasis,
    hovered: Option<usize>,
    matches: &HashSet<usize>,
) {
    for (index, node) in snapshot.nodes.iter().enumerate() {
        let position = view.to_screen(node.position);
        let radius = view.scale(snapshot.radii[index]);
        if !circle_visible(view.rect, position, radius + 60.0) {
            continue;
        }

        let style = emphasis.nodes[index];
        let (fill, border) = node_colors(node, clusters);
        let mut fill = with_opacity(fill, style.opacity);
        if hovered == Some(index) {
            fill = blend_color(fill, Color32::WHITE, 0.25);
        }
        let stroke = Stroke::new(
            view.stroke_width(style.border_width),
            with_opacity(border, style.border_opacity),
        );

        match node_shape(node.kind) {
            NodeShape::Rectangle => {
                let side = radius * PARTNER_SIDE_SCALE;
                painter.rect(
                    Rect::from_center_size(position, vec2(side, side)),
                    CornerRadius::same(view.scale(3.0).round().clamp(0.0, 255.0) as u8),
                    fill,
                    stroke,
                    StrokeKind::Middle,
                );
            }
            NodeShape::Circle => {
                painter.circle(position, radius, fill, stroke);
            }
        }

        if matches.contains(&index) {
            painter.circle_stroke(position, radius * 1.3 + 4.0, Stroke::new(1.5, SEARCH_HALO));
        }

        if view.zoom < 0.45 && hovered != Some(index) {
            continue;
        }
        let (offset, font_size): (f32, f32) = match node.kind {
            NodeKind::Staff => (10.0, 9.0),
            NodeKind::Partner => (12.0, 10.0),
        };
        let label_dx = offset.max(half_extent(node.kind, snapshot.radii[index]) + 3.0);
        painter.text(
            position + vec2(view.scale(label_dx), 0.0),
            Align2::LEFT_CENTER,
            short_label(&node.display_name),
            FontId::proportional((font_size * view.zoom.sqrt()).clamp(8.0, 16.0)),
            with_opacity(LABEL_COLOR, style.opacity),
        );
    }
}


/// Names the home cluster just above the selected node.
fn draw_focus_caption(painter: &egui::Painter, view: View, session: &LayoutSession) {
    let simulation = session.simulation();
    let Some(index) = session.selection_machine().focus() else {
        return;
    };

    let node = &simulation.nodes()[index];
    let Some(cluster) = simulation.clusters().get(&node.cluster_id) else {
        return;
    };
    let extent = half_extent(node.kind, simulation.radii()[index]);

    painter.text(
        view.to_screen(node.position - vec2(0.0, extent + 10.0)),
        Align2::CENTER_BOTTOM,
        cluster.name,
        FontId::proportional(11.0),
        blend_color(cluster.color, Color32::WHITE, 0.35),
    );
}
