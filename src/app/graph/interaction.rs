use eframe::egui::{self, PointerButton, Rect, Ui, Vec2};
use tracing::{debug, warn};

use crate::network::Viewport;
use crate::selection::SelectionInput;

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

impl ViewModel {
    /// Layout coordinate shown at the rect center when there is no pan.
    pub(in crate::app) fn world_center(&self) -> Vec2 {
        self.session
            .as_ref()
            .map(|session| session.simulation().viewport().center())
            .or_else(|| self.viewport.map(Viewport::center))
            .unwrap_or(Vec2::ZERO)
    }

    /// Starts, rebuilds or resizes the session to follow the graph area.
    pub(in crate::app) fn sync_viewport(&mut self, rect: Rect) {
        let viewport = Viewport::new(rect.width(), rect.height());
        let changed = self.viewport.is_none_or(|previous| {
            (previous.width - viewport.width).abs() > 0.5
                || (previous.height - viewport.height).abs() > 0.5
        });

        if self.session_dirty {
            self.viewport = Some(viewport);
            self.rebuild_session(viewport);
            return;
        }

        if !changed {
            return;
        }
        self.viewport = Some(viewport);

        if let Some(session) = self.session.as_mut()
            && let Err(error) = session.resize(viewport)
        {
            debug!(%error, "keeping previous layout viewport");
        }
    }

    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let world_center = self.world_center();
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, world_center, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 4.0);
        self.pan = pointer - rect.center() - (world_before - world_center) * self.zoom;
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let dragging_node = self
            .session
            .as_ref()
            .is_some_and(|session| session.dragging().is_some());

        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
            || (response.dragged_by(PointerButton::Primary) && !dragging_node)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Pins the node under a primary drag to the pointer until release.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let world_center = self.world_center();
        let (pan, zoom) = (self.pan, self.zoom);
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if response.drag_started_by(PointerButton::Primary) {
            let origin = ui
                .input(|input| input.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(origin) = origin {
                let point = screen_to_world(rect, pan, zoom, world_center, origin);
                if let Some(index) = session.node_at(point) {
                    session.begin_drag(index, point);
                }
            }
        }

        if session.dragging().is_some()
            && response.dragged_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            session.drag_to(screen_to_world(rect, pan, zoom, world_center, pointer));
        }

        if response.drag_stopped() && session.dragging().is_some() {
            session.end_drag();
        }
    }

    /// Node under the pointer, used for the hover cursor and caption.
    pub(in crate::app) fn hovered_index(&self, ui: &Ui, rect: Rect) -> Option<usize> {
        let session = self.session.as_ref()?;
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }
        session.node_at(screen_to_world(
            rect,
            self.pan,
            self.zoom,
            self.world_center(),
            pointer,
        ))
    }

    /// Routes a primary click to the selection machine: nodes first, then
    /// cluster areas and labels, otherwise the background.
    pub(in crate::app) fn handle_graph_click(&mut self, rect: Rect, response: &egui::Response) {
        if !response.clicked_by(PointerButton::Primary) {
            return;
        }
        let Some(pointer) = response.interact_pointer_pos() else {
            return;
        };

        let point = screen_to_world(rect, self.pan, self.zoom, self.world_center(), pointer);
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let node_id = session
            .node_at(point)
            .map(|index| session.simulation().nodes()[index].id.clone());
        let cluster_id = session.cluster_at(point).map(|cluster| cluster.id);

        let input = match (&node_id, cluster_id) {
            (Some(id), _) => SelectionInput::Node(id),
            (None, Some(cluster)) => SelectionInput::Cluster(cluster),
            (None, None) => SelectionInput::Background,
        };

        if let Some(event) = session.select(input) {
            self.details = event.node_id;
        }
    }

    /// Selects the node named by the search box, as if it had been clicked.
    pub(in crate::app) fn focus_node(&mut self, node_id: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.selection().node_id() == Some(node_id) {
            return;
        }
        match session.select(SelectionInput::Node(node_id)) {
            Some(event) => self.details = event.node_id,
            None => warn!(node_id, "search match is not part of the layout"),
        }
    }
}
