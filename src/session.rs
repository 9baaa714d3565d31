use eframe::egui::Vec2;
use tracing::{debug, info};

use crate::error::LayoutError;
use crate::network::{BuildReport, Cluster, NetworkGraph, NetworkInsights, Viewport};
use crate::selection::{Emphasis, Selection, SelectionEvent, SelectionInput, SelectionMachine};
use crate::simulation::{ForceParams, ForceSimulation, LayoutSnapshot};

/// Alpha used to settle the layout again after the viewport changes.
const RESIZE_ALPHA: f32 = 0.3;

/// One visualization run: the simulation, the selection state and the
/// derived insights for a single built graph.
pub struct LayoutSession {
    simulation: ForceSimulation,
    selection: SelectionMachine,
    report: BuildReport,
    insights: NetworkInsights,
    dragging: Option<usize>,
    grab_offset: Vec2,
}

impl LayoutSession {
    pub fn start(
        graph: NetworkGraph,
        viewport: Viewport,
        params: ForceParams,
    ) -> Result<Self, LayoutError> {
        let report = graph.report();
        let insights = NetworkInsights::compute(&graph);
        let simulation = ForceSimulation::new(graph, viewport, params)?;
        let selection = SelectionMachine::new(&simulation);

        Ok(Self {
            simulation,
            selection,
            report,
            insights,
            dragging: None,
            grab_offset: Vec2::ZERO,
        })
    }

    pub fn tick(&mut self) -> bool {
        self.simulation.tick()
    }

    pub fn is_running(&self) -> bool {
        self.simulation.is_running()
    }

    pub fn stop(&mut self) {
        self.simulation.stop();
    }

    /// Reheats a settled layout without changing the selection.
    pub fn reheat(&mut self, alpha: f32) {
        self.simulation.reheat(alpha);
    }

    pub fn dispose(mut self) {
        self.simulation.stop();
        info!(ticks = self.simulation.ticks(), "layout session disposed");
    }

    pub fn resize(&mut self, viewport: Viewport) -> Result<(), LayoutError> {
        if self.simulation.resize(viewport)? {
            self.selection.apply_forces(&mut self.simulation);
            self.simulation.reheat(RESIZE_ALPHA);
        }
        Ok(())
    }

    pub fn select(&mut self, input: SelectionInput<'_>) -> Option<SelectionEvent> {
        self.selection.select(input, &mut self.simulation)
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    pub fn selection_machine(&self) -> &SelectionMachine {
        &self.selection
    }

    /// Grabs a node at `point`; later moves keep the grab offset so the node
    /// does not jump under the pointer.
    pub fn begin_drag(&mut self, index: usize, point: Vec2) {
        let Some(node) = self.simulation.nodes().get(index) else {
            return;
        };
        debug!(node = %node.id, "drag started");
        self.grab_offset = node.position - point;
        self.dragging = Some(index);
        self.simulation.begin_drag(index);
    }

    pub fn drag_to(&mut self, point: Vec2) {
        if let Some(index) = self.dragging {
            self.simulation.drag_to(index, point + self.grab_offset);
        }
    }

    pub fn end_drag(&mut self) {
        if let Some(index) = self.dragging.take() {
            self.simulation.end_drag(index);
        }
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn snapshot(&self) -> LayoutSnapshot<'_> {
        self.simulation.snapshot()
    }

    pub fn emphasis(&self) -> Emphasis {
        self.selection.emphasis(&self.simulation)
    }

    pub fn node_at(&self, point: Vec2) -> Option<usize> {
        self.simulation.node_at(point)
    }

    pub fn cluster_at(&self, point: Vec2) -> Option<&Cluster> {
        self.simulation.clusters().cluster_at(point)
    }

    pub fn simulation(&self) -> &ForceSimulation {
        &self.simulation
    }

    pub fn report(&self) -> BuildReport {
        self.report
    }

    pub fn insights(&self) -> &NetworkInsights {
        &self.insights
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::network::{BuildOptions, build_network, load_dataset};

    fn session() -> LayoutSession {
        let dataset = load_dataset(None).unwrap();
        let graph = build_network(&dataset.partners, &dataset.staff, BuildOptions::default());
        LayoutSession::start(graph, Viewport::new(1024.0, 768.0), ForceParams::default()).unwrap()
    }

    #[test]
    fn test_start_validates_inputs() {
        let empty = LayoutSession::start(
            NetworkGraph::default(),
            Viewport::new(100.0, 100.0),
            ForceParams::default(),
        );
        assert!(matches!(empty, Err(LayoutError::EmptyGraph)));

        let dataset = load_dataset(None).unwrap();
        let graph = build_network(&dataset.partners, &dataset.staff, BuildOptions::default());
        let hidden = LayoutSession::start(graph, Viewport::new(0.0, 0.0), ForceParams::default());
        assert!(matches!(hidden, Err(LayoutError::ViewportUnavailable { .. })));
    }

    #[test]
    fn test_sample_report_counts_dangling_references() {
        let session = session();

        assert_eq!(session.report().dangling_references, 2);
        assert_eq!(session.report().duplicate_ids, 0);
        assert!(session.insights().density > 0.0);
        assert!(!session.insights().key_connectors.is_empty());
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut session = session();
        let start = session.snapshot().nodes[0].position;
        let grab = start + vec2(3.0, -2.0);

        session.begin_drag(0, grab);
        session.tick();
        assert_eq!(session.snapshot().nodes[0].position, start);

        session.drag_to(grab + vec2(10.0, -10.0));
        session.tick();
        assert_eq!(session.snapshot().nodes[0].position, start + vec2(10.0, -10.0));
        assert_eq!(session.dragging(), Some(0));

        session.end_drag();
        assert_eq!(session.dragging(), None);
        assert_eq!(session.snapshot().nodes[0].pinned, None);
        assert_eq!(session.simulation().alpha_target(), 0.0);
    }

    #[test]
    fn test_resize_keeps_selection_overrides() {
        let mut session = session();
        let selected = session.snapshot().nodes[0].id.clone();
        session.select(SelectionInput::Node(&selected));

        session.resize(Viewport::new(2048.0, 1536.0)).unwrap();

        let index = session.simulation().index_of(&selected).unwrap();
        let forces = session.simulation().node_forces()[index];
        assert_eq!(forces.target, vec2(1024.0, 768.0));
        assert_eq!(forces.charge, -200.0);
        assert_eq!(session.simulation().alpha(), RESIZE_ALPHA);
    }

    #[test]
    fn test_focus_tracks_selected_node() {
        let mut session = session();
        let selected = session.snapshot().nodes[0].id.clone();

        session.select(SelectionInput::Node(&selected));

        assert_eq!(session.selection_machine().focus(), Some(0));
        let counts = session.emphasis().class_counts();
        assert_eq!(counts.selected, 1);
        assert_eq!(counts.neighbor, session.selection_machine().related().len());
    }

    #[test]
    fn test_hit_testing_and_stop() {
        let mut session = session();
        let anchor = session.simulation().clusters().anchor("tcs").unwrap();

        assert_eq!(session.cluster_at(anchor).map(|cluster| cluster.id), Some("tcs"));

        session.stop();
        assert!(!session.is_running());
        assert!(!session.tick());
        session.dispose();
    }
}
