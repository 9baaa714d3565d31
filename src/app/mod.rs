use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{info, warn};

use crate::error::LayoutError;
use crate::network::{BuildOptions, Dataset, PartnerRecord, Viewport, build_network, load_dataset};
use crate::session::LayoutSession;
use crate::simulation::ForceParams;

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<Dataset, String>;

pub struct NetworkApp {
    data_path: Option<PathBuf>,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

/// Record filters applied before the graph is built.
#[derive(Clone, Debug, PartialEq)]
struct Filters {
    partner_type: Option<String>,
    region: Option<String>,
    staff_ties: bool,
}

impl Filters {
    fn for_view() -> Self {
        Self {
            partner_type: None,
            region: None,
            staff_ties: BuildOptions::default().staff_ties,
        }
    }

    fn admits(&self, partner: &PartnerRecord) -> bool {
        self.partner_type
            .as_deref()
            .is_none_or(|wanted| partner.partner_type == wanted)
            && self
                .region
                .as_deref()
                .is_none_or(|wanted| partner.region == wanted)
    }
}

struct ViewModel {
    dataset: Dataset,
    partner_types: Vec<String>,
    regions: Vec<String>,
    filters: Filters,
    search: String,
    session: Option<LayoutSession>,
    layout_error: Option<LayoutError>,
    details: Option<String>,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    params: ForceParams,
    viewport: Option<Viewport>,
    session_dirty: bool,
}

impl NetworkApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: Option<PathBuf>) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_path: Option<PathBuf>) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(data_path.as_deref()).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }

    fn source_label(&self) -> String {
        self.data_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "embedded sample".to_owned())
    }
}

impl eframe::App for NetworkApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let source = self.source_label();

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(ready_or_error(result)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading partner network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the partner dataset");
                    ui.add_space(6.0);
                    ui.label(format!("source: {source}"));
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.data_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.data_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(ready_or_error(result)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            if let AppState::Ready(model) = std::mem::replace(&mut self.state, next_state) {
                model.dispose();
            }
        }
    }
}

fn ready_or_error(result: LoadResult) -> AppState {
    match result {
        Ok(dataset) => AppState::Ready(Box::new(ViewModel::new(dataset))),
        Err(error) => {
            warn!(%error, "dataset load failed");
            AppState::Error(error)
        }
    }
}

fn distinct_values<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut distinct = values
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>();
    distinct.sort();
    distinct.dedup();
    distinct
}

impl ViewModel {
    fn new(dataset: Dataset) -> Self {
        let partner_types =
            distinct_values(dataset.partners.iter().map(|partner| partner.partner_type.as_str()));
        let regions = distinct_values(dataset.partners.iter().map(|partner| partner.region.as_str()));

        Self {
            dataset,
            partner_types,
            regions,
            filters: Filters::for_view(),
            search: String::new(),
            session: None,
            layout_error: None,
            details: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            params: ForceParams::default(),
            viewport: None,
            session_dirty: true,
        }
    }

    fn set_filters(&mut self, filters: Filters) {
        if filters != self.filters {
            self.filters = filters;
            self.session_dirty = true;
        }
    }

    /// Replaces the running session with one built from the current filters.
    /// A hidden viewport leaves the session dirty so the next frame retries.
    fn rebuild_session(&mut self, viewport: Viewport) {
        if let Some(previous) = self.session.take() {
            previous.dispose();
        }
        self.details = None;

        let partners = self
            .dataset
            .partners
            .iter()
            .filter(|partner| self.filters.admits(partner))
            .cloned()
            .collect::<Vec<_>>();
        let graph = build_network(
            &partners,
            &self.dataset.staff,
            BuildOptions {
                staff_ties: self.filters.staff_ties,
            },
        );

        match LayoutSession::start(graph, viewport, self.params) {
            Ok(session) => {
                info!(
                    nodes = session.simulation().nodes().len(),
                    links = session.simulation().links().len(),
                    "layout session started"
                );
                self.session = Some(session);
                self.layout_error = None;
                self.session_dirty = false;
            }
            Err(error @ LayoutError::ViewportUnavailable { .. }) => {
                self.layout_error = Some(error);
            }
            Err(error) => {
                info!(%error, "nothing to lay out");
                self.layout_error = Some(error);
                self.session_dirty = false;
            }
        }
    }

    fn dispose(self) {
        if let Some(session) = self.session {
            session.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::load_dataset;

    fn model() -> ViewModel {
        ViewModel::new(load_dataset(None).unwrap())
    }

    #[test]
    fn test_filter_options_come_from_dataset() {
        let model = model();

        assert!(model.partner_types.contains(&"NGO".to_owned()));
        assert!(!model.regions.is_empty());
        assert!(model.regions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_rebuild_starts_session_and_waits_for_viewport() {
        let mut model = model();

        model.rebuild_session(Viewport::new(0.0, 0.0));
        assert!(model.session.is_none());
        assert!(model.session_dirty);

        model.rebuild_session(Viewport::new(900.0, 700.0));
        assert!(model.session.is_some());
        assert!(!model.session_dirty);
        assert!(model.layout_error.is_none());
    }

    #[test]
    fn test_filter_without_matches_reports_empty_graph() {
        let mut model = model();
        model.set_filters(Filters {
            partner_type: Some("No Such Type".to_owned()),
            ..model.filters.clone()
        });
        assert!(model.session_dirty);

        model.rebuild_session(Viewport::new(900.0, 700.0));

        assert!(model.session.is_none());
        assert_eq!(model.layout_error, Some(LayoutError::EmptyGraph));
        assert!(!model.session_dirty);
    }

    #[test]
    fn test_type_filter_narrows_partners() {
        let mut model = model();
        model.set_filters(Filters {
            partner_type: Some("NGO".to_owned()),
            ..model.filters.clone()
        });
        model.rebuild_session(Viewport::new(900.0, 700.0));

        let session = model.session.as_ref().unwrap();
        assert!(
            session
                .simulation()
                .nodes()
                .iter()
                .filter(|node| node.is_partner())
                .all(|node| node.attributes.partner_type == "NGO")
        );
    }
}
