use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Partner Network");
                    ui.separator();
                    ui.label(format!("source: {source}"));
                    ui.label(format!("partners: {}", self.dataset.partners.len()));
                    ui.label(format!("staff: {}", self.dataset.staff.len()));

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Rebuild layout").clicked() {
                        self.session_dirty = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(status) = self.layout_status_text() {
                            ui.label(status);
                        }
                        if let Some(report) = self.report_text() {
                            ui.label(report);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("controls_scroll")
                    .show(ui, |ui| {
                        self.draw_controls(ui);
                        ui.separator();
                        self.draw_legend(ui);
                    });
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("details_scroll")
                    .show(ui, |ui| self.draw_details(ui));
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    fn layout_status_text(&self) -> Option<String> {
        let session = self.session.as_ref()?;
        let simulation = session.simulation();
        let state = if !session.is_running() {
            "settled"
        } else if self.live_physics || session.dragging().is_some() {
            "running"
        } else {
            "paused"
        };

        let floor = simulation
            .alpha_target()
            .max(simulation.params().alpha_min);

        Some(format!(
            "nodes: {}  links: {}  |  layout {state} (alpha {:.3} -> {floor:.3})",
            simulation.nodes().len(),
            simulation.links().len(),
            simulation.alpha()
        ))
    }

    fn report_text(&self) -> Option<String> {
        let report = self.session.as_ref()?.report();
        if report.dangling_references == 0 && report.duplicate_ids == 0 {
            return None;
        }
        Some(format!(
            "dropped references: {}  duplicate ids: {}",
            report.dangling_references, report.duplicate_ids
        ))
    }
}
