use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::selection::{Selection, SelectionInput};

use super::super::graph::fuzzy_match_score;
use super::super::{Filters, ViewModel};

const REHEAT_ALPHA: f32 = 0.3;
const SEARCH_RESULT_ROWS: usize = 8;

fn filter_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    options: &[String],
    value: &mut Option<String>,
) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.as_deref().unwrap_or("All"))
        .width(180.0)
        .show_ui(ui, |ui| {
            ui.selectable_value(value, None, "All");
            for option in options {
                ui.selectable_value(value, Some(option.clone()), option.as_str());
            }
        });
    ui.label(label);
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Network Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search by name")
            .on_hover_text("Fuzzy-highlight matching nodes in the layout.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Click a result below to select that node.");
        self.draw_search_results(ui);

        ui.separator();
        ui.label(RichText::new("Filters").strong());

        let mut filters = self.filters.clone();
        ui.horizontal(|ui| {
            filter_combo(
                ui,
                "partner_type_filter",
                "Partner type",
                &self.partner_types,
                &mut filters.partner_type,
            );
        });
        ui.horizontal(|ui| {
            filter_combo(ui, "region_filter", "Region", &self.regions, &mut filters.region);
        });
        ui.checkbox(&mut filters.staff_ties, "Link staff by directorate and division")
            .on_hover_text("Adds same-division and same-directorate links between staff.");
        let defaults = Filters::for_view();
        if ui
            .add_enabled(filters != defaults, egui::Button::new("Reset filters"))
            .clicked()
        {
            filters = defaults;
        }
        self.set_filters(filters);

        ui.separator();
        ui.label(RichText::new("Layout").strong());

        ui.checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Advance the force layout every frame until it settles.");

        ui.horizontal(|ui| {
            let has_session = self.session.is_some();
            if ui
                .add_enabled(has_session, egui::Button::new("Reheat"))
                .on_hover_text("Shake the layout loose and let it settle again.")
                .clicked()
                && let Some(session) = self.session.as_mut()
            {
                session.reheat(REHEAT_ALPHA);
            }

            let has_selection = self
                .session
                .as_ref()
                .is_some_and(|session| *session.selection() != Selection::Unselected);
            if ui
                .add_enabled(has_selection, egui::Button::new("Clear selection"))
                .clicked()
                && let Some(session) = self.session.as_mut()
                && let Some(event) = session.select(SelectionInput::Background)
            {
                self.details = event.node_id;
            }

            if ui.button("Reset view").clicked() {
                self.pan = egui::Vec2::ZERO;
                self.zoom = 1.0;
            }
        });

        ui.add_space(4.0);
        ui.small(
            "Drag a node to pin it while held. Drag the background to pan and scroll to zoom. \
             Click a cluster area to focus it.",
        );
    }

    fn draw_search_results(&mut self, ui: &mut Ui) {
        let query = self.search.trim().to_owned();
        if query.is_empty() {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };

        let matcher = SkimMatcherV2::default();
        let mut results = session
            .simulation()
            .nodes()
            .iter()
            .filter_map(|node| {
                fuzzy_match_score(&matcher, &node.display_name, &query)
                    .map(|score| (score, node.id.clone(), node.display_name.clone()))
            })
            .collect::<Vec<_>>();
        results.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.2.cmp(&b.2)));

        if results.is_empty() {
            ui.small("No matching nodes.");
            return;
        }

        let mut picked = None;
        for (_, id, name) in results.iter().take(SEARCH_RESULT_ROWS) {
            if ui.link(name.as_str()).clicked() {
                picked = Some(id.clone());
            }
        }
        if results.len() > SEARCH_RESULT_ROWS {
            ui.small(format!("{} more matches", results.len() - SEARCH_RESULT_ROWS));
        }

        if let Some(id) = picked {
            self.focus_node(&id);
        }
    }
}
