use eframe::egui::{self, CornerRadius, RichText, Sense, Shape, Stroke, StrokeKind, Ui, vec2};

use crate::legend::{Legend, LegendEntry, NodeShape, Swatch};

use super::super::ViewModel;

const SWATCH_SIZE: f32 = 14.0;

fn draw_entry(ui: &mut Ui, entry: &LegendEntry) {
    ui.horizontal(|ui| {
        let (rect, _) =
            ui.allocate_exact_size(vec2(SWATCH_SIZE * 1.6, SWATCH_SIZE), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();

        match &entry.swatch {
            Swatch::Shape {
                shape: NodeShape::Rectangle,
                fill,
            } => {
                painter.rect(
                    egui::Rect::from_center_size(center, vec2(SWATCH_SIZE, SWATCH_SIZE) * 0.8),
                    CornerRadius::same(2),
                    *fill,
                    Stroke::new(1.0, egui::Color32::from_gray(200)),
                    StrokeKind::Inside,
                );
            }
            Swatch::Shape {
                shape: NodeShape::Circle,
                fill,
            } => {
                painter.circle(
                    center,
                    SWATCH_SIZE * 0.4,
                    *fill,
                    Stroke::new(1.0, egui::Color32::WHITE),
                );
            }
            Swatch::Line(style) => {
                let points = [rect.left_center(), rect.right_center()];
                let stroke = Stroke::new(2.0, style.color);
                if style.dashed {
                    painter.extend(Shape::dashed_line(&points, stroke, 3.0, 3.0));
                } else {
                    painter.line_segment(points, stroke);
                }
            }
        }

        ui.label(entry.label.as_str());
    });
}

impl ViewModel {
    pub(in crate::app) fn draw_legend(&self, ui: &mut Ui) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let legend = Legend::new(session.simulation().clusters());

        ui.collapsing(RichText::new("Legend").strong(), |ui| {
            for (title, entries) in [
                ("Node types", &legend.shapes),
                ("Partner types", &legend.partner_types),
                ("Organizational units", &legend.clusters),
                ("Connections", &legend.links),
            ] {
                ui.label(RichText::new(title).small().strong());
                for entry in entries {
                    draw_entry(ui, entry);
                }
                ui.add_space(4.0);
            }
        });
    }
}
