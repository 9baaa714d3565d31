use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) const LABEL_COLOR: Color32 = Color32::from_rgb(222, 228, 234);

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// `color` with its alpha scaled by `opacity`.
pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity).round() as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(21, 25, 31));

    let step = (64.0 * zoom.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 60));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(position)
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    Rect::from_two_pos(start, end)
        .expand(padding)
        .intersects(rect)
}

/// Maps layout coordinates to the screen. The layout's origin is the top-left
/// of the viewport it was started with, so its center lands on the rect center
/// when there is no pan.
pub(super) fn world_to_screen(
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    world_center: Vec2,
    world: Vec2,
) -> Pos2 {
    rect.center() + pan + (world - world_center) * zoom
}

pub(super) fn screen_to_world(
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    world_center: Vec2,
    screen: Pos2,
) -> Vec2 {
    (screen - rect.center() - pan) / zoom + world_center
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn test_screen_mapping_round_trips_through_pan_and_zoom() {
        let rect = Rect::from_min_size(pos2(200.0, 40.0), vec2(800.0, 600.0));
        let center = vec2(400.0, 300.0);
        let world = vec2(130.0, 520.0);

        let screen = world_to_screen(rect, vec2(15.0, -30.0), 1.7, center, world);
        let back = screen_to_world(rect, vec2(15.0, -30.0), 1.7, center, screen);

        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn test_identity_view_offsets_by_rect_origin() {
        let rect = Rect::from_min_size(pos2(200.0, 40.0), vec2(800.0, 600.0));

        let screen = world_to_screen(rect, Vec2::ZERO, 1.0, vec2(400.0, 300.0), vec2(10.0, 20.0));

        assert_eq!(screen, pos2(210.0, 60.0));
    }

    #[test]
    fn test_opacity_scales_alpha() {
        assert_eq!(with_opacity(Color32::from_rgb(10, 20, 30), 0.5).a(), 128);
        assert_eq!(with_opacity(Color32::WHITE, 0.0).a(), 0);
        assert_eq!(with_opacity(Color32::WHITE, 3.0).a(), 255);
    }

    #[test]
    fn test_visibility_checks() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(100.0, 100.0));

        assert!(circle_visible(rect, pos2(-5.0, 50.0), 10.0));
        assert!(!circle_visible(rect, pos2(-50.0, 50.0), 10.0));
        assert!(segment_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 0.0));
        assert!(!segment_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, -10.0), 2.0));
    }
}
