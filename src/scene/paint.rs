use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, vec2};

use super::{LabelElement, Scene};

const SHADOW_OFFSET: [f32; 2] = [-1.0, 1.0];
const BOLD_OFFSET: f32 = 0.6;

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

impl Scene {
    /// Circles first, then every displayed label on top.
    pub fn paint(&self, painter: &Painter, rect: Rect) {
        let origin = rect.center();

        for circle in &self.circles {
            let position = origin + circle.center;
            if circle.radius <= 0.0 || !circle_visible(rect, position, circle.radius) {
                continue;
            }
            painter.circle(
                position,
                circle.radius,
                circle.fill,
                Stroke::new(circle.stroke_width, circle.current_stroke()),
            );
        }

        for label in &self.labels {
            if !label.is_displayed() || label.opacity <= 0.0 {
                continue;
            }
            self.paint_label(painter, origin + label.position, label);
        }
    }

    fn paint_label(&self, painter: &Painter, anchor: Pos2, label: &LabelElement) {
        let style = self.label_style;
        let font = FontId::proportional(label.font_size);

        if let Some(shadow) = style.shadow {
            painter.text(
                anchor + vec2(SHADOW_OFFSET[0], SHADOW_OFFSET[1]),
                Align2::CENTER_BOTTOM,
                &label.text,
                font.clone(),
                with_opacity(shadow, label.opacity * 0.6),
            );
        }

        let color = with_opacity(style.color, label.opacity);
        painter.text(anchor, Align2::CENTER_BOTTOM, &label.text, font.clone(), color);
        if style.bold {
            painter.text(
                anchor + vec2(BOLD_OFFSET, 0.0),
                Align2::CENTER_BOTTOM,
                &label.text,
                font,
                color,
            );
        }
    }
}
