use eframe::egui::{self, Color32, FontId, Painter, Rect, Sense, Ui, vec2};
use tracing::trace;

use crate::util::format_count;

use super::ViewModel;

const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);

fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, BACKGROUND);
}

impl ViewModel {
    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        if self.scene.viewport() != rect.size() {
            trace!(width = rect.width(), height = rect.height(), "canvas resized");
            self.zoom
                .on_resize(&mut self.scene, rect.width(), rect.height());
        }

        let now = ui.input(|input| input.time);
        let slow = ui.input(|input| input.modifiers.alt);

        let hovered = response
            .hover_pos()
            .and_then(|pointer| self.scene.hit_test(pointer - rect.center()));
        self.scene.set_hovered(hovered);

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let outcome = match self.scene.hit_test(pointer - rect.center()) {
                Some(node) => self
                    .zoom
                    .on_node_clicked(&self.hierarchy, &mut self.scene, node, slow, now),
                None => self
                    .zoom
                    .on_background_clicked(&self.hierarchy, &mut self.scene, slow, now),
            };
            trace!(focus = ?self.zoom.state().focus, ?outcome, slow, "canvas click");
        }

        if self.zoom.advance(&mut self.scene, now) {
            ui.ctx().request_repaint();
        }

        self.scene.paint(&painter, rect);

        if response.hovered() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if let Some(node) = self.scene.hovered() {
            let node = self.hierarchy.node(node);
            let text = format!("{}\n{}", node.name, format_count(node.value));
            let galley_pos = rect.left_top() + vec2(12.0, 12.0);
            let font = FontId::proportional(13.0);
            let galley = painter.layout_no_wrap(text, font, Color32::WHITE);
            let frame = Rect::from_min_size(galley_pos, galley.size()).expand(5.0);
            painter.rect_filled(frame, 4.0, Color32::from_black_alpha(200));
            painter.galley(galley_pos, galley, Color32::WHITE);
        }
    }
}
