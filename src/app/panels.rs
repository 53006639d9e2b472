use std::path::Path;

use eframe::egui::{self, Align, Context, Key, Layout, vec2};
use tracing::debug;

use crate::config::VisualConfig;
use crate::hierarchy::Hierarchy;
use crate::scene::Scene;
use crate::style::NodeStyler;
use crate::zoom::{FOCUS_MARGIN, TransitionTiming, ZoomController};

use super::ViewModel;
use super::search::jump_target;

impl ViewModel {
    pub(in crate::app) fn new(hierarchy: Hierarchy, config: &VisualConfig) -> Self {
        let styler = NodeStyler::new(&hierarchy, config);
        let viewport = vec2(config.layout_width as f32, config.layout_height as f32);
        let mut scene = Scene::draw_initial(&hierarchy, &styler, viewport);
        let timing = TransitionTiming {
            normal: config.transition_duration(false),
            slow: config.transition_duration(true),
        };
        let zoom = ZoomController::new(&hierarchy, &mut scene, timing);

        Self {
            hierarchy,
            scene,
            zoom,
            search: String::new(),
            search_miss: false,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        data_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("circle-zoom");
                    ui.separator();
                    ui.label(format!("data: {}", data_path.display()));
                    ui.label(format!("nodes: {}", self.hierarchy.len()));
                    ui.label(format!("zoom: {:.1}x", self.magnification()));
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        self.draw_search(ui);
                        if self.zoom.is_transitioning() {
                            ui.spinner();
                        }
                    });
                });
                ui.horizontal(|ui| self.draw_breadcrumb(ui));
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_canvas(ui));
    }

    fn magnification(&self) -> f64 {
        let root = self.hierarchy.node(self.hierarchy.root());
        let diameter = self.zoom.view().diameter;
        if diameter > 0.0 {
            root.r * FOCUS_MARGIN / diameter
        } else {
            1.0
        }
    }

    fn draw_breadcrumb(&mut self, ui: &mut egui::Ui) {
        let focus = self.zoom.focus();
        let path = self.hierarchy.path_from_root(focus);
        let mut clicked = None;

        for (index, &id) in path.iter().enumerate() {
            if index > 0 {
                ui.label("›");
            }
            let name = &self.hierarchy.node(id).name;
            if id == focus {
                ui.strong(name.as_str());
            } else if ui.link(name.as_str()).clicked() {
                clicked = Some(id);
            }
        }

        if let Some(id) = clicked {
            let now = ui.input(|input| input.time);
            let slow = ui.input(|input| input.modifiers.alt);
            self.zoom
                .on_node_clicked(&self.hierarchy, &mut self.scene, id, slow, now);
        }
    }

    fn draw_search(&mut self, ui: &mut egui::Ui) {
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("jump to...")
                .desired_width(220.0),
        );
        if response.changed() {
            self.search_miss = false;
        }
        if self.search_miss {
            ui.weak("no match");
        }

        let submitted = response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
        if !submitted {
            return;
        }

        match jump_target(&self.hierarchy, &self.search) {
            Some(target) => {
                debug!(query = %self.search, node = %self.hierarchy.node(target).name, "search jump");
                let now = ui.input(|input| input.time);
                self.zoom
                    .on_node_clicked(&self.hierarchy, &mut self.scene, target, false, now);
            }
            None => self.search_miss = !self.search.trim().is_empty(),
        }
    }
}
