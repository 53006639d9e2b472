use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{error, info};

use crate::config::VisualConfig;
use crate::hierarchy::{Hierarchy, load_hierarchy};
use crate::pack::PackLayout;
use crate::scene::Scene;
use crate::zoom::ZoomController;

mod canvas;
mod panels;
mod search;

pub struct CircleZoomApp {
    data_path: PathBuf,
    config: VisualConfig,
    state: AppState,
    reload_rx: Option<Receiver<Result<Hierarchy, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Hierarchy, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    hierarchy: Hierarchy,
    scene: Scene,
    zoom: ZoomController,
    search: String,
    search_miss: bool,
}

impl CircleZoomApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, data_path: PathBuf, config: VisualConfig) -> Self {
        let state = Self::start_load(data_path.clone(), config.pack_layout());
        Self {
            data_path,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_path: PathBuf, layout: PackLayout) -> Receiver<Result<Hierarchy, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_hierarchy(&data_path)
                .map(|mut hierarchy| {
                    layout.apply(&mut hierarchy);
                    hierarchy
                })
                .map_err(|error| format!("{error:#}"));
            match &result {
                Ok(hierarchy) => info!(
                    path = %data_path.display(),
                    nodes = hierarchy.len(),
                    "loaded hierarchy"
                ),
                Err(message) => error!(path = %data_path.display(), "{message}"),
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: PathBuf, layout: PackLayout) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path, layout),
        }
    }

    /// Next state once the loader has answered or died; `None` while it is still working.
    fn poll_load(
        rx: &Receiver<Result<Hierarchy, String>>,
        config: &VisualConfig,
    ) -> Option<AppState> {
        match rx.try_recv() {
            Ok(Ok(hierarchy)) => Some(AppState::Ready(Box::new(ViewModel::new(hierarchy, config)))),
            Ok(Err(error)) => Some(AppState::Error(error)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                error!("background load worker disconnected");
                Some(AppState::Error("Background load worker disconnected".to_owned()))
            }
        }
    }
}

impl eframe::App for CircleZoomApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                transition = Self::poll_load(rx, &self.config);

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading hierarchy...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load hierarchy");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(
                            self.data_path.clone(),
                            self.config.pack_layout(),
                        ));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.data_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(
                        self.data_path.clone(),
                        self.config.pack_layout(),
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    transition = Self::poll_load(&rx, &self.config);
                    if transition.is_none() {
                        self.reload_rx = Some(rx);
                        ctx.request_repaint();
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
