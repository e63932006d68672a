use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{info, warn};

use crate::config::LayoutConfig;
use crate::layout::{LayoutState, LevelOfDetail, Viewport};
use crate::report::{NodeId, Report, load_report};
use crate::session::Session;

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<Report, String>;

pub struct ReportViewerApp {
    config: LayoutConfig,
    path_input: String,
    current_path: Option<PathBuf>,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Idle,
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    session: Session,
    path: PathBuf,
    search: String,
    selected: Option<NodeId>,
    pan: Vec2,
    zoom: f32,
    fit_requested: bool,
    layout_cache: Option<LayoutCache>,
    transition: Option<Transition>,
}

struct LayoutCache {
    viewport: Viewport,
    level: LevelOfDetail,
    layout: LayoutState,
}

/// Frame shown when a level change started; the diagram moves away from it.
struct Transition {
    from: LayoutState,
    started_secs: f64,
}

impl ReportViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: LayoutConfig,
        initial_path: Option<PathBuf>,
    ) -> Self {
        let mut app = Self {
            config,
            path_input: String::new(),
            current_path: None,
            state: AppState::Idle,
            reload_rx: None,
        };

        if let Some(path) = initial_path {
            app.open(path);
        }
        app
    }

    fn spawn_load(path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_report(&path).map_err(|error| error.to_string());
            let _ = tx.send(result);
        });

        rx
    }

    /// Drops whatever is on screen and starts loading `path`.
    fn open(&mut self, path: PathBuf) {
        info!(path = %path.display(), "opening report");
        self.path_input = path.display().to_string();
        self.reload_rx = None;
        self.state = AppState::Loading {
            rx: Self::spawn_load(path.clone()),
        };
        self.current_path = Some(path);
    }

    fn ready_state(&self, result: LoadResult) -> AppState {
        match (result, &self.current_path) {
            (Ok(report), Some(path)) => AppState::Ready(Box::new(ViewModel::new(
                Session::on_report_loaded(report, self.config.clone()),
                path.clone(),
            ))),
            (Ok(_), None) => AppState::Idle,
            (Err(error), _) => {
                warn!(%error, "report load failed");
                AppState::Error(error)
            }
        }
    }

    fn draw_open_bar(&mut self, ctx: &Context) -> Option<PathBuf> {
        let mut requested = None;

        egui::TopBottomPanel::top("open_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Report file");
                    let input = ui.add(
                        egui::TextEdit::singleline(&mut self.path_input)
                            .hint_text("path to a link report, or drop a file here")
                            .desired_width(420.0),
                    );
                    let submitted =
                        input.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
                    let loading = matches!(self.state, AppState::Loading { .. });
                    let open = ui.add_enabled(!loading, egui::Button::new("Open"));
                    if (open.clicked() || submitted) && !self.path_input.trim().is_empty() {
                        requested = Some(PathBuf::from(self.path_input.trim()));
                    }
                });
            });

        let dropped = ctx.input(|input| {
            input
                .raw
                .dropped_files
                .iter()
                .find_map(|file| file.path.clone())
        });

        dropped.or(requested)
    }
}

impl eframe::App for ReportViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if let Some(path) = self.draw_open_bar(ctx) {
            self.open(path);
        }

        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Idle => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("No report loaded");
                        ui.add_space(8.0);
                        ui.label("Enter a report path above or drop a report file on the window.");
                    });
                });
            }
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(result);
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading link report...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load link report");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested
                    && self.reload_rx.is_none()
                    && let Some(path) = &self.current_path
                {
                    self.reload_rx = Some(Self::spawn_load(path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.ready_state(result);
        }

        if retry && let Some(path) = self.current_path.clone() {
            self.open(path);
        }

        if matches!(self.state, AppState::Loading { .. }) || self.reload_rx.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }
}
