use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use eframe::egui::{Context, Vec2, vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::chain::{DataSource, LoadedAddress, load_address};
use crate::flow::{BuildConfig, FlowGraph};

mod frame_loop;
mod graph;
mod highlight;
mod interaction;
mod physics;
mod render_utils;
mod ui;
mod viewport;

use frame_loop::{EguiScheduler, FrameLoop};
use interaction::InteractionController;
use physics::PhysicsParams;
use viewport::Viewport;

/// Notifications the visualizer hands to its host.
#[derive(Clone, Debug, PartialEq)]
pub enum VisualizerEvent {
    AnalyzeAddress(String),
    LoadingChanged(bool),
}

#[derive(Clone, Copy, Debug)]
pub struct VisualizerConfig {
    /// Logical drawing surface; physics keeps nodes inside it.
    pub canvas: Vec2,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub live_physics: bool,
    /// Fixed seed for the drift simulation; `None` seeds from entropy.
    pub physics_seed: Option<u64>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            canvas: vec2(800.0, 600.0),
            zoom_min: 0.1,
            zoom_max: 5.0,
            live_physics: true,
            physics_seed: None,
        }
    }
}

pub struct TxFlowApp {
    source: Arc<DataSource>,
    address: String,
    view: ViewModel,
    loader: Option<Receiver<LoadedAddress>>,
    events: Receiver<VisualizerEvent>,
}

struct ViewModel {
    graph: FlowGraph,
    loading: bool,
    config: VisualizerConfig,
    build_config: BuildConfig,
    viewport: Viewport,
    interaction: InteractionController,
    frame_loop: FrameLoop<EguiScheduler>,
    physics: PhysicsParams,
    live_physics: bool,
    rng: StdRng,
    search: String,
    graph_revision: u64,
    search_match_cache: Option<SearchMatchCache>,
    related_rows_visible: usize,
    events: Sender<VisualizerEvent>,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

impl TxFlowApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        source: DataSource,
        address: String,
        config: VisualizerConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        let view = ViewModel::new(cc.egui_ctx.clone(), config, events_tx);

        let mut app = Self {
            source: Arc::new(source),
            address,
            view,
            loader: None,
            events: events_rx,
        };
        app.start_load();
        app
    }

    fn spawn_load(source: Arc<DataSource>, address: String) -> Receiver<LoadedAddress> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let loaded = load_address(&source, &address);
            let _ = tx.send(loaded);
        });

        rx
    }

    fn start_load(&mut self) {
        info!(address = %self.address, "loading address");
        self.view.begin_loading();
        self.loader = Some(Self::spawn_load(
            Arc::clone(&self.source),
            self.address.clone(),
        ));
    }

    fn poll_loader(&mut self) {
        let Some(rx) = self.loader.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(loaded) => self.view.finish_loading(loaded),
            Err(TryRecvError::Empty) => self.loader = Some(rx),
            Err(TryRecvError::Disconnected) => {
                warn!(address = %self.address, "background load worker disconnected");
                self.view.finish_loading(LoadedAddress {
                    address: self.address.clone(),
                    ..LoadedAddress::default()
                });
            }
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                VisualizerEvent::AnalyzeAddress(address) => {
                    info!(%address, "analyze address requested");
                    if address != self.address {
                        self.address = address;
                        self.start_load();
                    }
                }
                VisualizerEvent::LoadingChanged(loading) => {
                    debug!(loading, "loading state changed");
                }
            }
        }
    }
}

impl eframe::App for TxFlowApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_loader();
        self.drain_events();

        let mut reload_requested = false;
        self.view
            .show(ctx, &self.address, &mut reload_requested, self.loader.is_some());

        if reload_requested && self.loader.is_none() {
            self.start_load();
        }
    }
}

impl ViewModel {
    fn new(ctx: Context, config: VisualizerConfig, events: Sender<VisualizerEvent>) -> Self {
        let physics = PhysicsParams::default();
        let mut frame_loop = FrameLoop::new(EguiScheduler::new(ctx), physics.clock_step);
        frame_loop.start();

        Self {
            graph: FlowGraph::default(),
            loading: false,
            config,
            build_config: BuildConfig {
                canvas: config.canvas,
                ..BuildConfig::default()
            },
            viewport: Viewport::new(config.zoom_min, config.zoom_max),
            interaction: InteractionController::default(),
            frame_loop,
            physics,
            live_physics: config.live_physics,
            rng: match config.physics_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
            search: String::new(),
            graph_revision: 0,
            search_match_cache: None,
            related_rows_visible: Self::INITIAL_RELATED_ROWS,
            events,
        }
    }

    fn begin_loading(&mut self) {
        if !self.loading {
            self.loading = true;
            let _ = self.events.send(VisualizerEvent::LoadingChanged(true));
        }
    }
}
