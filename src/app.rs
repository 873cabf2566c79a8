//! Windowed viewer application
//!
//! [`StrataApp`] owns the winit event loop. Every redraw drains finished
//! loads into the [`Viewer`], runs one [`RenderLoop`] tick and then applies
//! whatever the panel asked for.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::ViewerConfig,
    demo::demo_scene,
    error::{RenderError, TeardownError},
    gfx::{
        picking::ViewportRect,
        rendering::{RenderEngine, RenderLoop, RenderSurface, ViewportHost},
    },
    loader::{Fetcher, HttpFetcher, LoadQueue, LoadSource},
    ui::{viewer_panel, PanelActions, PanelState, UiManager},
    viewer::Viewer,
};

pub struct StrataApp {
    state: AppState,
}

impl StrataApp {
    pub fn new(config: ViewerConfig) -> Self {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::from_config(&config));
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: ViewerConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            state: AppState {
                viewer: Viewer::new(config.clone()),
                config,
                loads: LoadQueue::new(fetcher),
                render_loop: RenderLoop::new(),
                host: None,
                surface: None,
                cursor: None,
                pending_status: None,
            },
        }
    }

    /// Shows the built-in demo model until something else is loaded
    pub fn with_demo(mut self) -> Self {
        self.state.viewer.load_scene(demo_scene());
        self
    }

    /// Starts loading `source` (URL or path) in the background
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.state.start_url_load(source.into());
        self
    }

    /// Runs the event loop until the window is closed
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.state)?;
        Ok(())
    }
}

/// Window side of the render loop
struct WindowHost {
    window: Arc<Window>,
    attached: bool,
}

impl ViewportHost for WindowHost {
    fn measure(&self) -> (u32, u32) {
        self.window.inner_size().into()
    }

    fn detach(&mut self) -> Result<(), TeardownError> {
        if !self.attached {
            return Err(TeardownError::AlreadyDetached);
        }
        self.attached = false;
        self.window.set_visible(false);
        Ok(())
    }
}

/// GPU side of the render loop: the engine plus the UI overlay
struct WindowSurface {
    window: Arc<Window>,
    engine: RenderEngine,
    ui: UiManager,
    panel: PanelState,
    actions: PanelActions,
    show_panel: bool,
}

impl RenderSurface for WindowSurface {
    fn configured_size(&self) -> (u32, u32) {
        self.engine.configured_size()
    }

    fn configure(&mut self, width: u32, height: u32) {
        self.engine.configure(width, height);
    }

    fn render(&mut self, viewer: &Viewer) -> Result<(), RenderError> {
        if !self.show_panel {
            return self.engine.render(viewer);
        }

        let panel = &mut self.panel;
        let actions = &mut self.actions;
        self.ui.update_logic(&self.window, |ui| {
            *actions = viewer_panel(ui, viewer, panel);
        })?;

        let ui = &mut self.ui;
        let mut ui_result = Ok(());
        self.engine.render_frame(
            viewer,
            Some(|device: &wgpu::Device, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView| {
                ui_result = ui.render_display_only(device, queue, encoder, view);
            }),
        )?;
        ui_result
    }
}

struct AppState {
    config: ViewerConfig,
    viewer: Viewer,
    loads: LoadQueue,
    render_loop: RenderLoop,
    host: Option<WindowHost>,
    surface: Option<WindowSurface>,
    cursor: Option<PhysicalPosition<f64>>,
    /// Status of a load started before the panel existed
    pending_status: Option<LoadSource>,
}

impl AppState {
    fn start_url_load(&mut self, url: String) {
        let ticket = self.viewer.begin_load();
        let source = LoadSource::Url(url.clone());
        match self.loads.spawn_url(ticket, url) {
            Ok(()) => match self.surface.as_mut() {
                Some(surface) => surface.panel.report_loading(&source),
                None => self.pending_status = Some(source),
            },
            Err(e) => {
                log::error!("could not start loading {}: {}", source, e);
                if let Some(surface) = self.surface.as_mut() {
                    surface.panel.report_load(&source, &Err(e));
                }
            }
        }
    }

    fn drain_loads(&mut self) {
        for completion in self.loads.drain() {
            let result = self.viewer.complete_load(completion.ticket, completion.result);
            if let Some(surface) = self.surface.as_mut() {
                surface.panel.report_load(&completion.source, &result);
            }
        }
    }

    fn apply_actions(&mut self, actions: PanelActions) {
        actions.apply_to_viewer(&mut self.viewer);
        if let (Some(vsync), Some(surface)) = (actions.vsync, self.surface.as_mut()) {
            surface.engine.set_vsync(vsync);
        }
        if let Some(url) = actions.load_url {
            self.start_url_load(url);
        }
    }

    fn redraw(&mut self) {
        self.drain_loads();

        let (Some(host), Some(surface)) = (self.host.as_ref(), self.surface.as_mut()) else {
            return;
        };
        self.render_loop.tick(host, surface, &mut self.viewer);

        let actions = std::mem::take(&mut surface.actions);
        if !actions.is_empty() {
            self.apply_actions(actions);
        }
    }

    fn pick_at_cursor(&mut self) {
        let (Some(cursor), Some(host)) = (self.cursor, self.host.as_ref()) else {
            return;
        };
        let (width, height) = host.measure();
        let rect = ViewportRect::from_size(width, height);
        self.viewer.pick(cursor.x as f32, cursor.y as f32, rect);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(host) = self.host.as_mut() {
            self.render_loop.teardown(host);
        }
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = self.config.window_size;
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title("Strata")
                    .with_inner_size(LogicalSize::new(width, height)),
            )?,
        );

        let (width, height) = window.inner_size().into();
        let engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            self.config.vsync,
        ))?;
        let ui = UiManager::new(engine.device(), engine.queue(), engine.surface_format(), &window);

        let mut panel = PanelState::new(engine.vsync());
        if let Some(source) = self.pending_status.take() {
            panel.report_loading(&source);
        }

        self.host = Some(WindowHost {
            window: window.clone(),
            attached: true,
        });
        self.surface = Some(WindowSurface {
            window,
            engine,
            ui,
            panel,
            actions: PanelActions::default(),
            show_panel: true,
        });
        Ok(())
    }

    fn ui_wants_input(&self) -> bool {
        self.surface
            .as_ref()
            .is_some_and(|surface| surface.show_panel && surface.ui.wants_input())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            log::error!("could not start the viewer: {:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let ui_captured = match (self.surface.as_mut(), self.host.as_ref()) {
            (Some(surface), Some(host)) if surface.show_panel => {
                surface.ui.handle_input(&host.window, window_id, &event)
            }
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::RedrawRequested => self.redraw(),
            WindowEvent::CursorMoved { position, .. } => self.cursor = Some(position),
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::DroppedFile(path) => {
                self.start_url_load(path.to_string_lossy().into_owned());
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                if pressed && ui_captured {
                    return;
                }
                self.viewer.camera_mut().controller.set_mouse_pressed(pressed);
                if pressed {
                    self.pick_at_cursor();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.viewer.camera_mut().process_keyboard_event(&event);
                if ui_captured || event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => self.shutdown(event_loop),
                    PhysicalKey::Code(KeyCode::KeyR) => {
                        self.viewer.reset_view();
                    }
                    PhysicalKey::Code(KeyCode::F1) => {
                        if let Some(surface) = self.surface.as_mut() {
                            surface.show_panel = !surface.show_panel;
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if self.host.is_none() || self.ui_wants_input() {
            return;
        }
        self.viewer.camera_mut().process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.render_loop.is_running() {
            return;
        }
        if let Some(host) = self.host.as_ref() {
            host.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(host) = self.host.as_mut() {
            self.render_loop.teardown(host);
        }
    }
}
