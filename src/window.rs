use std::{collections::VecDeque, sync::Arc};

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    app::{AppEvent, Application, RunState},
    config::AppConfig,
    render::Renderer,
};

/// winit driver around [`Application`]
///
/// Fields drop in order, so the application releases its GPU resources
/// before the window goes away
struct SceneWindow {
    app: Option<Application<Renderer>>,
    window: Option<Arc<Window>>,
    events: VecDeque<AppEvent>,
    config: AppConfig,
    error: Option<anyhow::Error>,
}

impl ApplicationHandler for SceneWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.events.push_back(AppEvent::CloseRequested),
            WindowEvent::RedrawRequested => {
                let Some(app) = self.app.as_mut() else {
                    return;
                };
                if app.iterate(&mut self.events) == RunState::Closed {
                    event_loop.exit();
                    return;
                }
                if let Some(w) = self.window.as_ref() {
                    w.request_redraw();
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(app) = self.app.as_mut() {
                    app.backend_mut().resize(size.width, size.height);
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _: &ActiveEventLoop) {
        self.app = None;
    }
}

impl SceneWindow {
    fn new(config: AppConfig) -> Self {
        Self {
            app: None,
            window: None,
            events: VecDeque::new(),
            config,
            error: None,
        }
    }

    /// Opens the window, creates the renderer & loads the scene
    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let size = PhysicalSize::new(self.config.width, self.config.height);
        let mut attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(size)
            .with_resizable(self.config.resizable);

        if let Some(monitor) = event_loop.primary_monitor() {
            let screen = monitor.size();
            let origin = monitor.position();
            let x = origin.x + (screen.width as i32 - size.width as i32) / 2;
            let y = origin.y + (screen.height as i32 - size.height as i32) / 2;
            attrs = attrs.with_position(PhysicalPosition::new(x, y));
        }

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Unable to create the window")?,
        );
        self.window = Some(window.clone());

        let inner = window.inner_size();
        let renderer = pollster::block_on(Renderer::new(
            inner.width,
            inner.height,
            self.config.vsync,
            window.clone(),
        ))?;
        let app = Application::new(renderer, Default::default(), &self.config)?;
        self.app = Some(app);

        window.request_redraw();
        Ok(())
    }
}

/// Opens the scene window & runs the frame loop until the window is closed
///
/// Returns the first initialization error, if any
pub fn run(config: AppConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Unable to create the event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut scene = SceneWindow::new(config);
    event_loop
        .run_app(&mut scene)
        .context("The event loop failed")?;

    match scene.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
