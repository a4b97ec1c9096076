use std::collections::VecDeque;

use glam::Mat4;

use crate::{
    config::AppConfig,
    render::{RenderBackend, ShaderProgram, draw::draw_scene, texture::load_texture},
    scene::Scene,
    time::{Clock, FrameTimer, MonotonicClock},
};

/// Whether the frame loop should keep going; `Closed` is final
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Closed,
}

/// Window events the scene reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    CloseRequested,
}

/// Non-blocking source of pending [`AppEvent`]s
pub trait EventSource {
    fn poll_event(&mut self) -> Option<AppEvent>;
}

impl EventSource for VecDeque<AppEvent> {
    fn poll_event(&mut self) -> Option<AppEvent> {
        self.pop_front()
    }
}

/// Everything the frame loop owns: backend, program, textures & scene state
///
/// Textures & the program are released through the backend when the application drops
pub struct Application<B: RenderBackend, C: Clock = MonotonicClock> {
    backend: B,
    shader: ShaderProgram,
    scene: Scene,
    timer: FrameTimer<C>,
    state: RunState,
    reported_fps: u32,
}

impl<B: RenderBackend, C: Clock> Application<B, C> {
    /// Loads the program & both textures & sets up the fixed camera
    ///
    /// Anything acquired before a failure is released again
    pub fn new(mut backend: B, clock: C, config: &AppConfig) -> anyhow::Result<Self> {
        let shader = ShaderProgram::load(&mut backend, &config.vertex_shader, &config.fragment_shader)?;

        shader.set_projection_matrix(&mut backend, config.projection.matrix());
        shader.set_view_matrix(&mut backend, Mat4::IDENTITY);
        backend.use_program(shader.program_id());
        backend.set_clear_color(config.clear_color);

        let triangle_texture = match load_texture(&mut backend, &config.triangle_texture) {
            Ok(texture) => texture,
            Err(err) => {
                shader.release(&mut backend);
                return Err(err);
            }
        };
        let rectangle_texture = match load_texture(&mut backend, &config.rectangle_texture) {
            Ok(texture) => texture,
            Err(err) => {
                backend.delete_texture(triangle_texture);
                shader.release(&mut backend);
                return Err(err);
            }
        };

        log::info!("Scene ready");
        Ok(Self {
            backend,
            shader,
            scene: Scene::new(triangle_texture, rectangle_texture),
            timer: FrameTimer::new(clock),
            state: RunState::Running,
            reported_fps: 0,
        })
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CloseRequested if self.state == RunState::Running => {
                log::info!("Close requested after {} frames", self.timer.frame);
                self.state = RunState::Closed;
            }
            AppEvent::CloseRequested => {}
        }
    }

    /// Runs one frame: drain events, tick, update, draw & present
    pub fn iterate(&mut self, events: &mut impl EventSource) -> RunState {
        while let Some(event) = events.poll_event() {
            self.handle_event(event);
        }

        let delta = self.timer.tick();
        self.scene.update(delta);
        draw_scene(&mut self.backend, &self.shader, &self.scene);

        if self.timer.fps != self.reported_fps {
            self.reported_fps = self.timer.fps;
            log::debug!("{} fps", self.reported_fps);
        }

        self.state
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: RenderBackend, C: Clock> Drop for Application<B, C> {
    fn drop(&mut self) {
        self.backend.delete_texture(self.scene.triangle_texture);
        self.backend.delete_texture(self.scene.rectangle_texture);
        self.shader.release(&mut self.backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        render::{
            MatrixUniform, ProgramId, TextureId,
            testing::{Call, RecordingBackend},
        },
        time::tests::ManualClock,
    };
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    fn fixture(name: &str) -> AppConfig {
        let dir: PathBuf = std::env::temp_dir().join(format!("twirl-app-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("vertex.wgsl"), "// vs").unwrap();
        std::fs::write(dir.join("fragment.wgsl"), "// fs").unwrap();
        RgbaImage::from_pixel(2, 2, Rgba([255, 128, 0, 255]))
            .save(dir.join("t0.png"))
            .unwrap();
        RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]))
            .save(dir.join("t1.png"))
            .unwrap();

        AppConfig {
            vertex_shader: dir.join("vertex.wgsl"),
            fragment_shader: dir.join("fragment.wgsl"),
            triangle_texture: dir.join("t0.png"),
            rectangle_texture: dir.join("t1.png"),
            ..Default::default()
        }
    }

    fn app(name: &str) -> (Application<RecordingBackend, ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        let app = Application::new(RecordingBackend::default(), clock.clone(), &fixture(name)).unwrap();
        (app, clock)
    }

    #[test]
    fn init_sets_camera_program_and_textures() {
        let (mut app, _) = app("init");
        let config = AppConfig::default();

        let scene = app.scene();
        assert_eq!(scene.triangle_x, 0.0);
        assert_eq!(scene.triangle_speed, 1.0);
        assert_eq!(scene.rotation_angle, 0.0);
        assert_eq!(app.state(), RunState::Running);

        let calls = &app.backend_mut().calls;
        assert_eq!(
            &calls[..5],
            &[
                Call::CreateProgram(ProgramId(0)),
                Call::SetMatrix(MatrixUniform::Projection, config.projection.matrix()),
                Call::SetMatrix(MatrixUniform::View, Mat4::IDENTITY),
                Call::UseProgram(ProgramId(0)),
                Call::SetClearColor([0.0, 0.0, 0.0, 1.0]),
            ]
        );
        assert_eq!(
            &calls[5..],
            &[
                Call::CreateTexture { width: 2, height: 2, bytes: 16 },
                Call::CreateTexture { width: 4, height: 4, bytes: 64 },
            ]
        );
    }

    #[test]
    fn first_frame_clears_draws_twice_and_presents() {
        let (mut app, _) = app("first-frame");
        app.backend_mut().calls.clear();

        let state = app.iterate(&mut VecDeque::new());

        assert_eq!(state, RunState::Running);
        let backend = app.backend_mut();
        assert_eq!(backend.count(|c| *c == Call::Clear), 1);
        assert_eq!(backend.count(|c| matches!(c, Call::DrawTriangles { .. })), 2);
        assert_eq!(backend.count(|c| *c == Call::Present), 1);
    }

    #[test]
    fn frames_advance_with_the_clock() {
        let (mut app, clock) = app("clock");
        let mut events = VecDeque::new();

        app.iterate(&mut events);
        clock.advance(500);
        app.iterate(&mut events);

        let scene = app.scene();
        assert!((scene.triangle_x - 0.5).abs() < 1e-6);
        assert!((scene.rotation_angle - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert!((scene.rectangle_translation().x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn close_event_ends_loop_after_one_more_frame() {
        let (mut app, clock) = app("quit");
        let mut events = VecDeque::new();

        for _ in 0..3 {
            clock.advance(16);
            assert_eq!(app.iterate(&mut events), RunState::Running);
        }

        events.push_back(AppEvent::CloseRequested);
        let presents_before = app.backend_mut().count(|c| *c == Call::Present);

        let mut iterations = 0;
        loop {
            iterations += 1;
            if app.iterate(&mut events) == RunState::Closed {
                break;
            }
        }

        assert_eq!(iterations, 1);
        assert_eq!(app.backend_mut().count(|c| *c == Call::Present), presents_before + 1);
    }

    #[test]
    fn closed_is_final() {
        let (mut app, _) = app("final");
        app.handle_event(AppEvent::CloseRequested);
        app.handle_event(AppEvent::CloseRequested);
        assert_eq!(app.iterate(&mut VecDeque::new()), RunState::Closed);
        assert_eq!(app.state(), RunState::Closed);
    }

    #[test]
    fn missing_texture_aborts_init_and_releases() {
        let mut config = fixture("missing-texture");
        config.rectangle_texture = "assets/nope.jpeg".into();

        let err = Application::new(RecordingBackend::default(), ManualClock::default(), &config)
            .err()
            .unwrap();
        assert!(err.to_string().contains("Unable to load image"));
    }

    #[test]
    fn partial_init_is_released() {
        let mut backend = RecordingBackend::default();

        // failure after the first texture releases it & the program
        let mut config = fixture("partial");
        config.rectangle_texture = "assets/nope.jpeg".into();
        assert!(Application::new(&mut backend, ManualClock::default(), &config).is_err());
        assert!(backend.calls.contains(&Call::DeleteTexture(TextureId(0))));
        assert!(backend.calls.contains(&Call::DeleteProgram(ProgramId(0))));
    }

    #[test]
    fn drop_releases_textures_and_program() {
        let mut backend = RecordingBackend::default();
        let mut app = Application::new(&mut backend, ManualClock::default(), &fixture("drop")).unwrap();
        app.iterate(&mut VecDeque::new());
        drop(app);

        let tail = &backend.calls[backend.calls.len() - 3..];
        assert_eq!(
            tail,
            &[
                Call::DeleteTexture(TextureId(0)),
                Call::DeleteTexture(TextureId(1)),
                Call::DeleteProgram(ProgramId(0)),
            ]
        );
    }

    #[test]
    fn shader_failure_is_fatal() {
        let config = fixture("bad-shader");
        let backend = RecordingBackend {
            fail_programs: true,
            ..Default::default()
        };

        let err = Application::new(backend, ManualClock::default(), &config).err().unwrap();
        let msg = format!("{err:#}");
        assert!(msg.contains("Unable to build shader program"));
        assert!(msg.contains("link failed"));
    }
}
