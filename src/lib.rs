//! A window with two textured shapes: a triangle bouncing along the x-axis
//! and a rectangle that follows it while spinning

pub mod app;
pub mod config;
pub mod math;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;

pub use app::{AppEvent, Application, EventSource, RunState};
pub use config::AppConfig;
