use std::path::PathBuf;

use crate::math::Projection;

/// Startup settings for the scene window
///
/// Paths are resolved relative to the working directory
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub vsync: bool,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub triangle_texture: PathBuf,
    pub rectangle_texture: PathBuf,
    pub clear_color: [f64; 4],
    pub projection: Projection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "2D Scene".to_string(),
            width: 640,
            height: 480,
            resizable: false,
            vsync: true,
            vertex_shader: "shaders/vertex_textured.wgsl".into(),
            fragment_shader: "shaders/fragment_textured.wgsl".into(),
            triangle_texture: "assets/t0.png".into(),
            rectangle_texture: "assets/t1.jpeg".into(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            // 4:3 like the window, 10 world units across
            projection: Projection {
                left: -5.0,
                right: 5.0,
                bottom: -3.75,
                top: 3.75,
                near: -1.0,
                far: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_matches_window_aspect() {
        let config = AppConfig::default();
        let p = config.projection;
        let world_aspect = (p.right - p.left) / (p.top - p.bottom);
        let window_aspect = config.width as f32 / config.height as f32;
        assert!((world_aspect - window_aspect).abs() < 1e-6);
    }

    #[test]
    fn defaults_point_at_bundled_files() {
        let config = AppConfig::default();
        assert_eq!(config.title, "2D Scene");
        assert!(!config.resizable);
        assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);
        assert!(config.triangle_texture.ends_with("t0.png"));
        assert!(config.rectangle_texture.ends_with("t1.jpeg"));
    }
}
