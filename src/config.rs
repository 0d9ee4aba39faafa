use glam::Vec3;

use crate::scene::color::Color;

#[derive(Debug, Clone, Copy)]
pub struct SpawnConfig {
    /// New objects are placed with x and z in `[-extent, extent]`.
    pub horizontal_extent: f32,
    /// ... and y in `[0, max_height]`.
    pub max_height: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Radians per pixel of orbit drag.
    pub orbit_speed: f32,
    /// Distance kept between the polar angle and either pole.
    pub polar_margin: f32,
    pub zoom_out_factor: f32,
    pub zoom_in_factor: f32,
    /// Optional `(min, max)` camera distance. The stock editor zooms without bounds.
    pub zoom_limits: Option<(f32, f32)>,
}

#[derive(Debug, Clone, Copy)]
pub struct LightingConfig {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub sun_color: Color,
    pub sun_intensity: f32,
    pub sun_position: Vec3,
    /// Width and height of the square shadow map in texels.
    pub shadow_map_size: u32,
    /// Half-size of the sun's orthographic shadow frustum.
    pub shadow_extent: f32,
    pub shadow_near: f32,
    pub shadow_far: f32,
}

#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub seed: Option<u64>,
    pub background: Color,
    pub highlight_emissive: Color,
    pub nudge_step: f32,
    pub nudge_step_fast: f32,
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub axes_length: f32,
    pub shader_hot_reload: bool,
    pub spawn: SpawnConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            background: Color::from_hex(0x1a1a1a),
            highlight_emissive: Color::from_hex(0x444444),
            nudge_step: 0.01,
            nudge_step_fast: 0.1,
            grid_size: 20.0,
            grid_divisions: 20,
            axes_length: 5.0,
            shader_hot_reload: true,
            spawn: SpawnConfig {
                horizontal_extent: 2.0,
                max_height: 2.0,
            },
            camera: CameraConfig {
                eye: Vec3::new(5.0, 5.0, 5.0),
                fov_y_degrees: 75.0,
                near: 0.1,
                far: 1000.0,
                orbit_speed: 0.01,
                polar_margin: 0.1,
                zoom_out_factor: 1.1,
                zoom_in_factor: 0.9,
                zoom_limits: None,
            },
            lighting: LightingConfig {
                ambient_color: Color::from_hex(0x404040),
                ambient_intensity: 0.6,
                sun_color: Color::from_hex(0xffffff),
                sun_intensity: 0.8,
                sun_position: Vec3::new(10.0, 10.0, 5.0),
                shadow_map_size: 2048,
                shadow_extent: 5.0,
                shadow_near: 0.5,
                shadow_far: 500.0,
            },
        }
    }
}

impl EditorConfig {
    /// Defaults, overridden by `SCENE_EDITOR_SEED`, `SCENE_EDITOR_BACKGROUND`
    /// and `SCENE_EDITOR_HOT_RELOAD`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(seed) = var("SCENE_EDITOR_SEED") {
            match seed.parse() {
                Ok(seed) => self.seed = Some(seed),
                Err(e) => log::warn!("Ignoring invalid SCENE_EDITOR_SEED {seed:?}: {e}"),
            }
        }

        if let Some(background) = var("SCENE_EDITOR_BACKGROUND") {
            match Color::parse_hex(&background) {
                Some(color) => self.background = color,
                None => log::warn!("Ignoring invalid SCENE_EDITOR_BACKGROUND {background:?}"),
            }
        }

        if let Some(value) = var("SCENE_EDITOR_HOT_RELOAD") {
            self.shader_hot_reload = !matches!(value.as_str(), "0" | "false" | "off");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_vars(vars: &[(&str, &str)]) -> EditorConfig {
        let mut config = EditorConfig::default();
        config.apply_overrides(|name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        });
        config
    }

    #[test]
    fn overrides_are_applied() {
        let config = with_vars(&[
            ("SCENE_EDITOR_SEED", "42"),
            ("SCENE_EDITOR_BACKGROUND", "#203040"),
            ("SCENE_EDITOR_HOT_RELOAD", "off"),
        ]);

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.background, Color::from_hex(0x203040));
        assert!(!config.shader_hot_reload);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = with_vars(&[
            ("SCENE_EDITOR_SEED", "soon"),
            ("SCENE_EDITOR_BACKGROUND", "teal"),
        ]);
        let defaults = EditorConfig::default();

        assert_eq!(config.seed, None);
        assert_eq!(config.background, defaults.background);
        assert!(config.shader_hot_reload);
    }
}
