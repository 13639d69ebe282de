//! Loading configuration from disk.

use std::io::Write;

use morphfield::{BackgroundConfig, BlendStrategy, ConfigError, OpacityRule, Simulation, Theme};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_full_config_file() {
    let file = write_config(
        r#"
        object_count = 343
        theme = "light"
        seed = 99
        time_step = 0.02
        pointer_smoothing = 0.1

        [shapes]
        cube_size = 40.0
        spiral_turns = 6.0

        [blend]
        strategy = "radial"
        morph_rate = 0.05
        inner_radius = 0.2
        outer_radius = 0.7

        [opacity]
        rule = "join-progress"

        [window]
        title = "backdrop"
        background = true
        "#,
    );

    let config = BackgroundConfig::load(file.path()).unwrap();
    assert_eq!(config.object_count, 343);
    assert_eq!(config.theme, Theme::Light);
    assert_eq!(config.seed, Some(99));
    assert_eq!(config.shapes.cube_size, 40.0);
    assert_eq!(config.shapes.spiral_turns, 6.0);
    assert_eq!(config.blend.strategy, BlendStrategy::Radial);
    assert_eq!(config.blend.morph_rate, 0.05);
    assert_eq!(config.opacity.rule, OpacityRule::JoinProgress);
    assert_eq!(config.window.title, "backdrop");
    assert!(config.window.background);
    // Untouched keys keep their defaults
    assert_eq!(config.window.width, 1280);
    assert_eq!(config.motion.join_step, 0.012);

    let mut sim = Simulation::new(&config, 800, 600);
    sim.step();
    assert_eq!(sim.objects().len(), 343);
    assert_eq!(sim.theme(), Theme::Light);
}

#[test]
fn rejects_invalid_values_from_file() {
    let file = write_config(
        r#"
        [blend]
        inner_radius = 0.9
        outer_radius = 0.5
        "#,
    );
    let err = BackgroundConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "blend.outer_radius", .. }));
    assert!(err.to_string().contains("blend.outer_radius"));
}

#[test]
fn reports_malformed_toml() {
    let file = write_config("object_count = [1, 2");
    let err = BackgroundConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn reports_wrong_types() {
    let file = write_config("theme = \"sepia\"");
    assert!(matches!(
        BackgroundConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = BackgroundConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(ref p) if p == &path));
}

#[test]
fn round_trips_through_toml() {
    let config = BackgroundConfig {
        object_count: 64,
        theme: Theme::Light,
        seed: Some(3),
        ..Default::default()
    };

    let text = toml::to_string(&config).unwrap();
    let file = write_config(&text);
    assert_eq!(BackgroundConfig::load(file.path()).unwrap(), config);
}
