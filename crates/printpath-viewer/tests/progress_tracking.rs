//! Live print-progress recoloring over sealed chunks

use std::time::{Duration, Instant};

use printpath_core::{Color4, ViewerConfig};
use printpath_viewer::GcodeProcessor;

/// Ten extruding moves, one per line, every line exactly 12 bytes long
/// ("G1 Xnn E1..\n") so primitive byte offsets are 0, 12, 24, ...
fn fixed_width_source() -> String {
    let mut gcode = String::new();
    for i in 0..10 {
        gcode.push_str(&format!("G1 X{:02} E1..\n", 10 + i));
    }
    gcode
}

fn tracked_processor(config: &ViewerConfig) -> GcodeProcessor {
    let source = fixed_width_source();
    let mut processor = GcodeProcessor::new(config).unwrap();
    processor.begin(&source);
    processor.run_to_end(&source);
    processor.set_live_tracking(true);
    processor
}

fn config_with_lookahead(lookahead_bytes: u64) -> ViewerConfig {
    ViewerConfig {
        lookahead_bytes,
        ..Default::default()
    }
}

const WHITE: Color4 = Color4::new(1.0, 1.0, 1.0, 1.0);

#[test]
fn test_three_zone_recolor() {
    // Look-ahead of two lines' worth of bytes.
    let mut processor = tracked_processor(&config_with_lookahead(24));
    let cyan = processor.chunks()[0].base_color(0);

    // Cursor at the start of the fourth line; primitives whose line has
    // been reached count as printed.
    processor.update_file_position(36);
    assert!(processor.on_render_tick(Instant::now()));

    let chunk = &processor.chunks()[0];
    // Printed zone takes the progress color.
    for primitive in 0..4 {
        assert_eq!(chunk.primitive_color(primitive), WHITE);
    }
    // The look-ahead window keeps the emission color.
    for primitive in 4..6 {
        assert_eq!(chunk.primitive_color(primitive), cyan);
    }
    // Everything beyond is hidden.
    for primitive in 6..10 {
        assert_eq!(chunk.primitive_color(primitive).a, 0.0);
    }
}

#[test]
fn test_solid_tracking_ghosts_instead_of_hiding() {
    let config = ViewerConfig {
        show_solid_while_tracking: true,
        solid_transparency: 0.2,
        ..config_with_lookahead(0)
    };
    let mut processor = tracked_processor(&config);

    processor.update_file_position(12);
    processor.on_render_tick(Instant::now());

    let chunk = &processor.chunks()[0];
    let ghosted = chunk.primitive_color(9);
    assert!((ghosted.a - 0.2).abs() < 1e-6);
    // Color itself stays the emission color.
    let base = chunk.base_color(9);
    assert_eq!((ghosted.r, ghosted.g, ghosted.b), (base.r, base.g, base.b));
}

#[test]
fn test_recolor_is_idempotent() {
    let mut processor = tracked_processor(&config_with_lookahead(24));
    let now = Instant::now();

    processor.update_file_position(36);
    processor.on_render_tick(now);
    let first: Vec<f32> = processor.chunks()[0].colors.clone();

    // A later pass at the same cursor repaints to identical colors.
    processor.on_render_tick(now + Duration::from_secs(60));
    assert_eq!(processor.chunks()[0].colors, first);
}

#[test]
fn test_refresh_interval_throttles_passes() {
    let mut processor = tracked_processor(&ViewerConfig::default());
    let now = Instant::now();

    processor.update_file_position(12);
    assert!(processor.on_render_tick(now));
    // Tier 3 refreshes every 2 seconds.
    assert!(!processor.on_render_tick(now + Duration::from_millis(100)));
    assert!(processor.on_render_tick(now + Duration::from_secs(3)));
}

#[test]
fn test_cursor_never_regresses() {
    let mut processor = tracked_processor(&config_with_lookahead(0));
    let now = Instant::now();

    processor.update_file_position(48);
    processor.on_render_tick(now);
    let painted = processor.chunks()[0].primitive_color(3);
    assert_eq!(painted, WHITE);

    // A stale position report does not unpaint anything.
    processor.update_file_position(12);
    processor.on_render_tick(now + Duration::from_secs(3));
    assert_eq!(processor.chunks()[0].primitive_color(3), WHITE);
}

#[test]
fn test_final_pass_paints_everything_then_stops() {
    let mut processor = tracked_processor(&ViewerConfig::default());
    let now = Instant::now();

    processor.update_file_position(12);
    processor.on_render_tick(now);
    processor.request_final_pass();

    // The final pass bypasses the refresh throttle.
    assert!(processor.on_render_tick(now + Duration::from_millis(1)));
    let chunk = &processor.chunks()[0];
    for primitive in 0..chunk.primitive_count() {
        assert_eq!(chunk.primitive_color(primitive), WHITE);
    }
    assert!(processor.is_live_tracking());

    // One refresh interval later, tracking shuts itself off.
    assert!(!processor.on_render_tick(now + Duration::from_secs(10)));
    assert!(!processor.is_live_tracking());
}

#[test]
fn test_tick_without_tracking_does_nothing() {
    let source = fixed_width_source();
    let mut processor = GcodeProcessor::new(&ViewerConfig::default()).unwrap();
    processor.begin(&source);
    processor.run_to_end(&source);

    processor.update_file_position(48);
    assert!(!processor.on_render_tick(Instant::now()));

    let chunk = &processor.chunks()[0];
    assert_eq!(chunk.primitive_color(0), chunk.base_color(0));
}
