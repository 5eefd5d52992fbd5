use gravflip::config::SegmentConfig;
use gravflip::render::{DrawCommand, SpriteKind};
use gravflip::{
    Animation, FixedClock, Game, GameConfig, GameState, InputSource, LogicalKey, Physics,
    PhysicsEngine, RecordingRenderer, ScriptedInput, SelectionMode, Vec2,
};

type TestGame = Game<PhysicsEngine, ScriptedInput, FixedClock, RecordingRenderer>;

const EPS: f32 = 1e-3;

fn build(config: GameConfig, input: ScriptedInput) -> TestGame {
    let physics = PhysicsEngine::from_config(&config.physics);
    Game::new(
        config,
        physics,
        input,
        FixedClock::sixty_fps(),
        RecordingRenderer::new(),
    )
}

/// Press Return on the first menu entry, then let the player land.
fn started(extra: ScriptedInput) -> TestGame {
    let mut game = build(GameConfig::default(), extra);
    game.start_game().unwrap();
    for _ in 0..90 {
        game.step_frame().unwrap();
    }
    assert!(game.player().unwrap().object.is_grounded);
    game
}

#[test]
fn menu_frame_draws_only_the_menu() {
    let mut game = build(GameConfig::default(), ScriptedInput::default().idle(1));
    game.run().unwrap();

    assert_eq!(game.state(), GameState::Menu);
    assert_eq!(
        game.renderer().last_frame(),
        &[DrawCommand::Menu {
            labels: vec!["Start Game".into(), "Options".into(), "Exit".into()],
            selected: 0,
        }]
    );
}

#[test]
fn return_on_start_game_enters_play() {
    let input = ScriptedInput::default()
        .hold(&[LogicalKey::Return], 1)
        .idle(5);
    let mut game = build(GameConfig::default(), input);

    game.input_mut().poll_events();
    game.step_frame().unwrap();

    assert_eq!(game.state(), GameState::Playing);
    let kinds: Vec<_> = game.renderer().sprites().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SpriteKind::Player, SpriteKind::Ground]);
}

#[test]
fn options_keeps_the_menu_open() {
    let input = ScriptedInput::default()
        .hold(&[LogicalKey::Down], 1)
        .idle(1)
        .hold(&[LogicalKey::Return], 1)
        .idle(1);
    let mut game = build(GameConfig::default(), input);
    game.run().unwrap();

    assert_eq!(game.state(), GameState::Menu);
    assert_eq!(game.menu().selected_label(), Some("Options"));
    assert_eq!(game.frames(), 4);
}

#[test]
fn exit_entry_stops_the_loop_and_releases_resources() {
    // Jump is "previous"; with wrapping it lands on Exit.
    let input = ScriptedInput::default()
        .hold(&[LogicalKey::Jump], 1)
        .idle(1)
        .hold(&[LogicalKey::Return], 1)
        .idle(100);
    let mut game = build(GameConfig::default(), input);
    game.run().unwrap();

    assert!(game.exit_requested());
    assert_eq!(game.frames(), 3);
    assert!(game.input().quit_called());
    assert_eq!(game.input().remaining(), 100);
}

#[test]
fn clamped_menu_cannot_reach_exit_backwards() {
    let config = GameConfig::default().with_selection_mode(SelectionMode::Clamp);
    let input = ScriptedInput::default()
        .hold(&[LogicalKey::Jump], 1)
        .idle(1)
        .hold(&[LogicalKey::Return], 1);
    let mut game = build(config, input);
    game.run().unwrap();

    // Still on Start Game, which was activated.
    assert_eq!(game.state(), GameState::Playing);
    assert!(!game.exit_requested());
}

#[test]
fn run_releases_bodies_at_shutdown() {
    let input = ScriptedInput::default()
        .hold(&[LogicalKey::Return], 1)
        .idle(10);
    let mut game = build(GameConfig::default(), input);
    game.run().unwrap();

    assert_eq!(game.state(), GameState::Playing);
    assert!(game.objects().is_empty());
    assert_eq!(game.physics().body_count(), 0);
    assert!(game.input().quit_called());
}

#[test]
fn shutdown_after_a_failed_frame_releases_resources() {
    let mut config = GameConfig::default();
    config.player.mass = 0.0;
    let input = ScriptedInput::default()
        .hold(&[LogicalKey::Return], 1)
        .idle(10);
    let mut game = build(config, input);

    assert!(game.input_mut().poll_events());
    let err = game.step_frame().unwrap_err();
    assert!(err.to_string().contains("failed to spawn level objects"));
    assert_eq!(game.state(), GameState::Menu);

    game.shutdown();
    assert!(game.input().quit_called());
    assert!(game.objects().is_empty());
    assert_eq!(game.physics().body_count(), 0);
    assert!(!game.input_mut().poll_events());
}

#[test]
fn run_returns_frame_errors_after_shutdown() {
    let mut config = GameConfig::default();
    config.player.mass = 0.0;
    let input = ScriptedInput::default()
        .hold(&[LogicalKey::Return], 1)
        .idle(10);
    let mut game = build(config, input);

    assert!(game.run().is_err());
    assert!(game.input().quit_called());
    assert_eq!(game.input().remaining(), 10);
}

#[test]
fn holding_right_runs_right() {
    let mut game = started(ScriptedInput::default().hold(&[LogicalKey::Right], 30));
    let start_x = game.player().unwrap().object.position.x;

    while game.input_mut().poll_events() {
        game.step_frame().unwrap();
    }

    let player = game.player().unwrap();
    assert!(player.object.position.x > start_x);
    assert!(player.object.velocity.x > 0.0);
    assert!(player.object.is_grounded);
}

#[test]
fn left_has_priority_over_right() {
    let mut game = started(ScriptedInput::default().hold(&[LogicalKey::Left, LogicalKey::Right], 10));
    let start_x = game.player().unwrap().object.position.x;

    while game.input_mut().poll_events() {
        game.step_frame().unwrap();
    }

    let player = game.player().unwrap();
    assert!(player.object.position.x < start_x);
    assert!(player.object.velocity.x < 0.0);
}

#[test]
fn jump_flips_gravity_and_blocks_until_landing() {
    let mut game = started(ScriptedInput::default().hold(&[LogicalKey::Jump], 20));
    let gravity = game.physics().gravity();

    assert!(game.input_mut().poll_events());
    game.step_frame().unwrap();
    assert_eq!(game.physics().gravity(), -gravity);

    // Still holding jump while airborne: no further flips.
    while game.input_mut().poll_events() {
        game.step_frame().unwrap();
        let player = game.player().unwrap();
        assert!(!player.object.is_grounded);
        assert!(!player.can_toggle_gravity);
        assert_eq!(player.object.current_animation, Animation::Jump);
    }
    assert_eq!(game.physics().gravity(), -gravity);
}

#[test]
fn jump_while_falling_from_spawn_does_nothing() {
    let input = ScriptedInput::default()
        .hold(&[LogicalKey::Return], 1)
        .idle(1)
        .hold(&[LogicalKey::Jump], 5);
    let mut game = build(GameConfig::default(), input);
    let gravity = game.physics().gravity();

    while game.input_mut().poll_events() {
        game.step_frame().unwrap();
        let player = game.player().unwrap();
        assert!(!player.object.is_grounded);
        assert!(!player.can_toggle_gravity);
    }
    assert_eq!(game.physics().gravity(), gravity);
}

#[test]
fn flipping_onto_a_ceiling_lands_and_reenables_toggle() {
    let config = GameConfig::default().with_segments(vec![
        SegmentConfig::new(0.0, 300.0, 800.0),
        SegmentConfig::new(0.0, 150.0, 800.0),
    ]);
    let input = ScriptedInput::default()
        .hold(&[LogicalKey::Jump], 1)
        .idle(90);
    let mut game = build(config, input);
    game.start_game().unwrap();
    for _ in 0..90 {
        game.step_frame().unwrap();
    }
    assert!(game.player().unwrap().object.is_grounded);

    while game.input_mut().poll_events() {
        game.step_frame().unwrap();
    }

    let player = game.player().unwrap();
    assert!(player.object.is_grounded);
    assert!(player.can_toggle_gravity);
    // Resting against the underside of the ceiling.
    assert!((player.object.position.y - 170.0).abs() < EPS);
}

#[test]
fn camera_stays_inside_world_while_playing() {
    let mut game = started(ScriptedInput::default().hold(&[LogicalKey::Right], 240));
    while game.input_mut().poll_events() {
        game.step_frame().unwrap();
        let cam = game.camera();
        let b = cam.world_bounds;
        assert!(cam.world_x >= b.min_x);
        assert!(cam.world_x + cam.viewport_width <= b.max_x);
        assert!(cam.world_y >= b.min_y);
        assert!(cam.world_y + cam.viewport_height <= b.max_y);
    }
}

#[test]
fn sprites_are_drawn_camera_relative() {
    let game = started(ScriptedInput::default());
    let cam = *game.camera();
    let player = game.player().unwrap().object.clone();

    let drawn = game
        .renderer()
        .sprites()
        .find(|s| s.kind == SpriteKind::Player)
        .unwrap();
    assert_eq!(drawn.screen_position, cam.world_to_screen(player.position));
    assert_eq!(drawn.size, Vec2::new(32.0, 32.0));
    assert_eq!(drawn.animation, Animation::Idle);
}

#[test]
fn off_screen_segments_are_culled() {
    let config = GameConfig::default().with_segments(vec![
        SegmentConfig::new(0.0, 300.0, 800.0),
        SegmentConfig::new(1500.0, 100.0, 50.0),
    ]);
    let mut game = build(config, ScriptedInput::default());
    game.start_game().unwrap();
    game.step_frame().unwrap();

    assert_eq!(game.objects().len(), 3);
    let kinds: Vec<_> = game.renderer().sprites().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SpriteKind::Player, SpriteKind::Ground]);
}

#[test]
fn missing_body_is_skipped_without_failing_the_frame() {
    let mut game = started(ScriptedInput::default().hold(&[LogicalKey::Right], 5));
    let handle = game.player().unwrap().object.handle();
    game.physics_mut().remove_body(handle).unwrap();

    while game.input_mut().poll_events() {
        game.step_frame().unwrap();
    }
    assert_eq!(game.state(), GameState::Playing);
}

#[test]
fn first_playing_frame_matches_integration_formula() {
    let mut config = GameConfig::default();
    config.physics.max_substep = 0.0;
    let physics = PhysicsEngine::from_config(&config.physics);
    let mut game = Game::new(
        config,
        physics,
        ScriptedInput::default(),
        FixedClock::new(0.1),
        RecordingRenderer::new(),
    );
    game.start_game().unwrap();
    game.step_frame().unwrap();

    let player = game.player().unwrap();
    assert_eq!(player.object.velocity.x, 0.0);
    assert!((player.object.velocity.y - 98.0).abs() < EPS);
    assert!((player.object.position.y - 259.8).abs() < EPS);
}
