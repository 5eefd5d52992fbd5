use anyhow::{Context, Result};
use log::info;

use gravflip::physics::create_backend;
use gravflip::{
    Clock, FixedClock, Game, GameConfig, InputSource, LogicalKey, Physics, RecordingRenderer,
    ScriptedInput,
};

/// Scripted session: start from the menu, run right, flip gravity, coast.
fn session() -> ScriptedInput {
    ScriptedInput::default()
        .hold(&[LogicalKey::Return], 1)
        .idle(60)
        .hold(&[LogicalKey::Right], 90)
        .hold(&[LogicalKey::Right, LogicalKey::Jump], 1)
        .hold(&[LogicalKey::Right], 30)
        .idle(120)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => GameConfig::default(),
    };
    info!("physics backend: {:?}", config.physics.backend);

    let physics = create_backend(config.physics.backend, &config.physics);
    let mut game = Game::new(
        config,
        physics,
        session(),
        FixedClock::sixty_fps(),
        RecordingRenderer::new(),
    );

    // Resources are released whether or not the session fails.
    let result = play(&mut game);
    game.shutdown();
    result
}

fn play<P, C>(game: &mut Game<P, ScriptedInput, C, RecordingRenderer>) -> Result<()>
where
    P: Physics,
    C: Clock,
{
    let mut last_state = None;
    while game.input_mut().poll_events() {
        game.step_frame()?;
        if let Some(player) = game.player() {
            last_state = Some((
                player.object.position,
                player.object.velocity,
                player.object.current_animation,
                player.object.is_grounded,
            ));
        }
    }

    if let Some((position, velocity, animation, grounded)) = last_state {
        info!(
            "player at ({:.1}, {:.1}) moving ({:.1}, {:.1}), {animation}, grounded: {grounded}",
            position.x, position.y, velocity.x, velocity.y
        );
    }
    info!(
        "{} frames, {} presented, {} sprites in last frame",
        game.frames(),
        game.renderer().frames_presented(),
        game.renderer().sprites().count()
    );
    Ok(())
}
