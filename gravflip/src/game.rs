//! Top-level orchestrator: the menu/playing state machine and the frame loop.

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::camera::Camera;
use crate::config::GameConfig;
use crate::input::{InputSource, LogicalKey};
use crate::math::Vec2;
use crate::menu::Menu;
use crate::objects::{Entity, GroundSegment, ObjectArena, ObjectId, Player};
use crate::physics::{BodyHandle, Physics};
use crate::render::{MenuView, Renderer};
use crate::time::Clock;

/// Which mode the game is in. `Menu` is initial; `Playing` is entered once
/// and only left by exiting the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
}

/// Actions bound to the main menu entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    StartGame,
    Options,
    Exit,
}

/// Owns the ports, the objects and the frame loop.
///
/// Each frame runs poll, input, update, render and clock strictly in that
/// order on one thread.
pub struct Game<P, I, C, R> {
    config: GameConfig,
    physics: P,
    input: I,
    clock: C,
    renderer: R,

    state: GameState,
    objects: ObjectArena,
    /// The object driven by input, set when gameplay starts.
    player: Option<ObjectId>,
    camera: Camera,
    menu: Menu<MenuAction>,

    exit_requested: bool,
    frames: u64,
}

impl<P, I, C, R> Game<P, I, C, R>
where
    P: Physics,
    I: InputSource,
    C: Clock,
    R: Renderer,
{
    pub fn new(config: GameConfig, physics: P, input: I, clock: C, renderer: R) -> Self {
        let camera = Camera::new(
            config.viewport.width,
            config.viewport.height,
            config.world_bounds,
        );
        let menu = Menu::new(config.menu.selection)
            .with_item("Start Game", MenuAction::StartGame)
            .with_item("Options", MenuAction::Options)
            .with_item("Exit", MenuAction::Exit);

        Self {
            config,
            physics,
            input,
            clock,
            renderer,
            state: GameState::Menu,
            objects: ObjectArena::new(),
            player: None,
            camera,
            menu,
            exit_requested: false,
            frames: 0,
        }
    }

    /// Enter gameplay and spawn the level. Does nothing once playing.
    pub fn start_game(&mut self) -> Result<()> {
        if self.state == GameState::Playing {
            return Ok(());
        }
        self.init_game_objects()
            .context("failed to spawn level objects")?;
        self.state = GameState::Playing;
        info!("game started with {} objects", self.objects.len());
        Ok(())
    }

    fn init_game_objects(&mut self) -> Result<()> {
        self.clear_objects();

        let player = Player::spawn(&mut self.physics, &self.config.player)?;
        let focus = player_focus(&player);
        self.player = Some(self.adopt(player.object.handle(), player)?);

        for segment in self.config.level.segments.clone() {
            let ground = GroundSegment::from_config(&mut self.physics, &segment)?;
            self.adopt(ground.object.handle(), ground)?;
        }

        self.camera.follow(focus);
        Ok(())
    }

    /// Move a freshly spawned object into the arena, releasing its body if
    /// the arena refuses it.
    fn adopt(&mut self, handle: BodyHandle, entity: impl Into<Entity>) -> Result<ObjectId> {
        match self.objects.insert(entity) {
            Ok(id) => Ok(id),
            Err(err) => {
                if let Err(release) = self.physics.remove_body(handle) {
                    warn!("releasing unplaced body: {release}");
                }
                Err(err.into())
            }
        }
    }

    /// Remove every object and deregister its body.
    pub fn clear_objects(&mut self) {
        if let Err(err) = self.objects.clear(&mut self.physics) {
            warn!("releasing objects: {err}");
        }
        self.player = None;
    }

    pub fn show_options(&mut self) {
        info!("options menu is not available");
    }

    /// Stop the loop after the current frame.
    pub fn exit_game(&mut self) {
        info!("exit requested");
        self.exit_requested = true;
    }

    fn dispatch(&mut self, action: MenuAction) -> Result<()> {
        debug!("menu action {action:?}");
        match action {
            MenuAction::StartGame => self.start_game()?,
            MenuAction::Options => self.show_options(),
            MenuAction::Exit => self.exit_game(),
        }
        Ok(())
    }

    pub fn handle_input(&mut self) -> Result<()> {
        match self.state {
            GameState::Menu => {
                if self.input.was_key_pressed(LogicalKey::Jump) {
                    self.menu.select_previous();
                } else if self.input.was_key_pressed(LogicalKey::Down) {
                    self.menu.select_next();
                } else if self.input.was_key_pressed(LogicalKey::Return) {
                    if let Some(action) = self.menu.activate_selected().copied() {
                        self.dispatch(action)?;
                    }
                }
            }
            GameState::Playing => {
                let Some(id) = self.player else {
                    return Ok(());
                };
                if let Some(player) = self.objects.player_mut(id) {
                    if let Err(err) = player.handle_input(&self.input, &mut self.physics) {
                        warn!("player input skipped: {err}");
                    }
                }
            }
        }
        Ok(())
    }

    /// Advance physics, then every object in insertion order, then the camera.
    pub fn update(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        let delta_time = self.clock.get_delta_time();

        self.physics.update(delta_time);

        for (id, entity) in self.objects.iter_mut() {
            if let Err(err) = entity.update(delta_time, &mut self.physics) {
                warn!("object {id:?} skipped this frame: {err}");
            }
        }

        if let Some(player) = self.player.and_then(|id| self.objects.player(id)) {
            self.camera.follow(player_focus(player));
        }
    }

    pub fn render(&mut self) {
        self.renderer.clear();

        match self.state {
            GameState::Menu => {
                let view = MenuView {
                    labels: self.menu.labels().collect(),
                    selected: self.menu.selected_index(),
                };
                self.renderer.draw_menu(&view);
            }
            GameState::Playing => {
                for (_, entity) in self.objects.iter() {
                    entity.render(&mut self.renderer, &self.camera);
                }
            }
        }

        self.renderer.present();
    }

    /// One frame without polling: input, update, render, clock.
    pub fn step_frame(&mut self) -> Result<()> {
        self.handle_input()?;
        self.update();
        self.render();
        self.clock.update();
        self.frames += 1;
        Ok(())
    }

    /// Run until the input source reports stop or exit is requested.
    ///
    /// Objects, physics and input are released on the way out, also when
    /// a frame fails.
    pub fn run(&mut self) -> Result<()> {
        info!("entering main loop");
        let result = self.run_loop();
        self.shutdown();
        info!("main loop finished after {} frames", self.frames);
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        while !self.exit_requested && self.input.poll_events() {
            self.step_frame()?;
        }
        Ok(())
    }

    /// Release objects, physics and input. `run` calls this on every exit;
    /// callers driving frames with `step_frame` call it themselves.
    pub fn shutdown(&mut self) {
        self.clear_objects();
        self.physics.cleanup();
        self.input.quit();
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn objects(&self) -> &ObjectArena {
        &self.objects
    }

    /// The controlled player, once gameplay has started.
    pub fn player(&self) -> Option<&Player> {
        self.player.and_then(|id| self.objects.player(id))
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn menu(&self) -> &Menu<MenuAction> {
        &self.menu
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Point the camera centers on.
fn player_focus(player: &Player) -> Vec2 {
    player.object.position + player.object.size * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedInput;
    use crate::physics::PhysicsEngine;
    use crate::render::NullRenderer;
    use crate::time::FixedClock;

    type TestGame = Game<PhysicsEngine, ScriptedInput, FixedClock, NullRenderer>;

    fn game(input: ScriptedInput) -> TestGame {
        let config = GameConfig::default();
        let physics = PhysicsEngine::from_config(&config.physics);
        Game::new(config, physics, input, FixedClock::sixty_fps(), NullRenderer)
    }

    #[test]
    fn menu_lists_the_three_entries() {
        let g = game(ScriptedInput::default());
        let labels: Vec<_> = g.menu().labels().collect();
        assert_eq!(labels, vec!["Start Game", "Options", "Exit"]);
        assert_eq!(g.state(), GameState::Menu);
    }

    #[test]
    fn update_is_a_no_op_in_menu() {
        let mut g = game(ScriptedInput::default());
        g.update();
        assert_eq!(g.physics().body_count(), 0);
        assert!(g.player().is_none());
    }

    #[test]
    fn start_game_spawns_player_first() {
        let mut g = game(ScriptedInput::default());
        g.start_game().unwrap();
        assert_eq!(g.state(), GameState::Playing);
        let (_, first) = g.objects().iter().next().unwrap();
        assert!(first.as_player().is_some());
        assert_eq!(g.objects().len(), 2);

        // Starting again keeps the same objects.
        g.start_game().unwrap();
        assert_eq!(g.objects().len(), 2);
        assert_eq!(g.physics().body_count(), 2);
    }

    #[test]
    fn menu_keys_are_checked_in_priority_order() {
        let input = ScriptedInput::default().hold(&[LogicalKey::Down, LogicalKey::Return], 1);
        let mut g = game(input);
        assert!(g.input_mut().poll_events());
        g.handle_input().unwrap();
        // Down wins over Return; nothing was activated.
        assert_eq!(g.menu().selected_index(), 1);
        assert_eq!(g.state(), GameState::Menu);
    }
}
