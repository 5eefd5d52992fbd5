use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;
use serde::{Deserialize, Serialize};

/// Logical keys the game core asks about.
///
/// How these map to physical keys is up to the input backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalKey {
    Jump,
    Down,
    Left,
    Right,
    Return,
}

impl LogicalKey {
    pub const ALL: [LogicalKey; 5] = [
        LogicalKey::Jump,
        LogicalKey::Down,
        LogicalKey::Left,
        LogicalKey::Right,
        LogicalKey::Return,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogicalKey::Jump => "jump",
            LogicalKey::Down => "down",
            LogicalKey::Left => "left",
            LogicalKey::Right => "right",
            LogicalKey::Return => "return",
        }
    }
}

/// The input/event capability consumed by the game core.
pub trait InputSource {
    /// Pump pending events. Returns `false` when the loop should stop.
    fn poll_events(&mut self) -> bool;

    /// Whether the key is held this frame.
    fn is_key_pressed(&self, key: LogicalKey) -> bool;

    /// Whether the key went down this frame. Backends without edge
    /// detection report the held state.
    fn was_key_pressed(&self, key: LogicalKey) -> bool {
        self.is_key_pressed(key)
    }

    /// Release backend resources.
    fn quit(&mut self);
}

/// Name of a physical key as reported by a windowing backend, e.g. `"ArrowUp"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub String);

impl KeyCode {
    pub fn new(name: impl Into<String>) -> Self {
        KeyCode(name.into())
    }
}

/// Tracks physical key state across frames.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame pressed/released flags.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Record a key going down or up.
    pub fn handle_key(&mut self, key: KeyCode, down: bool) {
        if down {
            if !self.keys_down.contains(&key) {
                self.keys_pressed.insert(key.clone());
            }
            self.keys_down.insert(key);
        } else {
            self.keys_down.remove(&key);
            self.keys_released.insert(key);
        }
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: &KeyCode) -> bool {
        self.keys_down.contains(key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: &KeyCode) -> bool {
        self.keys_pressed.contains(key)
    }

    /// Returns true if the key was released this frame.
    pub fn is_key_released(&self, key: &KeyCode) -> bool {
        self.keys_released.contains(key)
    }
}

/// Binds logical keys to one or more physical keys.
#[derive(Clone, Debug, Default)]
pub struct InputMap {
    bindings: HashMap<LogicalKey, Vec<KeyCode>>,
}

impl InputMap {
    /// Create an empty input map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrow keys, Space also jumps, Enter activates.
    pub fn default_bindings() -> Self {
        let mut map = Self::new();
        map.bind(LogicalKey::Jump, KeyCode::new("ArrowUp"));
        map.bind(LogicalKey::Jump, KeyCode::new("Space"));
        map.bind(LogicalKey::Down, KeyCode::new("ArrowDown"));
        map.bind(LogicalKey::Left, KeyCode::new("ArrowLeft"));
        map.bind(LogicalKey::Right, KeyCode::new("ArrowRight"));
        map.bind(LogicalKey::Return, KeyCode::new("Enter"));
        map
    }

    /// Bind a physical key to a logical key.
    pub fn bind(&mut self, key: LogicalKey, code: KeyCode) {
        self.bindings.entry(key).or_default().push(code);
    }

    /// Check if any key bound to `key` is held.
    pub fn key_down(&self, input: &InputState, key: LogicalKey) -> bool {
        self.bindings
            .get(&key)
            .map(|codes| codes.iter().any(|c| input.is_key_down(c)))
            .unwrap_or(false)
    }

    /// Check if any key bound to `key` was pressed this frame.
    pub fn key_pressed(&self, input: &InputState, key: LogicalKey) -> bool {
        self.bindings
            .get(&key)
            .map(|codes| codes.iter().any(|c| input.is_key_pressed(c)))
            .unwrap_or(false)
    }
}

/// Raw event delivered by a windowing backend.
#[derive(Clone, Debug, PartialEq)]
pub enum RawEvent {
    Key { code: KeyCode, down: bool },
    CloseRequested,
}

/// Keyboard backend fed with raw events.
///
/// Events pushed between frames are applied on the next `poll_events`.
#[derive(Debug)]
pub struct KeyboardInput {
    state: InputState,
    map: InputMap,
    queue: VecDeque<RawEvent>,
    close_requested: bool,
    released: bool,
}

impl KeyboardInput {
    pub fn new(map: InputMap) -> Self {
        Self {
            state: InputState::new(),
            map,
            queue: VecDeque::new(),
            close_requested: false,
            released: false,
        }
    }

    pub fn push_event(&mut self, event: RawEvent) {
        self.queue.push_back(event);
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Default for KeyboardInput {
    fn default() -> Self {
        Self::new(InputMap::default_bindings())
    }
}

impl InputSource for KeyboardInput {
    fn poll_events(&mut self) -> bool {
        self.state.begin_frame();
        while let Some(event) = self.queue.pop_front() {
            match event {
                RawEvent::Key { code, down } => self.state.handle_key(code, down),
                RawEvent::CloseRequested => self.close_requested = true,
            }
        }
        !self.close_requested && !self.released
    }

    fn is_key_pressed(&self, key: LogicalKey) -> bool {
        self.map.key_down(&self.state, key)
    }

    fn was_key_pressed(&self, key: LogicalKey) -> bool {
        self.map.key_pressed(&self.state, key)
    }

    fn quit(&mut self) {
        if !self.released {
            debug!("keyboard input released");
        }
        self.released = true;
        self.queue.clear();
    }
}

/// Replays a fixed list of frames, each naming the keys held that frame.
///
/// `poll_events` returns `false` once the script runs out, or after
/// `quit` has been called.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<LogicalKey>>,
    current: Vec<LogicalKey>,
    previous: Vec<LogicalKey>,
    quit_called: bool,
    frames_polled: usize,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = Vec<LogicalKey>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Append `count` frames holding `keys`.
    #[must_use]
    pub fn hold(mut self, keys: &[LogicalKey], count: usize) -> Self {
        for _ in 0..count {
            self.frames.push_back(keys.to_vec());
        }
        self
    }

    /// Append `count` frames with nothing held.
    #[must_use]
    pub fn idle(self, count: usize) -> Self {
        self.hold(&[], count)
    }

    pub fn quit_called(&self) -> bool {
        self.quit_called
    }

    pub fn frames_polled(&self) -> usize {
        self.frames_polled
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self) -> bool {
        if self.quit_called {
            return false;
        }
        match self.frames.pop_front() {
            Some(keys) => {
                self.previous = std::mem::replace(&mut self.current, keys);
                self.frames_polled += 1;
                true
            }
            None => {
                self.previous = std::mem::take(&mut self.current);
                false
            }
        }
    }

    fn is_key_pressed(&self, key: LogicalKey) -> bool {
        self.current.contains(&key)
    }

    fn was_key_pressed(&self, key: LogicalKey) -> bool {
        self.current.contains(&key) && !self.previous.contains(&key)
    }

    fn quit(&mut self) {
        self.quit_called = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, down: bool) -> RawEvent {
        RawEvent::Key {
            code: KeyCode::new(name),
            down,
        }
    }

    #[test]
    fn input_state_tracks_edges() {
        let mut state = InputState::new();
        let a = KeyCode::new("A");
        state.handle_key(a.clone(), true);
        assert!(state.is_key_down(&a));
        assert!(state.is_key_pressed(&a));

        state.begin_frame();
        state.handle_key(a.clone(), true);
        assert!(state.is_key_down(&a));
        assert!(!state.is_key_pressed(&a));

        state.begin_frame();
        state.handle_key(a.clone(), false);
        assert!(!state.is_key_down(&a));
        assert!(state.is_key_released(&a));
    }

    #[test]
    fn default_map_binds_space_and_up_to_jump() {
        let mut kb = KeyboardInput::default();
        kb.push_event(key("Space", true));
        assert!(kb.poll_events());
        assert!(kb.is_key_pressed(LogicalKey::Jump));
        assert!(kb.was_key_pressed(LogicalKey::Jump));

        // Still held on the next frame, but no longer a fresh press.
        assert!(kb.poll_events());
        assert!(kb.is_key_pressed(LogicalKey::Jump));
        assert!(!kb.was_key_pressed(LogicalKey::Jump));

        kb.push_event(key("Space", false));
        kb.push_event(key("ArrowUp", true));
        kb.poll_events();
        assert!(kb.is_key_pressed(LogicalKey::Jump));
        assert!(!kb.is_key_pressed(LogicalKey::Left));
    }

    #[test]
    fn close_request_stops_polling() {
        let mut kb = KeyboardInput::default();
        assert!(kb.poll_events());
        kb.push_event(RawEvent::CloseRequested);
        assert!(!kb.poll_events());
    }

    #[test]
    fn keyboard_quit_stops_polling() {
        let mut kb = KeyboardInput::default();
        kb.quit();
        assert!(kb.is_released());
        assert!(!kb.poll_events());
    }

    #[test]
    fn scripted_input_replays_frames_then_stops() {
        let mut input = ScriptedInput::default()
            .hold(&[LogicalKey::Right], 2)
            .idle(1);

        assert!(input.poll_events());
        assert!(input.is_key_pressed(LogicalKey::Right));
        assert!(input.was_key_pressed(LogicalKey::Right));

        assert!(input.poll_events());
        assert!(input.is_key_pressed(LogicalKey::Right));
        assert!(!input.was_key_pressed(LogicalKey::Right));

        assert!(input.poll_events());
        assert!(!input.is_key_pressed(LogicalKey::Right));

        assert!(!input.poll_events());
        assert_eq!(input.frames_polled(), 3);
    }

    #[test]
    fn scripted_quit_ends_the_script() {
        let mut input = ScriptedInput::default().idle(10);
        input.quit();
        assert!(!input.poll_events());
        assert!(input.quit_called());
        assert_eq!(input.remaining(), 10);
    }
}
