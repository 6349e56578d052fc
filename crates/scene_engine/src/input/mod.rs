//! Input state snapshots
//!
//! Key state is polled, not pushed: the platform layer feeds raw press and
//! release events into an [`InputTracker`], which produces one immutable
//! [`InputSnapshot`] per frame. The snapshot is passed explicitly into
//! `Scene::update` so behaviours never reach for global state.

use std::collections::{BTreeSet, HashMap};

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// E key
    E,
    /// Q key
    Q,
    /// S key
    S,
    /// W key
    W,
    /// Space key
    Space,
    /// Left shift
    LeftShift,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Per-frame state of a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Not held
    #[default]
    Up,
    /// Went down this frame
    Pressed,
    /// Held for more than one frame
    Down,
    /// Went up this frame
    Released,
}

impl ButtonState {
    /// True while the key is held, including the frame it was pressed
    pub fn is_down(self) -> bool {
        matches!(self, Self::Pressed | Self::Down)
    }
}

/// Immutable key states for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    keys: HashMap<KeyCode, ButtonState>,
}

impl InputSnapshot {
    /// Snapshot with every key up
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder pattern: set one key's state
    pub fn with_key(mut self, key: KeyCode, state: ButtonState) -> Self {
        self.set(key, state);
        self
    }

    /// Set one key's state
    pub fn set(&mut self, key: KeyCode, state: ButtonState) {
        if state == ButtonState::Up {
            self.keys.remove(&key);
        } else {
            self.keys.insert(key, state);
        }
    }

    /// Query a key; unknown keys are `Up`
    pub fn key_state(&self, key: KeyCode) -> ButtonState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    /// True while the key is held
    pub fn is_down(&self, key: KeyCode) -> bool {
        self.key_state(key).is_down()
    }

    /// True only on the frame the key went down
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.key_state(key) == ButtonState::Pressed
    }
}

/// Turns raw key events into per-frame snapshots
#[derive(Debug, Default)]
pub struct InputTracker {
    held: BTreeSet<KeyCode>,
    pressed_this_frame: BTreeSet<KeyCode>,
    released_this_frame: BTreeSet<KeyCode>,
    previous: InputSnapshot,
}

impl InputTracker {
    /// Create a new tracker with every key up
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle key input from the platform layer
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.held.insert(key) {
                self.pressed_this_frame.insert(key);
            }
        } else if self.held.remove(&key) {
            self.released_this_frame.insert(key);
        }
    }

    /// Close the frame and produce the snapshot behaviours will see
    ///
    /// A key that went down and up within the same frame reports `Pressed`
    /// this frame and `Released` on the next.
    pub fn next_snapshot(&mut self) -> InputSnapshot {
        let mut snapshot = InputSnapshot::empty();

        for key in &self.held {
            let state = if self.pressed_this_frame.contains(key) {
                ButtonState::Pressed
            } else {
                ButtonState::Down
            };
            snapshot.set(*key, state);
        }

        let mut deferred_release = BTreeSet::new();
        for key in &self.released_this_frame {
            if self.pressed_this_frame.contains(key) {
                snapshot.set(*key, ButtonState::Pressed);
                deferred_release.insert(*key);
            } else if self.previous.is_down(*key) {
                snapshot.set(*key, ButtonState::Released);
            }
        }

        self.pressed_this_frame.clear();
        self.released_this_frame = deferred_release;
        self.previous = snapshot.clone();
        snapshot
    }
}
