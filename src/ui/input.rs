/// Keyboard and mouse state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous steering while a key is held
///   - Edge-triggered actions (interact, shop shortcuts) on initial press
///   - Left clicks and the last known pointer cell for the shop panel
///
/// Terminals without keyboard enhancement never report Release, so a key
/// counts as held until it stops auto-repeating for `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

/// After this duration without a Press/Repeat event, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl+C detection.
    raw_events: Vec<KeyEvent>,

    /// Left-button presses this frame, as terminal (column, row).
    clicks: Vec<(usize, usize)>,

    /// Last cell the pointer was seen over.
    pointer: Option<(usize, usize)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            clicks: Vec::with_capacity(2),
            pointer: None,
        }
    }

    /// Drain all pending terminal events and update input state.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.clicks.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.on_key(key),
                Ok(Event::Mouse(mouse)) => {
                    let cell = (usize::from(mouse.column), usize::from(mouse.row));
                    match mouse.kind {
                        MouseEventKind::Down(MouseButton::Left) => {
                            self.clicks.push(cell);
                            self.pointer = Some(cell);
                        }
                        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                            self.pointer = Some(cell);
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn on_key(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release => {
                self.last_active.remove(&key.code);
            }
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Fresh presses this frame, in arrival order.
    pub fn fresh_presses(&self) -> &[KeyCode] {
        &self.fresh_presses
    }

    pub fn clicks(&self) -> &[(usize, usize)] {
        &self.clicks
    }

    pub fn pointer(&self) -> Option<(usize, usize)> {
        self.pointer
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
