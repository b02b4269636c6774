/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Steer
///   A / Start             →  Interact (start, restart)
///   Select                →  Toggle shop
///   B / X / Y             →  Buy health / shield / speed

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::info;

use crate::config::GamepadConfig;
use crate::domain::shop::ItemKey;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    interact: Vec<Btn>,
    toggle_shop: Vec<Btn>,
    buy_health: Vec<Btn>,
    buy_shield: Vec<Btn>,
    buy_speed: Vec<Btn>,
}

impl ActionMap {
    /// Names that don't parse are skipped; a list with nothing usable
    /// leaves that action unbound.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        ActionMap {
            interact: parse_list(&cfg.interact),
            toggle_shop: parse_list(&cfg.toggle_shop),
            buy_health: parse_list(&cfg.buy_health),
            buy_shield: parse_list(&cfg.buy_shield),
            buy_speed: parse_list(&cfg.buy_speed),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons that went down this frame (edge), indexed by `Btn`.
    just_pressed: [bool; BTN_COUNT],

    // D-pad: up, down, left, right
    dpad: [bool; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(_) => (None, false),
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            just_pressed: [false; BTN_COUNT],
            dpad: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::from_config(cfg),
            connected,
        }
    }

    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => match axis {
                    Axis::LeftStickX => self.stick_x = value,
                    Axis::LeftStickY => self.stick_y = value,
                    _ => {}
                },
                EventType::Connected => {
                    self.connected = true;
                    info!("gamepad_connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                    info!("gamepad_disconnected");
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dpad_slot = match gilrs_btn {
            Button::DPadUp => Some(0),
            Button::DPadDown => Some(1),
            Button::DPadLeft => Some(2),
            Button::DPadRight => Some(3),
            _ => None,
        };
        if let Some(slot) = dpad_slot {
            self.dpad[slot] = held;
            return;
        }

        if !held {
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.just_pressed[btn as usize] = true;
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[b as usize])
    }

    pub fn interact_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.interact)
    }

    pub fn toggle_shop_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.toggle_shop)
    }

    /// Shop item whose buy button went down this frame.
    pub fn buy_pressed(&self) -> Option<ItemKey> {
        let map = &self.action_map;
        if self.any_just_pressed(&map.buy_health) {
            Some(ItemKey::HealthPotion)
        } else if self.any_just_pressed(&map.buy_shield) {
            Some(ItemKey::ShieldDevice)
        } else if self.any_just_pressed(&map.buy_speed) {
            Some(ItemKey::SpeedBooster)
        } else {
            None
        }
    }

    /// Steering as (dx, dy) from d-pad or stick. Stick Y is up-positive.
    pub fn steer(&self) -> (i8, i8) {
        let up = self.dpad[0] || self.stick_y > STICK_DEADZONE;
        let down = self.dpad[1] || self.stick_y < -STICK_DEADZONE;
        let left = self.dpad[2] || self.stick_x < -STICK_DEADZONE;
        let right = self.dpad[3] || self.stick_x > STICK_DEADZONE;
        (i8::from(right) - i8::from(left), i8::from(down) - i8::from(up))
    }

    // ── Internal ──

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.just_pressed = [false; BTN_COUNT];
        self.dpad = [false; 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
