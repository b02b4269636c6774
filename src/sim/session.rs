/// GameSession: everything a running game owns, in one place.
///
/// The tick loop and the input handlers receive `&mut GameSession`;
/// the renderer receives `&GameSession` and never mutates it. A restart
/// is `initialize()` on the same value, so there is nothing global to
/// forget to reset.
///
/// ## Camera
///
/// `camera` is the chart coordinate of the top-left visible cell.
/// `step::advance` sizes it to the view the renderer reports and
/// recentres on the boat at the end of every Playing tick. Restart puts it
/// back at the origin until the next tick.

use tracing::debug;

use crate::config::{BoatStats, GameConfig};
use crate::domain::boat::{Boat, Heading};
use crate::domain::effects::EffectState;
use crate::domain::shop::ShopLedger;
use crate::domain::vitals::{BoatVitals, DamageImmunity, DamageOutcome, DamageSource};

use super::chart::Chart;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GamePhase {
    Start,
    Playing,
    Death,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Camera {
    pub x: i32,
    pub y: i32,
    pub view_w: usize,
    pub view_h: usize,
}

impl Camera {
    /// Centre on a chart cell, clamped so the view stays on the chart.
    /// Charts smaller than the view are centred instead.
    pub fn center_on(&mut self, cx: usize, cy: usize, chart_w: usize, chart_h: usize) {
        self.x = center_axis(cx, self.view_w, chart_w);
        self.y = center_axis(cy, self.view_h, chart_h);
    }

    /// Chart coordinate shown at viewport (vx, vy). May be off-chart.
    pub fn view_to_chart(&self, vx: usize, vy: usize) -> (i32, i32) {
        (self.x + vx as i32, self.y + vy as i32)
    }
}

fn center_axis(target: usize, view: usize, world: usize) -> i32 {
    let (target, view, world) = (target as i32, view as i32, world as i32);
    if view == 0 {
        return 0;
    }
    if world <= view {
        return -((view - world) / 2);
    }
    (target - view / 2).clamp(0, world - view)
}

#[derive(Clone, Debug)]
pub struct GameSession {
    pub phase: GamePhase,
    /// Set by the first `initialize()`. Start → Playing waits for it.
    pub initialized: bool,
    pub stats: BoatStats,

    pub vitals: BoatVitals,
    pub immunity: DamageImmunity,
    pub effects: EffectState,
    pub ledger: ShopLedger,
    pub passive_counter: u32,

    pub boat: Boat,
    pub chart: Chart,
    pub camera: Camera,

    /// Playing ticks since the last (re)start.
    pub tick: u64,
}

impl GameSession {
    pub fn new(config: &GameConfig, chart: Chart) -> Self {
        let (sx, sy) = chart.spawn();
        GameSession {
            phase: GamePhase::Start,
            initialized: false,
            stats: config.boat.clone(),
            vitals: BoatVitals::new(&config.boat),
            immunity: DamageImmunity::default(),
            effects: EffectState::default(),
            ledger: ShopLedger::new(&config.shop),
            passive_counter: 0,
            boat: Boat::at_cell(sx, sy, config.boat.default_speed),
            chart,
            camera: Camera::default(),
            tick: 0,
        }
    }

    /// Reset all gameplay state to its starting values.
    ///
    /// The boat is only moved back to spawn (and its speed restored) on
    /// re-initialization; the first call leaves it where `new` put it.
    pub fn initialize(&mut self) {
        let restart = self.initialized;
        self.vitals = BoatVitals::new(&self.stats);
        self.passive_counter = 0;
        self.immunity = DamageImmunity::default();
        self.effects = EffectState::default();
        self.chart.reset();

        if restart {
            let (sx, sy) = self.chart.spawn();
            let (wx, wy) = self.chart.nearest_water(sx, sy).unwrap_or((sx, sy));
            self.boat = Boat::at_cell(wx, wy, self.stats.default_speed);
        }
        self.boat.heading = Heading::North;

        self.camera.x = 0;
        self.camera.y = 0;

        self.ledger.reset();
        self.tick = 0;
        self.initialized = true;
        debug!(restart, "session_initialized");
    }

    /// Damage model entry point: shield-first absorption on the vitals,
    /// then the matching visual effect.
    pub fn apply_damage(&mut self, amount: f32, source: DamageSource) -> Option<DamageOutcome> {
        let outcome = self.vitals.apply_damage(amount)?;
        self.effects.trigger(source);
        Some(outcome)
    }

    pub fn score(&self) -> u32 {
        self.ledger.score()
    }

    /// Size the camera to a `(columns, rows)` view and recentre on the boat.
    pub fn follow_boat(&mut self, view: (usize, usize)) {
        (self.camera.view_w, self.camera.view_h) = view;
        let (cx, cy) = self.boat.cell();
        let (w, h) = (self.chart.width(), self.chart.height());
        self.camera.center_on(cx, cy, w, h);
    }
}
