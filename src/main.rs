/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::boat::Helm;
use domain::shop::ItemKey;
use sim::chart::Chart;
use sim::event::GameEvent;
use sim::layout::ShopLayout;
use sim::session::{GamePhase, GameSession};
use sim::step;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{Sfx, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(2);

fn main() {
    let (config, config_err) = GameConfig::load();
    let logging = init_tracing(&config);
    if let Some(e) = &config_err {
        warn!(error = %e, "config unusable; using defaults");
    }

    let chart = load_chart(&config);
    let mut session = GameSession::new(&config, chart);
    session.initialize();
    info!(
        width = session.chart.width(),
        height = session.chart.height(),
        coins = session.chart.coins_remaining(),
        tick_rate_ms = config.tick_rate_ms,
        "corsair_ready"
    );

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }
    if !logging {
        if let Some(e) = config_err {
            eprintln!("Config ignored: {e}");
        }
    }

    println!();
    println!("Thanks for sailing Corsair!");
    println!("Final Score: {}", session.ledger.earned());
}

/// Log to a file: the terminal belongs to the renderer. `RUST_LOG` wins
/// over the configured filter. Returns false if the file can't be opened.
fn init_tracing(config: &GameConfig) -> bool {
    let file = match File::create(&config.log_file) {
        Ok(f) => f,
        Err(_) => return false,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

fn load_chart(config: &GameConfig) -> Chart {
    let Some(path) = &config.chart else {
        return Chart::embedded();
    };
    match Chart::load(path) {
        Ok(chart) => {
            info!(path = %path.display(), "chart_loaded");
            chart
        }
        Err(e) => {
            warn!(error = %e, "custom chart unusable; sailing the embedded chart");
            Chart::embedded()
        }
    }
}

fn game_loop(
    session: &mut GameSession,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut last_tick = Instant::now();
    let mut frame_rate = FrameRate::new();
    info!(gamepad = gp.connected, "input_ready");

    // Clicks are hit-tested against the last frame actually drawn.
    let mut layout = renderer.render(session, None, 0.0)?;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.was_pressed(KeyCode::Esc) {
            info!(phase = ?session.phase, score = session.score(), "quit");
            break;
        }

        let mut events = handle_input(session, &kb, &gp, &layout);

        if last_tick.elapsed() >= tick_rate {
            let view = renderer.chart_view(&session.ledger);
            events.extend(step::advance(session, detect_helm(&kb, &gp), view));
            frame_rate.frame();
            layout = renderer.render(session, kb.pointer(), frame_rate.rate())?;
            last_tick = Instant::now();
        }

        process_sound_events(sound, &events);
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Between-tick input: clicks, shop shortcuts, and interaction presses.
fn handle_input(
    session: &mut GameSession,
    kb: &InputState,
    gp: &GamepadState,
    layout: &ShopLayout,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    for &(x, y) in kb.clicks() {
        events.extend(step::on_pointer_click(session, layout, x, y));
    }

    if session.phase == GamePhase::Playing {
        if kb.any_pressed(KEYS_SHOP) || gp.toggle_shop_pressed() {
            events.extend(step::toggle_shop(session));
        }
        if let Some(key) = detect_buy(kb).or_else(|| gp.buy_pressed()) {
            events.extend(step::on_purchase_attempt(session, key));
        }
    } else if !kb.fresh_presses().is_empty() || gp.interact_pressed() {
        events.extend(step::on_interaction(session));
    }

    events
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for cue in events.iter().filter_map(Sfx::for_event) {
        sfx.play(cue);
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_SHOP: &[KeyCode] = &[KeyCode::Tab];
const KEYS_BUY: [KeyCode; 3] = [KeyCode::Char('1'), KeyCode::Char('2'), KeyCode::Char('3')];

fn detect_buy(kb: &InputState) -> Option<ItemKey> {
    KEYS_BUY.iter()
        .position(|&k| kb.was_pressed(k))
        .and_then(ItemKey::from_index)
}

/// Keyboard steering wins; the pad is used when no key is held.
fn detect_helm(kb: &InputState, gp: &GamepadState) -> Helm {
    let axis = |neg: &[KeyCode], pos: &[KeyCode]| i8::from(kb.any_held(pos)) - i8::from(kb.any_held(neg));
    let keys = Helm::new(axis(KEYS_LEFT, KEYS_RIGHT), axis(KEYS_UP, KEYS_DOWN));
    if !keys.is_idle() {
        return keys;
    }
    let (dx, dy) = gp.steer();
    Helm::new(dx, dy)
}

/// Simulated frames per second, measured over one-second windows.
struct FrameRate {
    window_start: Instant,
    frames: u32,
    rate: f32,
}

impl FrameRate {
    fn new() -> Self {
        FrameRate { window_start: Instant::now(), frames: 0, rate: 0.0 }
    }

    fn frame(&mut self) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.rate = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }

    fn rate(&self) -> f32 {
        self.rate
    }
}
