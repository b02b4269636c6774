/// The step function and the input handlers: every way the session changes.
///
/// Per-tick order while Playing (`advance`):
///   1. Helm: move the boat, report land/rock contact, pick up coins
///   2. Passive damage accrual
///   3. Effect decay (tint, shake)
///   4. Purchase feedback countdown
///   5. Death check (last, so a fatal passive tick ends the game this tick)
///   6. Camera recentres on the boat for the renderer's view
///
/// Input handlers (`on_interaction`, `on_purchase_attempt`,
/// `on_pointer_click`) run between ticks on the same thread, so the frame
/// that renders after them sees exactly the events processed before it.

use tracing::{debug, info, trace};

use crate::domain::boat::Helm;
use crate::domain::shop::ItemKey;
use crate::domain::vitals::{CollisionSource, DamageSource};
use super::chart::Contact;
use super::event::GameEvent;
use super::layout::{ShopHit, ShopLayout};
use super::session::{GamePhase, GameSession};

// ══════════════════════════════════════════════════════════════
// Tick
// ══════════════════════════════════════════════════════════════

/// One simulated frame: helm motion, collaborator events, the core tick,
/// then the camera. `view` is the chart view in (columns, rows).
pub fn advance(session: &mut GameSession, helm: Helm, view: (usize, usize)) -> Vec<GameEvent> {
    if session.phase != GamePhase::Playing { return vec![]; }

    let mut events = Vec::new();
    let contact = sail(session, helm, &mut events);
    events.extend(on_collision(session, CollisionSource::Land, contact.land));
    events.extend(on_collision(session, CollisionSource::Rock, contact.rock));
    events.extend(tick(session));
    session.follow_boat(view);
    events
}

/// Core per-frame update. No-op outside Playing.
pub fn tick(session: &mut GameSession) -> Vec<GameEvent> {
    if session.phase != GamePhase::Playing { return vec![]; }

    let mut events = Vec::new();
    session.tick += 1;

    session.passive_counter += 1;
    if session.passive_counter >= session.stats.passive_damage_interval {
        session.passive_counter = 0;
        let amount = session.stats.passive_damage;
        if let Some(outcome) = session.apply_damage(amount, DamageSource::Passive) {
            events.push(GameEvent::Damaged { source: DamageSource::Passive, outcome });
        }
    }

    session.effects.tick();
    session.ledger.tick_feedback();

    if session.vitals.is_sunk() {
        session.phase = GamePhase::Death;
        let final_score = session.ledger.earned();
        info!(final_score, ticks = session.tick, "boat_sunk");
        events.push(GameEvent::Died { final_score });
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Helm (collaborator: boat + chart)
// ══════════════════════════════════════════════════════════════

/// Move the boat one tick. Land blocks the hull and counts as contact
/// while the helm pushes into it; rock is passable and counts as contact
/// while the hull sits on it.
fn sail(session: &mut GameSession, helm: Helm, events: &mut Vec<GameEvent>) -> Contact {
    let mut contact = Contact::default();

    if let Some(heading) = helm.heading() {
        session.boat.heading = heading;
        let (nx, ny) = session.boat.proposed(helm);
        if session.chart.tile_at_pos(nx, ny).is_navigable() {
            session.boat.place(nx, ny);
        } else {
            contact.land = true;
        }
    }

    let (cx, cy) = session.boat.cell();
    contact.rock = session.chart.tile_at(cx, cy).is_rock();

    if session.chart.take_coin(cx, cy) {
        let value = session.stats.coin_value;
        add_score(session, value);
        trace!(x = cx, y = cy, value, "coin_collected");
        events.push(GameEvent::CoinCollected { value });
    }

    contact
}

// ══════════════════════════════════════════════════════════════
// External events
// ══════════════════════════════════════════════════════════════

/// Per-frame overlap report. Damages once per transition into overlap.
pub fn on_collision(session: &mut GameSession, source: CollisionSource, overlapping: bool) -> Vec<GameEvent> {
    if session.phase != GamePhase::Playing { return vec![]; }
    if !session.immunity.register(source, overlapping) { return vec![]; }

    let amount = match source {
        CollisionSource::Land => session.stats.land_damage,
        CollisionSource::Rock => session.stats.rock_damage,
    };
    let source = DamageSource::from(source);
    match session.apply_damage(amount, source) {
        Some(outcome) => {
            debug!(
                source = source.label(),
                absorbed = outcome.absorbed,
                blocked = outcome.blocked,
                dealt = outcome.dealt,
                health = session.vitals.health(),
                shield = session.vitals.shield(),
                "damage"
            );
            vec![GameEvent::Damaged { source, outcome }]
        }
        None => vec![],
    }
}

/// Collectible pickup.
pub fn add_score(session: &mut GameSession, amount: u32) {
    session.ledger.add_score(amount);
}

/// Any key press or click. Drives Start → Playing and Death → Playing.
pub fn on_interaction(session: &mut GameSession) -> Vec<GameEvent> {
    match session.phase {
        GamePhase::Start if session.initialized => {
            session.phase = GamePhase::Playing;
            info!("voyage_started");
            vec![GameEvent::Started]
        }
        GamePhase::Start | GamePhase::Playing => vec![],
        GamePhase::Death => {
            session.initialize();
            session.phase = GamePhase::Playing;
            info!("voyage_restarted");
            vec![GameEvent::Restarted]
        }
    }
}

/// Buy an item. The caller has already decided which item was meant.
pub fn on_purchase_attempt(session: &mut GameSession, key: ItemKey) -> Vec<GameEvent> {
    if session.phase != GamePhase::Playing { return vec![]; }

    let GameSession { ledger, vitals, boat, .. } = session;
    match ledger.attempt_purchase(key, vitals, boat) {
        Some(p) => {
            info!(item = ?p.item, cost = p.cost, score = ledger.score(), "purchase");
            vec![GameEvent::Purchased { item: p.item, cost: p.cost }]
        }
        None => vec![],
    }
}

/// Flip the shop panel between strip and full view.
pub fn toggle_shop(session: &mut GameSession) -> Vec<GameEvent> {
    if session.phase != GamePhase::Playing { return vec![]; }
    let expanded = session.ledger.toggle_expanded();
    vec![GameEvent::ShopToggled { expanded }]
}

/// Left click at terminal cell (x, y), tested against the layout the last
/// frame was drawn with. Outside Playing any click is an interaction.
pub fn on_pointer_click(session: &mut GameSession, layout: &ShopLayout, x: usize, y: usize) -> Vec<GameEvent> {
    if session.phase != GamePhase::Playing {
        return on_interaction(session);
    }
    match layout.hit(x, y) {
        Some(ShopHit::Toggle) => toggle_shop(session),
        Some(ShopHit::Item(key)) if layout.expanded => on_purchase_attempt(session, key),
        _ => vec![],
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
