/// Ship shop: score currency, the item catalog, and purchase transactions.
///
/// A purchase is all-or-nothing. If the item is affordable and still in
/// stock, the cost is deducted, the item's effect applied, the stock
/// counter advanced and a confirmation shown. Otherwise nothing changes
/// and nothing is reported.

use crate::config::ShopConfig;

use super::boat::Boat;
use super::vitals::BoatVitals;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ItemKey {
    HealthPotion,
    ShieldDevice,
    SpeedBooster,
}

impl ItemKey {
    /// Catalog order. Also the order of the `1`/`2`/`3` shortcuts.
    pub const ALL: [ItemKey; 3] = [ItemKey::HealthPotion, ItemKey::ShieldDevice, ItemKey::SpeedBooster];

    pub fn icon(self) -> char {
        match self {
            ItemKey::HealthPotion => '♥',
            ItemKey::ShieldDevice => '◈',
            ItemKey::SpeedBooster => '»',
        }
    }

    pub fn from_index(idx: usize) -> Option<ItemKey> {
        Self::ALL.get(idx).copied()
    }
}

/// What buying an item does. Interpreted by [`apply_effect`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ItemEffect {
    RestoreHealth(f32),
    RestoreShield(f32),
    IncreaseSpeed(f32),
}

pub fn apply_effect(effect: ItemEffect, vitals: &mut BoatVitals, boat: &mut Boat) {
    match effect {
        ItemEffect::RestoreHealth(amount) => vitals.restore_health(amount),
        ItemEffect::RestoreShield(amount) => vitals.restore_shield(amount),
        ItemEffect::IncreaseSpeed(amount) => boat.speed += amount,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShopItem {
    pub key: ItemKey,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u32,
    /// `None` = unlimited.
    pub max_purchases: Option<u32>,
    pub purchased: u32,
    pub effect: ItemEffect,
}

impl ShopItem {
    pub fn in_stock(&self) -> bool {
        self.max_purchases.map_or(true, |max| self.purchased < max)
    }

    pub fn is_available(&self, score: u32) -> bool {
        score >= self.cost && self.in_stock()
    }
}

/// The fixed catalog, in display order.
pub fn catalog() -> Vec<ShopItem> {
    vec![
        ShopItem {
            key: ItemKey::HealthPotion,
            name: "Health Potion",
            description: "Restore 20 health",
            cost: 10,
            max_purchases: None,
            purchased: 0,
            effect: ItemEffect::RestoreHealth(20.0),
        },
        ShopItem {
            key: ItemKey::ShieldDevice,
            name: "Shield Device",
            description: "Restore 20 shield",
            cost: 15,
            max_purchases: None,
            purchased: 0,
            effect: ItemEffect::RestoreShield(20.0),
        },
        ShopItem {
            key: ItemKey::SpeedBooster,
            name: "Speed Booster",
            description: "Increase speed by 2",
            cost: 50,
            max_purchases: Some(5),
            purchased: 0,
            effect: ItemEffect::IncreaseSpeed(2.0),
        },
    ]
}

/// Transient confirmation line under the shop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PurchaseFeedback {
    pub message: String,
    /// Frames left on screen. Hidden at 0.
    pub timer: u32,
}

impl PurchaseFeedback {
    pub fn is_visible(&self) -> bool {
        self.timer > 0
    }

    fn show(&mut self, message: String, frames: u32) {
        self.message = message;
        self.timer = frames;
    }

    fn tick(&mut self) {
        self.timer = self.timer.saturating_sub(1);
    }
}

/// A completed transaction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Purchase {
    pub item: ItemKey,
    pub cost: u32,
}

#[derive(Clone, Debug)]
pub struct ShopLedger {
    score: u32,
    /// Everything collected this session, spent or not.
    earned: u32,
    items: Vec<ShopItem>,
    feedback: PurchaseFeedback,
    expanded: bool,
    feedback_frames: u32,
}

impl ShopLedger {
    pub fn new(cfg: &ShopConfig) -> Self {
        ShopLedger {
            score: 0,
            earned: 0,
            items: catalog(),
            feedback: PurchaseFeedback::default(),
            expanded: false,
            feedback_frames: cfg.feedback_frames,
        }
    }

    pub fn score(&self) -> u32 { self.score }
    pub fn earned(&self) -> u32 { self.earned }
    pub fn items(&self) -> &[ShopItem] { &self.items }
    pub fn feedback(&self) -> &PurchaseFeedback { &self.feedback }
    pub fn expanded(&self) -> bool { self.expanded }

    pub fn item(&self, key: ItemKey) -> Option<&ShopItem> {
        self.items.iter().find(|i| i.key == key)
    }

    pub fn is_available(&self, key: ItemKey) -> bool {
        self.item(key).map_or(false, |i| i.is_available(self.score))
    }

    pub fn add_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
        self.earned = self.earned.saturating_add(amount);
    }

    /// Buy `key` if eligible. Ineligible attempts change nothing.
    pub fn attempt_purchase(
        &mut self,
        key: ItemKey,
        vitals: &mut BoatVitals,
        boat: &mut Boat,
    ) -> Option<Purchase> {
        let score = self.score;
        let item = self.items.iter_mut().find(|i| i.key == key)?;
        if !item.is_available(score) {
            return None;
        }

        self.score -= item.cost;
        apply_effect(item.effect, vitals, boat);
        if item.max_purchases.is_some() {
            item.purchased += 1;
        }
        let purchase = Purchase { item: key, cost: item.cost };
        let message = format!("{} purchased!", item.name);
        self.feedback.show(message, self.feedback_frames);
        Some(purchase)
    }

    pub fn tick_feedback(&mut self) {
        self.feedback.tick();
    }

    /// Returns the new state.
    pub fn toggle_expanded(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    /// Back to a fresh session: no score, full stock, panel collapsed.
    pub fn reset(&mut self) {
        self.score = 0;
        self.earned = 0;
        for item in &mut self.items {
            item.purchased = 0;
        }
        self.feedback = PurchaseFeedback::default();
        self.expanded = false;
    }
}
