/// Events emitted by ticks and input handlers.
/// The presentation layer consumes these for sound; the main loop logs them.

use crate::domain::shop::ItemKey;
use crate::domain::vitals::{DamageOutcome, DamageSource};

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Started,
    Restarted,
    Damaged { source: DamageSource, outcome: DamageOutcome },
    CoinCollected { value: u32 },
    Purchased { item: ItemKey, cost: u32 },
    ShopToggled { expanded: bool },
    Died { final_score: u32 },
}
