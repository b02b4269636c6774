/// Shop panel geometry, computed fresh every frame.
///
/// The renderer draws from a `ShopLayout` and hands it back to the main
/// loop; the next pointer click is hit-tested against that same value.
/// Nothing about button positions is stored on the items themselves.
///
/// All coordinates are terminal cells, origin top-left.
///
/// ```text
///              expanded                     collapsed
///  ┌──────────────────────────────┐            ┌──┐
///  │         ~ SHIP SHOP ~        │            │  │
///  │  ┌────────────────────────┐  │            │  │
///  │  │ item card (5 rows)     │  │           (<) │
///  │  └────────────────────────┘  │            │  │
/// (>)  ...                        │            │  │
///  │    Click items to purchase   │            │  │
///  │      <feedback message>      │            │  │
///  └──────────────────────────────┘            └──┘
/// ```

use crate::domain::shop::{ItemKey, ShopLedger};

pub const EXPANDED_WIDTH: usize = 32;
pub const COLLAPSED_WIDTH: usize = 4;
pub const ITEM_HEIGHT: usize = 5;
pub const ITEM_MARGIN: usize = 1;
const ITEMS_TOP: usize = 3;
const ARROW_SIZE: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub fn contains(&self, px: usize, py: usize) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ItemButton {
    pub key: ItemKey,
    pub rect: Rect,
    /// Affordable and in stock when the layout was computed.
    pub available: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShopHit {
    Toggle,
    Item(ItemKey),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShopLayout {
    pub panel: Rect,
    pub arrow: Rect,
    /// Empty while collapsed.
    pub items: Vec<ItemButton>,
    pub expanded: bool,
    pub footer_row: usize,
    pub message_row: usize,
}

impl ShopLayout {
    pub fn compute(ledger: &ShopLedger, screen_w: usize, screen_h: usize) -> Self {
        let expanded = ledger.expanded();
        let width = if expanded { EXPANDED_WIDTH } else { COLLAPSED_WIDTH }.min(screen_w);
        let panel = Rect { x: screen_w - width, y: 0, w: width, h: screen_h };

        let mid = screen_h / 2;
        let arrow_x = if expanded {
            panel.x
        } else {
            panel.x + width.saturating_sub(ARROW_SIZE) / 2
        };
        let arrow = Rect {
            x: arrow_x,
            y: mid.saturating_sub(ARROW_SIZE / 2),
            w: ARROW_SIZE.min(width),
            h: ARROW_SIZE.min(screen_h),
        };

        let footer_row = screen_h.saturating_sub(3);
        let message_row = screen_h.saturating_sub(2);

        let mut items = Vec::new();
        if expanded {
            for (i, item) in ledger.items().iter().enumerate() {
                let y = ITEMS_TOP + i * (ITEM_HEIGHT + ITEM_MARGIN);
                if y + ITEM_HEIGHT > footer_row {
                    break; // terminal too short; remaining cards are not shown
                }
                items.push(ItemButton {
                    key: item.key,
                    rect: Rect {
                        x: panel.x + ARROW_SIZE,
                        y,
                        w: width.saturating_sub(ARROW_SIZE + 1),
                        h: ITEM_HEIGHT,
                    },
                    available: ledger.is_available(item.key),
                });
            }
        }

        ShopLayout { panel, arrow, items, expanded, footer_row, message_row }
    }

    /// What a click at (x, y) lands on. The arrow wins over cards;
    /// unavailable cards are not clickable.
    pub fn hit(&self, x: usize, y: usize) -> Option<ShopHit> {
        if self.arrow.contains(x, y) {
            return Some(ShopHit::Toggle);
        }
        self.items.iter()
            .find(|b| b.available && b.rect.contains(x, y))
            .map(|b| ShopHit::Item(b.key))
    }

    /// Card under the pointer, available or not.
    pub fn hovered(&self, x: usize, y: usize) -> Option<ItemKey> {
        self.items.iter().find(|b| b.rect.contains(x, y)).map(|b| b.key)
    }

    /// Columns left of the panel, free for the chart view.
    pub fn view_width(&self) -> usize {
        self.panel.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopConfig;

    fn ledger(score: u32, expanded: bool) -> ShopLedger {
        let mut l = ShopLedger::new(&ShopConfig::default());
        l.add_score(score);
        if expanded {
            l.toggle_expanded();
        }
        l
    }

    #[test]
    fn collapsed_strip_has_arrow_only() {
        let layout = ShopLayout::compute(&ledger(100, false), 100, 30);
        assert_eq!(layout.panel, Rect { x: 96, y: 0, w: 4, h: 30 });
        assert!(layout.items.is_empty());
        assert_eq!(layout.hit(layout.arrow.x + 1, 15), Some(ShopHit::Toggle));
        assert_eq!(layout.view_width(), 96);
    }

    #[test]
    fn expanded_panel_stacks_cards() {
        let layout = ShopLayout::compute(&ledger(100, true), 100, 30);
        assert_eq!(layout.panel.x, 68);
        assert_eq!(layout.items.len(), 3);
        let ys: Vec<_> = layout.items.iter().map(|b| b.rect.y).collect();
        assert_eq!(ys, vec![3, 9, 15]);
        for b in &layout.items {
            assert!(!b.rect.contains(layout.arrow.x, layout.arrow.y + 1));
            assert!(b.rect.x + b.rect.w <= 100);
        }
    }

    #[test]
    fn click_on_available_card_buys() {
        let layout = ShopLayout::compute(&ledger(12, true), 100, 30);
        let card = layout.items[0].rect;
        assert_eq!(layout.hit(card.x + 2, card.y + 1), Some(ShopHit::Item(ItemKey::HealthPotion)));
    }

    #[test]
    fn unavailable_card_is_hoverable_not_clickable() {
        let layout = ShopLayout::compute(&ledger(12, true), 100, 30);
        let card = layout.items[2].rect; // speed booster, 50
        assert!(!layout.items[2].available);
        assert_eq!(layout.hit(card.x + 2, card.y + 1), None);
        assert_eq!(layout.hovered(card.x + 2, card.y + 1), Some(ItemKey::SpeedBooster));
    }

    #[test]
    fn sold_out_card_is_not_clickable() {
        use crate::config::BoatStats;
        use crate::domain::boat::Boat;
        use crate::domain::vitals::BoatVitals;

        let mut l = ledger(500, true);
        let mut vitals = BoatVitals::new(&BoatStats::default());
        let mut boat = Boat::at_cell(0, 0, 3.0);
        for _ in 0..5 {
            assert!(l.attempt_purchase(ItemKey::SpeedBooster, &mut vitals, &mut boat).is_some());
        }
        let layout = ShopLayout::compute(&l, 100, 30);
        let card = layout.items[2].rect;
        assert!(!layout.items[2].available);
        assert!(layout.items[0].available);
        assert_eq!(layout.hit(card.x + 2, card.y + 1), None);
    }

    #[test]
    fn clicks_outside_hit_nothing() {
        let layout = ShopLayout::compute(&ledger(500, true), 100, 30);
        assert_eq!(layout.hit(10, 10), None);
        assert_eq!(layout.hit(80, 8), None); // margin row between cards
    }

    #[test]
    fn short_terminal_drops_cards_that_do_not_fit() {
        let layout = ShopLayout::compute(&ledger(500, true), 100, 16);
        assert_eq!(layout.items.len(), 1);
    }

    #[test]
    fn narrow_terminal_does_not_underflow() {
        let layout = ShopLayout::compute(&ledger(0, true), 10, 5);
        assert_eq!(layout.panel.x, 0);
        assert_eq!(layout.panel.w, 10);
    }
}
