/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Every cell carries explicit RGB colours so post passes (damage
/// vignette, death fade) can blend them.
///
/// Screen layout while sailing:
///
/// ```text
///   row 0      Health bar                          │ shop
///   row 1      Shield bar                          │ panel
///   row 2      score / grid / speed / fps          │ (right
///   row 3..    chart viewport (2 columns per cell) │  edge)
///   last row   key help                            │
/// ```

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::effects::MAX_TINT_ALPHA;
use crate::domain::shop::ShopLedger;
use crate::domain::tile::Tile;
use crate::sim::layout::{Rect, ShopLayout};
use crate::sim::session::{GamePhase, GameSession};

type Rgb = (u8, u8, u8);

// ── Palette ──

const BASE_BG: Rgb = (12, 16, 30);
const BLACK: Rgb = (0, 0, 0);
const WHITE: Rgb = (235, 235, 235);
const DIM: Rgb = (110, 110, 125);
const GOLD: Rgb = (255, 205, 60);
const FEEDBACK_GREEN: Rgb = (90, 230, 110);
const DAMAGE_RED: Rgb = (200, 20, 20);

const SEA: Rgb = (14, 48, 96);
const SEA_FOAM: Rgb = (70, 120, 180);
const LAND_FG: Rgb = (145, 185, 90);
const LAND_BG: Rgb = (70, 110, 45);
const ROCK_FG: Rgb = (175, 170, 160);
const BOAT_FG: Rgb = (250, 240, 210);

const HUD_BG: Rgb = (20, 20, 48);
const HEALTH_FILL: Rgb = (210, 45, 45);
const SHIELD_FILL: Rgb = (60, 110, 230);
const BAR_EMPTY: Rgb = (50, 40, 55);

const PANEL_BG: Rgb = (28, 26, 44);
const CARD_BG: Rgb = (40, 38, 62);
const CARD_HOVER_BG: Rgb = (66, 60, 100);
const CARD_BORDER: Rgb = (150, 140, 190);
const CARD_HOVER_BORDER: Rgb = (255, 225, 120);

// ── Geometry ──

/// Terminal columns per chart cell.
const CELL_W: usize = 2;
const HUD_ROWS: usize = 3;
const MAP_ROW: usize = HUD_ROWS;
const BAR_WIDTH: usize = 20;
/// Vignette reach into the view, in rows (columns are scaled by CELL_W).
const VIGNETTE_DEPTH: f32 = 4.0;
/// Strongest red mix at the very edge.
const VIGNETTE_MAX_MIX: f32 = 0.75;
/// Chart cells of jitter per unit of shake.
const SHAKE_CELLS_PER_UNIT: f32 = 0.5;
/// Death fade-in per frame, out of 255.
const DEATH_FADE_STEP: u8 = 8;
/// How dark the frozen scene gets behind the death text.
const DEATH_DARKEN: f32 = 0.8;

#[inline]
fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

/// Linear blend from `a` (t = 0) to `b` (t = 1).
fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let ch = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
    (ch(a.0, b.0), ch(a.1, b.1), ch(a.2, b.2))
}

/// Viewport jitter for a shake magnitude. Varies per tick, bounded by the
/// magnitude, and exactly zero once shake has settled.
fn shake_offset(amount: f32, tick: u64) -> (i32, i32) {
    let reach = (amount * SHAKE_CELLS_PER_UNIT).round() as i32;
    if reach <= 0 {
        return (0, 0);
    }
    let h = tick.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let span = (2 * reach + 1) as u64;
    let dx = ((h >> 40) % span) as i32 - reach;
    let dy = (((h >> 20) & 0xF_FFFF) % span) as i32 - reach;
    (dx, dy)
}

/// Red weight for a cell of a `w`×`h` region: 1 on the border, falling
/// to 0 at `VIGNETTE_DEPTH` rows (or the equivalent columns) inward.
fn vignette_weight(x: usize, y: usize, w: usize, h: usize) -> f32 {
    if w == 0 || h == 0 {
        return 0.0;
    }
    let from_side = x.min(w - 1 - x) as f32 / CELL_W as f32;
    let from_top = y.min(h - 1 - y) as f32;
    let d = from_side.min(from_top);
    (1.0 - d / VIGNETTE_DEPTH).max(0.0)
}

/// Filled cells of a `width`-cell bar for `value / max`.
fn bar_fill(value: f32, max: f32, width: usize) -> usize {
    if max <= 0.0 {
        return 0;
    }
    ((value / max).clamp(0.0, 1.0) * width as f32).round() as usize
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Rgb,
    bg: Rgb,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: WHITE, bg: BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '\0', fg: (255, 0, 255), bg: (255, 0, 255) };

    fn new(ch: char, fg: Rgb, bg: Rgb) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y), clipped at `limit` columns.
    fn put_str_clipped(&mut self, x: usize, y: usize, s: &str, fg: Rgb, bg: Rgb, limit: usize) {
        for (i, ch) in s.chars().enumerate() {
            let cx = x + i;
            if cx >= limit.min(self.width) { break; }
            self.set(cx, y, Cell::new(ch, fg, bg));
        }
    }

    /// Centre a string between columns `x0` and `x0 + span`.
    fn put_centered(&mut self, x0: usize, span: usize, y: usize, s: &str, fg: Rgb, bg: Rgb) {
        let len = s.chars().count();
        let x = x0 + span.saturating_sub(len) / 2;
        self.put_str_clipped(x, y, s, fg, bg, x0 + span);
    }

    fn fill(&mut self, r: Rect, bg: Rgb) {
        for y in r.y..r.y + r.h {
            for x in r.x..r.x + r.w {
                self.set(x, y, Cell::new(' ', WHITE, bg));
            }
        }
    }

    fn draw_box(&mut self, r: Rect, fg: Rgb, bg: Rgb) {
        if r.w < 2 || r.h < 2 {
            return;
        }
        let (x1, y1) = (r.x + r.w - 1, r.y + r.h - 1);
        for x in r.x + 1..x1 {
            self.set(x, r.y, Cell::new('─', fg, bg));
            self.set(x, y1, Cell::new('─', fg, bg));
        }
        for y in r.y + 1..y1 {
            self.set(r.x, y, Cell::new('│', fg, bg));
            self.set(x1, y, Cell::new('│', fg, bg));
        }
        self.set(r.x, r.y, Cell::new('┌', fg, bg));
        self.set(x1, r.y, Cell::new('┐', fg, bg));
        self.set(r.x, y1, Cell::new('└', fg, bg));
        self.set(x1, y1, Cell::new('┘', fg, bg));
    }

    /// Rewrite every cell's colours inside `r`.
    fn recolor(&mut self, r: Rect, mut f: impl FnMut(usize, usize, Cell) -> Cell) {
        for y in r.y..(r.y + r.h).min(self.height) {
            for x in r.x..(r.x + r.w).min(self.width) {
                let cell = self.cells[y * self.width + x];
                self.cells[y * self.width + x] = f(x - r.x, y - r.y, cell);
            }
        }
    }

    fn area(&self) -> Rect {
        Rect { x: 0, y: 0, w: self.width, h: self.height }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<GamePhase>,
    /// Frames drawn, for blink and wave animation.
    frame: u64,
    /// Death screen opacity, 0..=255.
    death_alpha: u8,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            frame: 0,
            death_alpha: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(rgb(BASE_BG)),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Chart view in (columns, rows) for the current terminal size: the
    /// rows below the HUD, the columns left of the shop panel.
    pub fn chart_view(&self, ledger: &ShopLedger) -> (usize, usize) {
        let (w, h) = (self.front.width, self.front.height);
        let layout = ShopLayout::compute(ledger, w, h);
        (layout.view_width() / CELL_W, h.saturating_sub(MAP_ROW + 1))
    }

    /// Draw one frame and return the shop layout it was drawn with.
    pub fn render(
        &mut self,
        session: &GameSession,
        pointer: Option<(usize, usize)>,
        fps: f32,
    ) -> io::Result<ShopLayout> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(rgb(BASE_BG)), Clear(ClearType::All))?;
        }

        // Phase change → clear for clean transition
        if self.last_phase != Some(session.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(rgb(BASE_BG)), Clear(ClearType::All))?;
            self.last_phase = Some(session.phase);
        }

        let layout = self.compose(session, pointer, fps);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(layout)
    }

    /// Build the front buffer for the session's phase.
    fn compose(&mut self, session: &GameSession, pointer: Option<(usize, usize)>, fps: f32) -> ShopLayout {
        self.frame = self.frame.wrapping_add(1);
        if session.phase == GamePhase::Death {
            self.death_alpha = self.death_alpha.saturating_add(DEATH_FADE_STEP);
        } else {
            self.death_alpha = 0;
        }

        let (w, h) = (self.front.width, self.front.height);
        let layout = ShopLayout::compute(&session.ledger, w, h);

        self.front.clear();
        match session.phase {
            GamePhase::Start => self.compose_start(),
            GamePhase::Playing => self.compose_voyage(session, &layout, pointer, fps, true),
            GamePhase::Death => {
                self.compose_voyage(session, &layout, None, fps, false);
                self.compose_death(session);
            }
        }
        layout
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = WHITE;
        let mut last_bg = BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colours, never ResetColor: the terminal's own
        // default may differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(rgb(WHITE)), SetBackgroundColor(rgb(BASE_BG)))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(rgb(cell.fg)))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(rgb(cell.bg)))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ═══════════════════════════════════════════════════════════
    // Start screen
    // ═══════════════════════════════════════════════════════════

    fn compose_start(&mut self) {
        let (w, h) = (self.front.width, self.front.height);
        let title = [
            r"  ___  ___  ___  ___   _   ___  ___ ",
            r" / __|/ _ \| _ \/ __| /_\ |_ _|| _ \",
            r"| (__| (_) |   /\__ \/ _ \ | | |   /",
            r" \___|\___/|_|_\|___/_/ \_\___||_|_\",
        ];
        let top = (h / 2).saturating_sub(8);
        for (i, line) in title.iter().enumerate() {
            self.front.put_centered(0, w, top + i, line, GOLD, BASE_BG);
        }
        self.front.put_centered(0, w, top + 5, "~~ sail, plunder, survive ~~", SEA_FOAM, BASE_BG);

        let controls = [
            "WASD / Arrows   steer the ship",
            "Tab             open or close the shop",
            "1 2 3 / click   buy from the shop",
            "Esc             weigh anchor (quit)",
            "",
            "Collect $ for gold. Land and rocks crack",
            "the hull; the sea wears it down slowly.",
        ];
        for (i, line) in controls.iter().enumerate() {
            self.front.put_centered(0, w, top + 8 + i, line, WHITE, BASE_BG);
        }

        if (self.frame / 20) % 2 == 0 {
            self.front.put_centered(0, w, top + 17, "▸▸▸ PRESS ANY KEY TO SET SAIL ◂◂◂", FEEDBACK_GREEN, BASE_BG);
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Voyage: chart, HUD, shop
    // ═══════════════════════════════════════════════════════════

    fn compose_voyage(
        &mut self,
        s: &GameSession,
        layout: &ShopLayout,
        pointer: Option<(usize, usize)>,
        fps: f32,
        shake: bool,
    ) {
        let settled = s.effects.is_idle();
        self.compose_chart(s, shake && !settled);
        if !settled {
            self.compose_tint(s);
        }
        self.compose_hud(s, layout.view_width(), fps);
        self.compose_shop(s, layout, pointer);

        let help_row = self.front.height.saturating_sub(1);
        self.front.put_str_clipped(
            0, help_row,
            " WASD/Arrows: steer  Tab: shop  1/2/3: buy  Esc: quit",
            DIM, BASE_BG, layout.view_width(),
        );
    }

    fn compose_chart(&mut self, s: &GameSession, shake: bool) {
        let (ox, oy) = if shake { shake_offset(s.effects.shake_amount, s.tick) } else { (0, 0) };
        let (bx, by) = s.boat.cell();
        let wave = (self.frame / 30) as usize;

        for vy in 0..s.camera.view_h {
            let row = MAP_ROW + vy;
            for vx in 0..s.camera.view_w {
                let (cx, cy) = s.camera.view_to_chart(vx, vy);
                let (cx, cy) = (cx + ox, cy + oy);
                let col = vx * CELL_W;

                if cx < 0 || cy < 0 || cx as usize >= s.chart.width() || cy as usize >= s.chart.height() {
                    self.front.set(col, row, Cell::BLANK);
                    self.front.set(col + 1, row, Cell::BLANK);
                    continue;
                }
                let (gx, gy) = (cx as usize, cy as usize);

                if (gx, gy) == (bx, by) {
                    self.front.set(col, row, Cell::new(s.boat.glyph(), BOAT_FG, SEA));
                    self.front.set(col + 1, row, Cell::new(' ', BOAT_FG, SEA));
                    continue;
                }

                let (c0, c1, fg, bg) = match s.chart.tile_at(gx, gy) {
                    Tile::Water => {
                        let foam = (gx + gy * 3 + wave) % 7 == 0;
                        (if foam { '~' } else { ' ' }, ' ', SEA_FOAM, SEA)
                    }
                    Tile::Land => ('▓', '▓', LAND_FG, LAND_BG),
                    Tile::Rock => ('^', '^', ROCK_FG, SEA),
                    Tile::Coin => ('$', ' ', GOLD, SEA),
                };
                self.front.set(col, row, Cell::new(c0, fg, bg));
                self.front.set(col + 1, row, Cell::new(c1, fg, bg));
            }
        }
    }

    /// Red vignette around the chart view while a hit is fresh.
    fn compose_tint(&mut self, s: &GameSession) {
        let strength = (s.effects.tint_alpha / MAX_TINT_ALPHA).clamp(0.0, 1.0);
        if strength <= 0.0 {
            return;
        }
        let view = Rect { x: 0, y: MAP_ROW, w: s.camera.view_w * CELL_W, h: s.camera.view_h };
        self.front.recolor(view, |x, y, cell| {
            let k = strength * vignette_weight(x, y, view.w, view.h) * VIGNETTE_MAX_MIX;
            Cell { bg: mix(cell.bg, DAMAGE_RED, k), ..cell }
        });
    }

    fn compose_hud(&mut self, s: &GameSession, width: usize, fps: f32) {
        for row in 0..HUD_ROWS {
            self.front.fill(Rect { x: 0, y: row, w: width, h: 1 }, HUD_BG);
        }

        let v = &s.vitals;
        self.compose_bar(0, v.health(), v.max_health(), HEALTH_FILL, "Health", width);
        self.compose_bar(1, v.shield(), v.max_shield(), SHIELD_FILL, "Shield", width);

        let (gx, gy) = s.boat.cell();
        let stats = format!(
            " Score {:<5} │ Grid ({},{}) │ Speed {} │ Coins left {} │ {:.0} fps",
            s.score(), gx, gy, s.boat.speed, s.chart.coins_remaining(), fps,
        );
        self.front.put_str_clipped(0, 2, &stats, GOLD, HUD_BG, width);
    }

    fn compose_bar(&mut self, row: usize, value: f32, max: f32, fill: Rgb, label: &str, width: usize) {
        let filled = bar_fill(value, max, BAR_WIDTH);
        let x0 = 1;
        for i in 0..BAR_WIDTH {
            let bg = if i < filled { fill } else { BAR_EMPTY };
            if x0 + i < width {
                self.front.set(x0 + i, row, Cell::new(' ', WHITE, bg));
            }
        }
        let text = format!("{}: {}/{}", label, value.ceil(), max);
        self.front.put_str_clipped(x0 + BAR_WIDTH + 2, row, &text, WHITE, HUD_BG, width);
    }

    fn compose_shop(&mut self, s: &GameSession, layout: &ShopLayout, pointer: Option<(usize, usize)>) {
        let panel = layout.panel;
        if panel.w == 0 {
            return;
        }
        self.front.fill(panel, PANEL_BG);
        for y in panel.y..panel.y + panel.h {
            self.front.set(panel.x, y, Cell::new('▏', CARD_BORDER, PANEL_BG));
        }

        let arrow_glyph = if layout.expanded { '>' } else { '<' };
        self.front.draw_box(layout.arrow, GOLD, PANEL_BG);
        self.front.set(layout.arrow.x + layout.arrow.w / 2, layout.arrow.y + layout.arrow.h / 2,
            Cell::new(arrow_glyph, GOLD, PANEL_BG));

        if !layout.expanded {
            for (i, ch) in "SHOP".chars().enumerate() {
                let y = layout.arrow.y + layout.arrow.h + 1 + i;
                if y < panel.y + panel.h {
                    self.front.set(panel.x + panel.w / 2, y, Cell::new(ch, DIM, PANEL_BG));
                }
            }
            return;
        }

        let inner_x = panel.x + 1;
        let inner_w = panel.w.saturating_sub(1);
        self.front.put_centered(inner_x, inner_w, 0, "~ SHIP SHOP ~", GOLD, PANEL_BG);
        self.front.put_centered(inner_x, inner_w, 1, &format!("Gold: {}", s.score()), WHITE, PANEL_BG);

        let hovered = pointer.and_then(|(px, py)| layout.hovered(px, py));
        for button in &layout.items {
            let Some(item) = s.ledger.item(button.key) else { continue };
            let r = button.rect;
            let is_hover = hovered == Some(button.key);
            let (border, bg) = match (button.available, is_hover) {
                (true, true) => (CARD_HOVER_BORDER, CARD_HOVER_BG),
                (true, false) => (CARD_BORDER, CARD_BG),
                (false, true) => (DIM, CARD_HOVER_BG),
                (false, false) => (DIM, CARD_BG),
            };
            let text = if button.available { WHITE } else { DIM };
            let price = if button.available { GOLD } else { DIM };

            self.front.fill(r, bg);
            self.front.draw_box(r, border, bg);
            let (tx, tw) = (r.x + 2, r.w.saturating_sub(4));
            let limit = tx + tw;

            let cost = format!("${}", item.cost);
            let name = format!("{} {}", button.key.icon(), item.name);
            let name = truncate(&name, tw.saturating_sub(cost.len() + 1));
            self.front.put_str_clipped(tx, r.y + 1, &name, text, bg, limit);
            self.front.put_str_clipped(limit.saturating_sub(cost.len()), r.y + 1, &cost, price, bg, limit);
            self.front.put_str_clipped(tx, r.y + 2, item.description, text, bg, limit);
            if let Some(max) = item.max_purchases {
                let owned = format!("Owned: {}/{}", item.purchased, max);
                self.front.put_str_clipped(tx, r.y + 3, &owned, DIM, bg, limit);
            }
        }

        self.front.put_centered(inner_x, inner_w, layout.footer_row, "Click items to purchase", DIM, PANEL_BG);
        let feedback = s.ledger.feedback();
        if feedback.is_visible() {
            self.front.put_centered(inner_x, inner_w, layout.message_row, &feedback.message, FEEDBACK_GREEN, PANEL_BG);
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Death screen
    // ═══════════════════════════════════════════════════════════

    /// Darken the frozen voyage and fade the wreck report in over it.
    fn compose_death(&mut self, s: &GameSession) {
        let t = f32::from(self.death_alpha) / 255.0;
        let area = self.front.area();
        self.front.recolor(area, |_, _, cell| Cell {
            fg: mix(cell.fg, BLACK, t * DEATH_DARKEN),
            bg: mix(cell.bg, BLACK, t * DEATH_DARKEN),
            ..cell
        });

        let (w, h) = (area.w, area.h);
        let mid = h / 2;
        let bg = mix(BASE_BG, BLACK, t * DEATH_DARKEN);
        let score = format!("Final score: {}", s.ledger.earned());
        let lines = [
            ("YOUR SHIP HAS SUNK", DAMAGE_RED, mid.saturating_sub(2)),
            (score.as_str(), GOLD, mid),
            ("Press any key to sail again", WHITE, mid + 2),
        ];
        for (text, color, row) in lines {
            self.front.put_centered(0, w, row, text, mix(bg, color, t), bg);
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Unit tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::vitals::DamageSource;
    use crate::sim::chart::Chart;
    use crate::sim::step;

    fn renderer(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.back.resize(w, h);
        r
    }

    fn session() -> GameSession {
        let mut s = GameSession::new(&GameConfig::default(), Chart::embedded());
        s.initialize();
        s
    }

    /// Frame the camera the way a tick would, then compose.
    fn draw(r: &mut Renderer, s: &mut GameSession) -> ShopLayout {
        s.follow_boat(r.chart_view(&s.ledger));
        r.compose(s, None, 60.0)
    }

    fn row_text(r: &Renderer, y: usize) -> String {
        (0..r.front.width).map(|x| r.front.get(x, y).ch).collect()
    }

    fn screen_text(r: &Renderer) -> String {
        (0..r.front.height).map(|y| row_text(r, y)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn mix_endpoints() {
        assert_eq!(mix(BLACK, WHITE, 0.0), BLACK);
        assert_eq!(mix(BLACK, WHITE, 1.0), WHITE);
        assert_eq!(mix((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
        assert_eq!(mix(BLACK, WHITE, 7.0), WHITE);
    }

    #[test]
    fn shake_is_bounded_and_settles() {
        for tick in 0..200 {
            let (dx, dy) = shake_offset(3.0, tick);
            assert!(dx.abs() <= 2 && dy.abs() <= 2);
        }
        assert_eq!(shake_offset(0.0, 17), (0, 0));
        assert_eq!(shake_offset(0.9, 17), (0, 0));
    }

    #[test]
    fn vignette_is_strongest_at_edges() {
        assert_eq!(vignette_weight(0, 10, 80, 20), 1.0);
        assert_eq!(vignette_weight(40, 0, 80, 20), 1.0);
        assert_eq!(vignette_weight(40, 10, 80, 20), 0.0);
        assert!(vignette_weight(40, 2, 80, 20) > 0.0);
        assert_eq!(vignette_weight(0, 0, 0, 0), 0.0);
    }

    #[test]
    fn bars_fill_proportionally() {
        assert_eq!(bar_fill(100.0, 100.0, 20), 20);
        assert_eq!(bar_fill(50.0, 100.0, 20), 10);
        assert_eq!(bar_fill(0.0, 100.0, 20), 0);
        assert_eq!(bar_fill(5.0, 0.0, 20), 0);
    }

    #[test]
    fn start_screen_prompts() {
        let mut r = renderer(100, 30);
        let mut s = session();
        draw(&mut r, &mut s);
        assert!(screen_text(&r).contains("WASD / Arrows"));
    }

    #[test]
    fn hud_shows_rounded_up_health() {
        let mut r = renderer(120, 40);
        let mut s = session();
        step::on_interaction(&mut s);
        s.apply_damage(10.0, DamageSource::Passive);
        s.apply_damage(0.5, DamageSource::Passive);
        draw(&mut r, &mut s);
        assert!(row_text(&r, 0).contains("Health: 100/100"));
        assert!(row_text(&r, 1).contains("Shield: 0/100"));
        assert!(row_text(&r, 2).contains("60 fps"));
    }

    #[test]
    fn chart_view_excludes_shop_panel() {
        let mut r = renderer(100, 30);
        let mut s = session();
        step::on_interaction(&mut s);
        let layout = draw(&mut r, &mut s);
        assert_eq!(r.chart_view(&s.ledger), (layout.view_width() / CELL_W, 30 - MAP_ROW - 1));
        assert_eq!(s.camera.view_w, layout.view_width() / CELL_W);

        step::toggle_shop(&mut s);
        let (narrow, _) = r.chart_view(&s.ledger);
        let layout = draw(&mut r, &mut s);
        assert!(layout.expanded);
        assert_eq!(narrow, layout.view_width() / CELL_W);
    }

    #[test]
    fn drawing_leaves_session_untouched() {
        let mut r = renderer(100, 30);
        let mut s = session();
        step::on_interaction(&mut s);
        s.apply_damage(5.0, DamageSource::Rock);
        let before = (s.camera.clone(), s.effects, s.tick);
        r.compose(&s, None, 60.0);
        r.compose(&s, None, 60.0);
        assert_eq!((s.camera.clone(), s.effects, s.tick), before);
    }

    #[test]
    fn expanded_shop_lists_catalog_and_feedback() {
        let mut r = renderer(120, 40);
        let mut s = session();
        step::on_interaction(&mut s);
        step::add_score(&mut s, 20);
        step::toggle_shop(&mut s);
        step::on_purchase_attempt(&mut s, crate::domain::shop::ItemKey::HealthPotion);
        draw(&mut r, &mut s);
        let text = screen_text(&r);
        assert!(text.contains("SHIP SHOP"));
        assert!(text.contains("Speed Booster"));
        assert!(text.contains("Owned: 0/5"));
        assert!(text.contains("Click items to purchase"));
        assert!(text.contains("Health Potion purchased!"));
    }

    #[test]
    fn damage_tints_the_view_edge() {
        let mut r = renderer(100, 30);
        let mut s = session();
        step::on_interaction(&mut s);
        draw(&mut r, &mut s);
        let calm = r.front.get(0, MAP_ROW + 5).bg;
        s.apply_damage(5.0, DamageSource::Land);
        draw(&mut r, &mut s);
        let hurt = r.front.get(0, MAP_ROW + 5).bg;
        assert!(hurt.0 > calm.0);
    }

    #[test]
    fn death_screen_fades_in() {
        let mut r = renderer(100, 30);
        let mut s = session();
        step::on_interaction(&mut s);
        step::add_score(&mut s, 35);
        s.apply_damage(1000.0, DamageSource::Land);
        s.apply_damage(1000.0, DamageSource::Land);
        step::tick(&mut s);
        assert_eq!(s.phase, GamePhase::Death);

        draw(&mut r, &mut s);
        assert_eq!(r.death_alpha, 8);
        assert!(screen_text(&r).contains("Final score: 35"));
        for _ in 0..40 {
            draw(&mut r, &mut s);
        }
        assert_eq!(r.death_alpha, 255);

        step::on_interaction(&mut s);
        draw(&mut r, &mut s);
        assert_eq!(r.death_alpha, 0);
    }
}
