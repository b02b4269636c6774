/// Sea chart: the tile grid the boat sails on.
///
/// ## Tile layers
///
///   - `base`: the chart as loaded. Never mutated after parse.
///   - `tiles`: live terrain (base minus collected coins).
///
/// `reset()` copies `base` back over `tiles` on restart.
///
/// ## Chart format
///
/// One text row per chart row, all rows the same width:
///
///   `~` ` ` `.` = water    `#` = land    `^` = rock
///   `$` = coin             `B` = boat spawn (water)
///
/// Blank lines before and after the grid are ignored. Without a `B`,
/// the boat spawns on the water cell nearest the chart centre.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::tile::Tile;

const DEFAULT_CHART: &str = include_str!("default_chart.txt");

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("could not read chart {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("chart has no rows")]
    Empty,
    #[error("chart row {row} is {len} cells wide, expected {expected}")]
    Ragged { row: usize, len: usize, expected: usize },
    #[error("unknown chart glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },
    #[error("chart has no open water to spawn on")]
    NoWater,
}

/// What the hull is touching this frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Contact {
    pub land: bool,
    pub rock: bool,
}

#[derive(Clone, Debug)]
pub struct Chart {
    base: Vec<Vec<Tile>>,
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
    spawn: (usize, usize),
}

impl Chart {
    pub fn parse(text: &str) -> Result<Self, ChartError> {
        let rows: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        let first = rows.iter().position(|r| !r.is_empty()).ok_or(ChartError::Empty)?;
        let last = rows.iter().rposition(|r| !r.is_empty()).unwrap_or(first);
        let rows = &rows[first..=last];

        let width = rows[0].chars().count();
        let mut base = Vec::with_capacity(rows.len());
        let mut spawn = None;

        for (y, row) in rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(ChartError::Ragged { row: y, len, expected: width });
            }
            let mut line = Vec::with_capacity(width);
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    'B' => {
                        if spawn.is_none() {
                            spawn = Some((x, y));
                        }
                        Tile::Water
                    }
                    other => Tile::from_glyph(other)
                        .ok_or_else(|| ChartError::UnknownGlyph { glyph: other, row: y, col: x })?,
                };
                line.push(tile);
            }
            base.push(line);
        }

        let mut chart = Chart {
            tiles: base.clone(),
            base,
            width,
            height: rows.len(),
            spawn: (0, 0),
        };
        let wanted = spawn.unwrap_or((chart.width / 2, chart.height / 2));
        chart.spawn = chart.nearest_water(wanted.0, wanted.1).ok_or(ChartError::NoWater)?;
        Ok(chart)
    }

    pub fn load(path: &Path) -> Result<Self, ChartError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ChartError::Read { path: path.to_path_buf(), source })?;
        Chart::parse(&text)
    }

    /// The chart compiled into the binary.
    pub fn embedded() -> Self {
        Chart::parse(DEFAULT_CHART).unwrap_or_else(|_| Chart::open_sea(40, 20))
    }

    /// Endless-looking open water, boat in the middle.
    pub fn open_sea(width: usize, height: usize) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let base = vec![vec![Tile::Water; width]; height];
        Chart {
            tiles: base.clone(),
            base,
            width,
            height,
            spawn: (width / 2, height / 2),
        }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn spawn(&self) -> (usize, usize) { self.spawn }

    /// Live tile at (x, y). Off-chart counts as land.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        if x < self.width && y < self.height {
            self.tiles[y][x]
        } else {
            Tile::Land
        }
    }

    /// Live tile under a continuous chart position.
    pub fn tile_at_pos(&self, x: f32, y: f32) -> Tile {
        if x < 0.0 || y < 0.0 {
            return Tile::Land;
        }
        self.tile_at(x.floor() as usize, y.floor() as usize)
    }

    /// Remove a coin at (x, y). Returns whether there was one.
    pub fn take_coin(&mut self, x: usize, y: usize) -> bool {
        if self.tile_at(x, y).is_coin() {
            self.tiles[y][x] = Tile::Water;
            true
        } else {
            false
        }
    }

    pub fn coins_remaining(&self) -> usize {
        self.tiles.iter().flatten().filter(|t| t.is_coin()).count()
    }

    /// Restore every collected coin.
    pub fn reset(&mut self) {
        self.tiles = self.base.clone();
    }

    /// Closest open-water cell to (x, y), searching outward ring by ring.
    pub fn nearest_water(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        let reach = self.width.max(self.height) as i64;
        let (x, y) = (x as i64, y as i64);
        for r in 0..=reach {
            let mut best: Option<(i64, (usize, usize))> = None;
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx.abs() != r && dy.abs() != r {
                        continue; // ring only
                    }
                    let (cx, cy) = (x + dx, y + dy);
                    if cx < 0 || cy < 0 {
                        continue;
                    }
                    let (ux, uy) = (cx as usize, cy as usize);
                    if !self.tile_at(ux, uy).is_water() {
                        continue;
                    }
                    let d = dx * dx + dy * dy;
                    if best.map_or(true, |(bd, _)| d < bd) {
                        best = Some((d, (ux, uy)));
                    }
                }
            }
            if let Some((_, cell)) = best {
                return Some(cell);
            }
        }
        None
    }
}
