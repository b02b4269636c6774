/// The player's boat: a point in chart space with a speed and a heading.
///
/// Position is measured in chart cells (`x` grows east, `y` grows south).
/// The boat occupies the cell containing its position. Speed uses the
/// same units the shop talks about ("increase speed by 2"); `SPEED_SCALE`
/// converts it to cells per tick.

/// Chart cells travelled per tick for each unit of `speed`.
/// Kept small enough that the boat never skips a whole cell in one tick
/// at any reachable speed, so rock entry is always observed.
pub const SPEED_SCALE: f32 = 0.05;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Heading {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Heading {
    /// Bow glyph drawn at the boat's cell.
    pub fn glyph(self) -> char {
        match self {
            Heading::North => '▲',
            Heading::NorthEast => '◥',
            Heading::East => '▶',
            Heading::SouthEast => '◢',
            Heading::South => '▼',
            Heading::SouthWest => '◣',
            Heading::West => '◀',
            Heading::NorthWest => '◤',
        }
    }
}

/// Per-tick steering intent: each axis is -1, 0 or +1.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Helm {
    pub dx: i8,
    pub dy: i8,
}

impl Helm {
    pub fn new(dx: i8, dy: i8) -> Self {
        Helm { dx: dx.signum(), dy: dy.signum() }
    }

    pub fn is_idle(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    pub fn heading(self) -> Option<Heading> {
        match (self.dx, self.dy) {
            (0, -1) => Some(Heading::North),
            (1, -1) => Some(Heading::NorthEast),
            (1, 0) => Some(Heading::East),
            (1, 1) => Some(Heading::SouthEast),
            (0, 1) => Some(Heading::South),
            (-1, 1) => Some(Heading::SouthWest),
            (-1, 0) => Some(Heading::West),
            (-1, -1) => Some(Heading::NorthWest),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Boat {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub heading: Heading,
}

impl Boat {
    /// A boat resting at the centre of cell `(cx, cy)`.
    pub fn at_cell(cx: usize, cy: usize, speed: f32) -> Self {
        Boat {
            x: cx as f32 + 0.5,
            y: cy as f32 + 0.5,
            speed,
            heading: Heading::North,
        }
    }

    /// The chart cell the hull sits in.
    pub fn cell(&self) -> (usize, usize) {
        (self.x.max(0.0).floor() as usize, self.y.max(0.0).floor() as usize)
    }

    /// Where the helm would take the boat this tick. Diagonals are
    /// normalized so steering at 45° is not faster.
    pub fn proposed(&self, helm: Helm) -> (f32, f32) {
        if helm.is_idle() {
            return (self.x, self.y);
        }
        let (dx, dy) = (f32::from(helm.dx), f32::from(helm.dy));
        let len = (dx * dx + dy * dy).sqrt();
        let step = self.speed * SPEED_SCALE;
        (self.x + dx / len * step, self.y + dy / len * step)
    }

    pub fn place(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn glyph(&self) -> char {
        self.heading.glyph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helm_clamps_to_unit_axes() {
        let h = Helm::new(5, -3);
        assert_eq!(h, Helm { dx: 1, dy: -1 });
        assert_eq!(h.heading(), Some(Heading::NorthEast));
        assert_eq!(Helm::default().heading(), None);
    }

    #[test]
    fn straight_step_scales_with_speed() {
        let b = Boat::at_cell(4, 4, 3.0);
        let (x, y) = b.proposed(Helm::new(1, 0));
        assert!((x - (4.5 + 3.0 * SPEED_SCALE)).abs() < 1e-6);
        assert!((y - 4.5).abs() < 1e-6);
    }

    #[test]
    fn diagonal_step_is_normalized() {
        let b = Boat::at_cell(4, 4, 10.0);
        let (x, y) = b.proposed(Helm::new(1, 1));
        let dist = ((x - b.x).powi(2) + (y - b.y).powi(2)).sqrt();
        assert!((dist - 10.0 * SPEED_SCALE).abs() < 1e-5);
    }

    #[test]
    fn idle_helm_stays_put() {
        let b = Boat::at_cell(2, 7, 3.0);
        assert_eq!(b.proposed(Helm::default()), (b.x, b.y));
        assert_eq!(b.cell(), (2, 7));
    }

    #[test]
    fn max_reachable_speed_never_skips_a_cell() {
        // default 3 plus five boosters of 2
        let b = Boat::at_cell(0, 0, 13.0);
        let (x, _) = b.proposed(Helm::new(1, 0));
        assert!(x - b.x < 1.0);
    }
}
