/// Chart tile types and their properties.
/// Properties are queried via methods so sailing rules stay in one place.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Water,
    Land,  // Blocks the hull; pushing into it is a land contact
    Rock,  // Passable shoal; occupying it is a rock contact
    Coin,  // Floating pickup, sails like water
}

impl Tile {
    /// Parse a chart glyph. `B` (spawn) is handled by the chart loader.
    pub fn from_glyph(ch: char) -> Option<Tile> {
        match ch {
            '~' | ' ' | '.' => Some(Tile::Water),
            '#' => Some(Tile::Land),
            '^' => Some(Tile::Rock),
            '$' => Some(Tile::Coin),
            _ => None,
        }
    }

    /// Can the boat occupy this cell?
    pub fn is_navigable(self) -> bool {
        !matches!(self, Tile::Land)
    }

    /// Open water: a valid spawn cell.
    pub fn is_water(self) -> bool {
        matches!(self, Tile::Water)
    }

    pub fn is_rock(self) -> bool {
        matches!(self, Tile::Rock)
    }

    pub fn is_coin(self) -> bool {
        matches!(self, Tile::Coin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_legend() {
        assert_eq!(Tile::from_glyph('~'), Some(Tile::Water));
        assert_eq!(Tile::from_glyph(' '), Some(Tile::Water));
        assert_eq!(Tile::from_glyph('#'), Some(Tile::Land));
        assert_eq!(Tile::from_glyph('^'), Some(Tile::Rock));
        assert_eq!(Tile::from_glyph('$'), Some(Tile::Coin));
        assert_eq!(Tile::from_glyph('B'), None);
        assert_eq!(Tile::from_glyph('x'), None);
    }

    #[test]
    fn only_land_blocks() {
        assert!(Tile::Water.is_navigable());
        assert!(Tile::Rock.is_navigable());
        assert!(Tile::Coin.is_navigable());
        assert!(!Tile::Land.is_navigable());
    }
}
