#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two = 0,
    Three = 1,
    Four = 2,
    Five = 3,
    Six = 4,
    Seven = 5,
    Eight = 6,
    Nine = 7,
    Ten = 8,
    Jack = 9,
    Queen = 10,
    King = 11,
    Ace = 12,
}

impl Rank {
    /// Deuce through ace in strength order; indexing by discriminant is
    /// the inverse of the u8 conversion.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];
    const GLYPHS: [char; 13] = [
        '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
    ];

    /// Single-character wire spelling.
    pub fn glyph(&self) -> char {
        Self::GLYPHS[*self as usize]
    }
}

impl From<u8> for Rank {
    fn from(n: u8) -> Rank {
        Rank::ALL[n as usize]
    }
}
impl From<Rank> for u8 {
    fn from(r: Rank) -> u8 {
        r as u8
    }
}

impl TryFrom<char> for Rank {
    type Error = String;
    fn try_from(c: char) -> std::result::Result<Self, Self::Error> {
        Rank::GLYPHS
            .iter()
            .position(|glyph| *glyph == c)
            .map(|i| Rank::ALL[i])
            .ok_or_else(|| format!("invalid rank char {}", c))
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}", self.glyph())
    }
}

use std::fmt::{Display, Formatter, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_invert_the_table() {
        for (i, rank) in Rank::ALL.iter().enumerate() {
            assert_eq!(Rank::from(i as u8), *rank);
            assert_eq!(u8::from(*rank), i as u8);
        }
    }

    #[test]
    fn glyphs_parse_back() {
        for rank in Rank::ALL {
            assert_eq!(Rank::try_from(rank.glyph()), Ok(rank));
        }
        assert!(Rank::try_from('x').is_err());
        // lowercase spellings are not accepted
        assert!(Rank::try_from('t').is_err());
    }

    #[test]
    fn strength_order_runs_deuce_to_ace() {
        assert!(Rank::Two < Rank::Three);
        assert!(Rank::King < Rank::Ace);
        assert_eq!(Rank::Ten.glyph(), 'T');
    }
}
