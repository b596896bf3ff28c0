/// The ten canonical hand categories, weakest to strongest.
///
/// Category alone orders hands across categories; ties within a category
/// are broken by the tiebreak vector carried on [`Strength`](super::Strength).
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Ranking {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl Ranking {
    /// Published hand name as clients display it.
    pub fn name(&self) -> &'static str {
        match self {
            Ranking::HighCard => "High Card",
            Ranking::OnePair => "One Pair",
            Ranking::TwoPair => "Two Pair",
            Ranking::ThreeOfAKind => "Three of a Kind",
            Ranking::Straight => "Straight",
            Ranking::Flush => "Flush",
            Ranking::FullHouse => "Full House",
            Ranking::FourOfAKind => "Four of a Kind",
            Ranking::StraightFlush => "Straight Flush",
            Ranking::RoyalFlush => "Royal Flush",
        }
    }
}

impl std::fmt::Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
