/// A single decision by the acting player.
///
/// `Raise` carries raise-to semantics: the total the player's round bet
/// becomes, not the increment on top of the current bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise(Chips),
    AllIn,
}

impl Action {
    /// Parse the wire pair (`action`, optional `amount`).
    pub fn parse(kind: &str, amount: Option<Chips>) -> std::result::Result<Self, String> {
        match (kind, amount) {
            ("fold", _) => Ok(Action::Fold),
            ("check", _) => Ok(Action::Check),
            ("call", _) => Ok(Action::Call),
            ("all_in", _) | ("all-in", _) => Ok(Action::AllIn),
            ("raise", Some(to)) => Ok(Action::Raise(to)),
            ("raise", None) => Err("raise requires an amount".to_string()),
            (other, _) => Err(format!("unknown action {}", other)),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Action::Fold => write!(f, "fold"),
            Action::Check => write!(f, "check"),
            Action::Call => write!(f, "call"),
            Action::Raise(to) => write!(f, "raise {}", to),
            Action::AllIn => write!(f, "all-in"),
        }
    }
}

use gf_core::Chips;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_actions() {
        assert_eq!(Action::parse("fold", None), Ok(Action::Fold));
        assert_eq!(Action::parse("check", None), Ok(Action::Check));
        assert_eq!(Action::parse("call", Some(5)), Ok(Action::Call));
        assert_eq!(Action::parse("raise", Some(40)), Ok(Action::Raise(40)));
        assert_eq!(Action::parse("all_in", None), Ok(Action::AllIn));
    }

    #[test]
    fn parse_rejects_bare_raise_and_unknown() {
        assert!(Action::parse("raise", None).is_err());
        assert!(Action::parse("limp", None).is_err());
    }
}
