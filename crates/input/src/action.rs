use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A top-level dissolve sequence that a key press can trigger.
///
/// The grid controller consumes actions, never raw keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Regenerate the grid fully dissolved, then reveal it from the center out.
    ExpandAppear,
    /// Dissolve the existing grid from the edges in.
    ContractDisappear,
    /// Reveal every tile in random order.
    RandomAppear,
    /// Dissolve every tile in random order.
    RandomDisappear,
}

impl Action {
    /// Dispatch priority when several bound keys go down in one frame.
    pub const ALL: [Action; 4] = [
        Action::ExpandAppear,
        Action::ContractDisappear,
        Action::RandomAppear,
        Action::RandomDisappear,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::ExpandAppear => "expand-appear",
            Action::ContractDisappear => "contract-disappear",
            Action::RandomAppear => "random-appear",
            Action::RandomDisappear => "random-disappear",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0}")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.label() == s)
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}
