use crate::Rate;
use serde::Deserialize;
use serde::Serialize;

/// an event whose occurrence enables traversal of every edge that
/// references it, for the remainder of the history. `rate` is the mean
/// time in days between occurrences of an exponentially distributed
/// activation; 0 means always on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    pub rate: Rate,
}

impl From<Rate> for Threat {
    fn from(rate: Rate) -> Self {
        Self { rate }
    }
}
