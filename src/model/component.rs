use super::id::Id;
use crate::Rate;

/// a node in the threat graph.
///
/// `start` makes this an entry point that becomes active spontaneously
/// under its own exponential rate, 0 meaning from the first instant.
/// `coincidence` is AND-gate admission: how many distinct incoming
/// active edges must arrive before the node counts as reached.
/// `origin` tags the node with the domain-level identity it came from,
/// so per-node results can be projected back after a campaign.
#[derive(Debug, Clone)]
pub struct Component {
    pub id: Id,
    pub origin: Id,
    pub start: Option<Rate>,
    pub coincidence: Option<u32>,
}

impl Component {
    /// a plain relay node with no entry or gate behavior
    pub fn relay(id: Id) -> Self {
        Self {
            origin: id.clone(),
            id,
            start: None,
            coincidence: None,
        }
    }

    /// an entry point with the given spontaneous start rate
    pub fn entry(id: Id, start: Rate) -> Self {
        Self {
            origin: id.clone(),
            id,
            start: Some(start),
            coincidence: None,
        }
    }
}
