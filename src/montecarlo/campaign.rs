use crate::Days;
use crate::model::id::Id;
use serde::Deserialize;
use serde::Serialize;

/// summary of a time statistic across a campaign. min and max span the
/// per-node means and exist only when node details were collected;
/// downstream colour scales key off them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Aggregate {
    pub mean: Days,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Days>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Days>,
}

/// per-node sample record collected over a campaign. a node appears in
/// a sample list once per history that reached (or involved) it; the
/// censored remainder of the denominator is implied by the campaign's
/// history count.
#[derive(Debug, Clone)]
pub struct Report {
    pub origin: Id,
    pub mttc: Option<Days>,
    pub mttc_samples: Vec<Days>,
    pub mtti: Option<Days>,
    pub mtti_samples: Vec<Days>,
}

/// everything a mean campaign produces: the per-trial compromise
/// times that were observed, the running mean after each observation,
/// the horizon the histories ran to, and per-node reports when
/// requested. `converged` is false when the campaign exhausted its
/// trial ceiling and the estimate is best-effort.
#[derive(Debug, Clone)]
pub struct Campaign {
    pub times: Vec<Days>,
    pub means: Vec<Days>,
    pub histories: usize,
    pub timeframe: Days,
    pub resolution: usize,
    pub mttc: Aggregate,
    pub mtti: Option<Aggregate>,
    pub nodes: Vec<Report>,
    pub converged: bool,
}

impl Campaign {
    /// the final running mean
    pub fn mean(&self) -> Days {
        self.means.last().copied().unwrap_or(0.0)
    }
}
