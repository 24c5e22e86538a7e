/// which side of an edge guards admission through a coincidence gate.
///
/// Source reads the countdown on the node being expanded, Target on
/// the node being admitted, which is the stricter AND-gate reading.
/// both decrement the target's countdown on every active arrival.
/// Source is the default so existing models keep their results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gate {
    #[default]
    Source,
    Target,
}

/// settings for one sweep of the path checker
#[derive(Debug, Clone, Copy, Default)]
pub struct Pass {
    pub stop_at_hit: bool,
    pub involvement: bool,
    pub gate: Gate,
}

impl Pass {
    /// early-exit reachability, for quantile probes
    pub fn racing() -> Self {
        Self {
            stop_at_hit: true,
            ..Self::default()
        }
    }

    /// full sweep, optionally closing over backward involvement
    pub fn thorough(involvement: bool) -> Self {
        Self {
            involvement,
            ..Self::default()
        }
    }
}
