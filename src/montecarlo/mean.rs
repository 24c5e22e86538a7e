use super::campaign::Aggregate;
use super::campaign::Campaign;
use super::campaign::Report;
use super::criteria::Criteria;
use super::criteria::spread;
use super::history::History;
use super::pass::Gate;
use super::pass::Pass;
use super::quantile::Quantile;
use super::survival::expectation;
use crate::Days;
use crate::model::model::Model;

/// estimates the expected compromise (and optionally involvement) time
/// by running bounded histories to a fixed horizon and integrating the
/// empirical survival curve after every observation.
///
/// a history that never completes a path within the horizon is
/// censored: it counts against the denominator but contributes no
/// observation, and the survival integration accounts for its mass
/// beyond the horizon. the campaign stops once the running mean holds
/// still across the criteria window, or at the trial ceiling with the
/// estimate flagged best-effort.
pub struct Expectation {
    pub resolution: usize,
    pub criteria: Criteria,
    pub details: bool,
    pub involvement: bool,
    pub timeframe: Option<Days>,
    pub gate: Gate,
    pub seed: u64,
}

impl Default for Expectation {
    fn default() -> Self {
        Self {
            resolution: crate::RESOLUTION,
            criteria: Criteria::mean(),
            details: false,
            involvement: false,
            timeframe: None,
            gate: Gate::default(),
            seed: 0,
        }
    }
}

impl Expectation {
    pub fn estimate(&self, model: &Model) -> anyhow::Result<Campaign> {
        let cc = self.criteria;
        // an explicit horizon skips the quantile hunt; a generous one
        // also tightens the result by shrinking the censored share
        let timeframe = match self.timeframe {
            Some(timeframe) => timeframe,
            None => {
                let p = 1.0 - 1.0 / (self.resolution as f64 + 1.0);
                Quantile::seeded(p, self.seed).search(model)?.time
            }
        };
        let dt = timeframe / self.resolution as f64;
        let pass = Pass {
            involvement: self.involvement,
            gate: self.gate,
            ..Pass::default()
        };
        log::debug!(
            "running histories with timeframe of {:.2} and dt of {:.2}",
            timeframe,
            dt
        );
        let mut times: Vec<Days> = Vec::with_capacity(cc.window);
        let mut means: Vec<Days> = Vec::with_capacity(cc.window);
        let mut hits: Vec<Vec<Days>> = vec![Vec::new(); model.size()];
        let mut involvements: Vec<Vec<Days>> = vec![Vec::new(); model.size()];
        let mut histories = 0;
        let mut converged = false;
        let mut history = History::new(model, self.seed);
        for trial in 0..crate::CAMPAIGN_LIMIT {
            history.reset(super::stream(self.seed, usize::MAX, trial));
            history.run(timeframe, dt, pass);
            histories += 1;
            // the trial's compromise time is the earliest terminal
            // reach; anything past the horizon is censored
            let sentinel = history.age() + 1.0;
            let earliest = model
                .ends()
                .iter()
                .filter_map(|&end| history.trial().hit_time(end.index()))
                .fold(sentinel, f64::min);
            if earliest < sentinel {
                times.push(earliest);
                means.push(expectation(&times, histories));
            }
            if self.details {
                for node in 0..model.size() {
                    if let Some(time) = history.trial().hit_time(node) {
                        hits[node].push(time);
                    }
                }
                if self.involvement {
                    for node in 0..model.size() {
                        if let Some(time) = history.trial().involved_time(node) {
                            involvements[node].push(time);
                        }
                    }
                }
            }
            if means.len() > cc.window {
                let last = means[means.len() - 1];
                let window = &means[means.len() - cc.window..];
                let status = spread(window.iter().map(|mu| match mu == &last {
                    true => 0.0,
                    false => ((last - mu) / last).abs(),
                }));
                log::debug!("t convergence {:.4} / {}", status, cc.t_tolerance);
                if status < cc.t_tolerance {
                    converged = true;
                    break;
                }
            }
        }
        if times.is_empty() {
            anyhow::bail!("no completed path within horizon of {} days", timeframe);
        }
        if !converged {
            log::warn!("campaign exhausted {} trials unconverged", histories);
        }
        let mean = means[means.len() - 1];
        log::debug!("overall mean estimated at {:.2} days", mean);
        // post-process the per-node samples into survival means and
        // the min/max aggregates used for colour scaling downstream
        let nodes = match self.details {
            false => Vec::new(),
            true => model
                .graph()
                .node_indices()
                .map(|node| {
                    let i = node.index();
                    Report {
                        origin: model.graph()[node].origin.clone(),
                        mttc: match hits[i].is_empty() {
                            true => None,
                            false => Some(expectation(&hits[i], histories)),
                        },
                        mtti: match involvements[i].is_empty() {
                            true => None,
                            false => Some(expectation(&involvements[i], histories)),
                        },
                        mttc_samples: std::mem::take(&mut hits[i]),
                        mtti_samples: std::mem::take(&mut involvements[i]),
                    }
                })
                .collect(),
        };
        let mttc = Aggregate {
            mean,
            ..bounds(nodes.iter().filter_map(|report| report.mttc))
        };
        let mtti = match self.involvement {
            false => None,
            true => Some(Aggregate {
                mean,
                ..bounds(nodes.iter().filter_map(|report| report.mtti))
            }),
        };
        Ok(Campaign {
            times,
            means,
            histories,
            timeframe,
            resolution: self.resolution,
            mttc,
            mtti,
            nodes,
            converged,
        })
    }
}

/// min/max across per-node means, with min collapsed to 0 when the
/// range is degenerate so colour scales keep a usable span
fn bounds(values: impl Iterator<Item = Days>) -> Aggregate {
    let mut min = None;
    let mut max = None;
    for value in values {
        min = Some(min.map_or(value, |m| f64::min(m, value)));
        max = Some(max.map_or(value, |m| f64::max(m, value)));
    }
    if min == max {
        min = min.map(|_| 0.0);
    }
    Aggregate { mean: 0.0, min, max }
}
