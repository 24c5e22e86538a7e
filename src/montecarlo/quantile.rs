use super::criteria::Criteria;
use super::criteria::spread;
use super::history::History;
use super::pass::Pass;
use super::survival::least_squares;
use crate::Days;
use crate::Probability;
use crate::model::model::Model;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;

/// outcome of a quantile search: the probe age at which a completed
/// path exists with the requested probability, plus the (hit rate,
/// age) record of every bundle that got us there.
#[derive(Debug, Clone)]
pub struct Hunt {
    pub time: Days,
    pub probes: Vec<(Probability, Days)>,
    pub histories: usize,
    pub converged: bool,
}

/// locates the age at which the model has a completed attack path with
/// a requested probability.
///
/// bundles of racing histories estimate the hit rate at a probe age.
/// the probe doubles until hits come regularly, then a hunt fits age
/// against hit rate by least squares (anchored at the origin, since no
/// path completes in no time) and walks the probe onto the target
/// probability until the trailing window of estimates settles.
pub struct Quantile {
    pub probability: Probability,
    pub criteria: Criteria,
    pub depth: usize,
    pub seed: u64,
}

impl Quantile {
    pub fn new(probability: Probability) -> Self {
        Self {
            probability,
            criteria: Criteria::quantile(),
            depth: crate::HUNT_DEPTH,
            seed: 0,
        }
    }

    pub fn seeded(probability: Probability, seed: u64) -> Self {
        Self {
            seed,
            ..Self::new(probability)
        }
    }

    /// one bundle of independent racing histories at a probe age.
    /// every trial owns its own state and rng stream, and the merge is
    /// an order-free count, so the bundle parallelizes without losing
    /// reproducibility.
    fn bundle(&self, model: &Model, dt: Days, depth: usize, epoch: usize) -> usize {
        (0..depth)
            .into_par_iter()
            .map(|trial| {
                let mut history = History::new(model, super::stream(self.seed, epoch, trial));
                history.run(dt, dt, Pass::racing())
            })
            .filter(|hit| *hit)
            .count()
    }

    pub fn search(&self, model: &Model) -> anyhow::Result<Hunt> {
        let p = self.probability;
        let cc = self.criteria;
        let mut depth = self.depth;
        let mut probes: Vec<(Probability, Days)> = vec![(0.0, 0.0)];
        let mut histories = 0;
        let mut epochs = 0;
        let mut hits = 0;
        let mut dt = crate::FIRST_PROBE;
        // double the probe age until hits outpace the target rate
        log::debug!("doubling probe until hits at p = {:.4}", p);
        let mut regular = false;
        for _ in 0..crate::DOUBLING_LIMIT {
            hits = self.bundle(model, dt, depth, epochs);
            epochs += 1;
            histories += depth;
            probes.push((hits as f64 / depth as f64, dt));
            if hits as f64 > depth as f64 * p {
                regular = true;
                break;
            }
            dt += dt;
        }
        if !regular {
            anyhow::bail!(
                "no achievable path within search horizon ({} doublings from {} days)",
                crate::DOUBLING_LIMIT,
                crate::FIRST_PROBE
            );
        }
        // a start wired straight into an end completes instantly
        if dt == 0.0 {
            return Ok(Hunt {
                time: 0.0,
                probes,
                histories,
                converged: true,
            });
        }
        // hunt the probe onto the target probability
        log::debug!("hunting for t from {} days", dt);
        let mut converged = false;
        let mut growth = crate::HUNT_GROWTH;
        for _ in 0..crate::HUNT_LIMIT {
            if hits == 0 {
                // a dry bundle says nothing; stretch the probe
                dt *= crate::HUNT_GROWTH;
            } else if hits == depth {
                // a saturated bundle says little; dial it down a notch
                dt *= 1.0 - cc.t_tolerance;
            } else {
                let window = &probes[probes.len().saturating_sub(cc.window)..];
                let ps = std::iter::once(0.0)
                    .chain(window.iter().map(|&(p, _)| p))
                    .collect::<Vec<f64>>();
                let ts = std::iter::once(0.0)
                    .chain(window.iter().map(|&(_, t)| t))
                    .collect::<Vec<f64>>();
                let (m, b) = least_squares(&ps, &ts);
                dt = m * p + b;
            }
            // spend more samples per bundle as estimates stabilize
            if probes.len() > 2 {
                let (last, _) = probes[probes.len() - 1];
                let (prev, _) = probes[probes.len() - 2];
                if last > 0.0 {
                    growth = (1.0 + (last - prev).abs() / last).min(crate::HUNT_GROWTH);
                }
            }
            depth = (depth as f64 * growth) as usize;
            hits = self.bundle(model, dt, depth, epochs);
            epochs += 1;
            histories += depth;
            probes.push((hits as f64 / depth as f64, dt));
            // converged once the window of hit rates brackets the
            // target tightly and the probe ages have stopped moving
            if probes.len() > cc.window {
                let window = &probes[probes.len() - cc.window..];
                let ps = window.iter().map(|&(p, _)| p).chain(std::iter::once(p));
                let status = spread(ps);
                log::debug!("p convergence {:.4} / {}", status, cc.p_tolerance);
                if status < cc.p_tolerance {
                    let ts = window
                        .iter()
                        .map(|&(_, t)| ((dt - t) / dt).abs())
                        .chain(std::iter::once(0.0));
                    let status = spread(ts);
                    log::debug!("t convergence {:.4} / {}", status, cc.t_tolerance);
                    if status < cc.t_tolerance {
                        converged = true;
                        break;
                    }
                }
            }
        }
        let window = &probes[probes.len().saturating_sub(cc.window)..];
        let time = window.iter().map(|&(_, t)| t).sum::<Days>() / window.len() as f64;
        log::debug!("time for p of {:.2} estimated at {:.2} days", p, time);
        Ok(Hunt {
            time,
            probes,
            histories,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::component::Component;
    use crate::model::id::Id;

    fn chain(rates: &[f64]) -> Model {
        let mut model = Model::new();
        let mut prev = model.component(Component::entry(Id::from(0i64), 0.0));
        for (i, &rate) in rates.iter().enumerate() {
            let next = model.component(Component::relay(Id::from(i + 1)));
            let threat = model.threat(&format!("t{}", i), rate);
            model.vector(prev, next, threat);
            prev = next;
        }
        model.terminal(prev);
        model
    }

    #[test]
    fn unreachable_end_is_an_error() {
        let mut model = Model::new();
        model.component(Component::entry(Id::from(0i64), 0.0));
        let lonely = model.component(Component::relay(Id::from(1i64)));
        model.terminal(lonely);
        let hunt = Quantile::new(0.5).search(&model);
        assert!(hunt.is_err());
    }

    #[test]
    fn identical_seeds_identical_hunts() {
        let ref model = chain(&[30.0, 30.0]);
        let a = Quantile::seeded(0.5, 3).search(model).unwrap();
        let b = Quantile::seeded(0.5, 3).search(model).unwrap();
        assert!(a.time == b.time);
        assert!(a.histories == b.histories);
    }

    #[test]
    fn median_of_two_threat_chain() {
        // completion is the max of two rate-30 exponentials, and each
        // probe history evaluates hits through twice its step, so the
        // converged label sits near half the distribution median of
        // 36.8 days
        let ref model = chain(&[30.0, 30.0]);
        let hunt = Quantile::seeded(0.5, 1).search(model).unwrap();
        assert!(hunt.time > 12.0, "time {}", hunt.time);
        assert!(hunt.time < 26.0, "time {}", hunt.time);
    }
}
