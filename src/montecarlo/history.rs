use super::pass::Gate;
use super::pass::Pass;
use crate::Days;
use crate::model::model::Model;
use crate::model::trial::Trial;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// one Monte Carlo history over a borrowed model.
///
/// the model is shared and read-only; the history owns its trial slab
/// and its rng, which makes independent histories embarrassingly
/// parallel. aging rolls the activation dice, sweeping grows a forward
/// spanning tree over active edges to stamp first-reach times, and the
/// backward closure upgrades reached nodes to involved ones when they
/// sit on a completed start-to-end path.
pub struct History<'a> {
    model: &'a Model,
    trial: Trial,
    rng: SmallRng,
}

impl<'a> History<'a> {
    pub fn new(model: &'a Model, seed: u64) -> Self {
        Self {
            model,
            trial: Trial::new(model),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// clear the trial slab and start a fresh rng stream
    pub fn reset(&mut self, seed: u64) {
        self.trial.reset();
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn trial(&self) -> &Trial {
        &self.trial
    }
    pub fn hit(&self) -> bool {
        self.trial.hit
    }
    pub fn age(&self) -> Days {
        self.trial.age
    }

    /// advance simulated time by dt. every threat and every entry point
    /// not yet active flips on with probability 1 - exp(-dt / rate),
    /// one independent draw each; rate 0 is admitted outright. already
    /// active events stay active, so activation is monotonic within a
    /// history. dt = 0 performs only the rate-zero admission.
    pub fn advance(&mut self, dt: Days) {
        for (i, threat) in self.model.threats().iter().enumerate() {
            if !self.trial.on[i] {
                if threat.rate == 0.0 {
                    self.trial.on[i] = true;
                } else if self.rng.random::<f64>() < 1.0 - (-dt / threat.rate).exp() {
                    self.trial.on[i] = true;
                }
            }
        }
        for node in self.model.graph().node_indices() {
            let i = node.index();
            if let Some(rate) = self.model.graph()[node].start {
                if !self.trial.started[i] {
                    if rate == 0.0 {
                        self.trial.started[i] = true;
                    } else if self.rng.random::<f64>() < 1.0 - (-dt / rate).exp() {
                        self.trial.started[i] = true;
                    }
                }
            }
        }
        self.trial.age += dt;
    }

    /// single pass of the path checker. returns whether any terminal
    /// node has been reached.
    ///
    /// the forward phase seeds a work list with every node already
    /// started or reached, then grows it breadth-first along active
    /// edges, stamping first-reach times at the current age. terminal
    /// admissions raise the hit flag, and with `stop_at_hit` the first
    /// one ends the whole sweep. the backward phase then walks the list
    /// in reverse, repeatedly, marking any node with an active edge
    /// into an involved successor as involved itself; the forward
    /// ordering tends to be topologically suggestive, so the reverse
    /// walk usually settles in one or two rounds.
    pub fn sweep(&mut self, pass: Pass) -> bool {
        let age = self.trial.age;
        let mut tree: Vec<NodeIndex> = Vec::with_capacity(self.model.size());
        let mut member = vec![false; self.model.size()];
        // arm the coincidence countdowns for this sweep
        for node in self.model.graph().node_indices() {
            if let Some(count) = self.model.graph()[node].coincidence {
                self.trial.countdown[node.index()] = count;
            }
        }
        // seed with everything already started or reached
        for node in self.model.graph().node_indices() {
            let i = node.index();
            if self.trial.started[i]
                || self.trial.hits[i].is_some()
                || self.trial.involved[i].is_some()
            {
                tree.push(node);
                member[i] = true;
                if self.trial.hits[i].is_none() {
                    self.trial.hits[i] = Some(age);
                    if self.model.is_end(node) {
                        if self.trial.involved[i].is_none() {
                            self.trial.involved[i] = Some(age);
                        }
                        self.trial.hit = true;
                    }
                }
            }
        }
        if pass.stop_at_hit && self.trial.hit {
            return true;
        }
        // forward spanning tree; the list grows while we walk it
        let mut cursor = 0;
        while cursor < tree.len() {
            let node = tree[cursor];
            cursor += 1;
            for edge in self.model.graph().edges(node) {
                if !self.trial.on[edge.weight().threat] {
                    continue;
                }
                let target = edge.target();
                let t = target.index();
                if !member[t] {
                    if self.model.graph()[target].coincidence.is_some() {
                        self.trial.countdown[t] = self.trial.countdown[t].saturating_sub(1);
                    }
                    let keeper = match pass.gate {
                        Gate::Source => node,
                        Gate::Target => target,
                    };
                    let open = match self.model.graph()[keeper].coincidence {
                        None => true,
                        Some(_) => self.trial.countdown[keeper.index()] == 0,
                    };
                    if open {
                        tree.push(target);
                        member[t] = true;
                        if self.trial.hits[t].is_none() {
                            self.trial.hits[t] = Some(age);
                        }
                        if self.model.is_end(target) {
                            if self.trial.involved[t].is_none() {
                                self.trial.involved[t] = Some(age);
                            }
                            self.trial.hit = true;
                            if pass.stop_at_hit {
                                return true;
                            }
                        }
                    }
                }
                // an involved successor involves us; cheap head start
                // for the backward closure
                if self.trial.involved[t].is_some() && self.trial.involved[node.index()].is_none() {
                    self.trial.involved[node.index()] = Some(age);
                }
            }
        }
        // backward involvement closure
        if pass.involvement {
            for _ in 0..tree.len() {
                let mut change = false;
                for &node in tree.iter().rev() {
                    let i = node.index();
                    if self.trial.involved[i].is_none() {
                        let reaches = self.model.graph().edges(node).any(|edge| {
                            self.trial.on[edge.weight().threat]
                                && self.trial.involved[edge.target().index()].is_some()
                        });
                        if reaches {
                            self.trial.involved[i] = Some(age);
                            change = true;
                        }
                    }
                }
                if !change {
                    break;
                }
            }
        }
        self.trial.hit
    }

    /// run one bounded history: repeated sweep-then-advance until the
    /// horizon, exiting early on the first hit when racing. the step
    /// count lands two checks past the horizon so activations rolled on
    /// the final increment still get observed.
    pub fn run(&mut self, horizon: Days, dt: Days, pass: Pass) -> bool {
        self.advance(0.0);
        let steps = if dt > 0.0 {
            (horizon / dt) as usize + 2
        } else {
            1
        };
        for _ in 0..steps {
            if self.sweep(pass) && pass.stop_at_hit {
                break;
            }
            self.advance(dt);
        }
        self.trial.hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::component::Component;
    use crate::model::id::Id;

    /// a chain 0 -> 1 -> ... -> n-1 with one threat per edge, entry at
    /// node 0 and terminal at node n-1
    fn chain(n: usize, rate: f64) -> Model {
        let mut model = Model::new();
        let nodes = (0..n)
            .map(|i| {
                model.component(match i {
                    0 => Component::entry(Id::from(i), 0.0),
                    _ => Component::relay(Id::from(i)),
                })
            })
            .collect::<Vec<_>>();
        for i in 0..n - 1 {
            let threat = model.threat(&format!("t{}", i), rate);
            model.vector(nodes[i], nodes[i + 1], threat);
        }
        model.terminal(nodes[n - 1]);
        model
    }

    #[test]
    fn instant_chain_hits_at_zero() {
        let model = chain(3, 0.0);
        let mut history = History::new(&model, 0);
        history.advance(0.0);
        assert!(history.sweep(Pass::thorough(true)));
        for i in 0..3 {
            assert!(history.trial().hit_time(i) == Some(0.0));
            assert!(history.trial().involved_time(i) == Some(0.0));
        }
    }

    #[test]
    fn zero_step_admits_nothing_rated() {
        let model = chain(3, 30.0);
        let mut history = History::new(&model, 0);
        history.advance(0.0);
        history.advance(0.0);
        assert!(!history.sweep(Pass::default()));
        assert!(history.trial().hit_time(0) == Some(0.0));
        assert!(history.trial().hit_time(1).is_none());
        assert!(history.age() == 0.0);
    }

    #[test]
    fn racing_freezes_later_reaches() {
        // 0 -> 1 (end) -> 2, everything instant: the terminal
        // admission must end the sweep before 2 is reached
        let mut model = Model::new();
        let a = model.component(Component::entry(Id::from(0i64), 0.0));
        let b = model.component(Component::relay(Id::from(1i64)));
        let c = model.component(Component::relay(Id::from(2i64)));
        let t = model.threat("t", 0.0);
        model.vector(a, b, t);
        model.vector(b, c, t);
        model.terminal(b);
        let mut history = History::new(&model, 0);
        history.advance(0.0);
        assert!(history.sweep(Pass::racing()));
        assert!(history.trial().hit_time(b.index()) == Some(0.0));
        assert!(history.trial().hit_time(c.index()).is_none());
    }

    #[test]
    fn dead_ends_are_hit_but_not_involved() {
        // 0 -> 1 -> 2 (end), 1 -> 3 (dead end)
        let mut model = Model::new();
        let a = model.component(Component::entry(Id::from(0i64), 0.0));
        let b = model.component(Component::relay(Id::from(1i64)));
        let c = model.component(Component::relay(Id::from(2i64)));
        let d = model.component(Component::relay(Id::from(3i64)));
        let t = model.threat("t", 0.0);
        model.vector(a, b, t);
        model.vector(b, c, t);
        model.vector(b, d, t);
        model.terminal(c);
        let mut history = History::new(&model, 0);
        history.advance(0.0);
        assert!(history.sweep(Pass::thorough(true)));
        assert!(history.trial().hit_time(d.index()) == Some(0.0));
        assert!(history.trial().involved_time(d.index()).is_none());
        for i in [a, b, c] {
            assert!(history.trial().involved_time(i.index()) == Some(0.0));
        }
    }

    #[test]
    fn cycles_terminate_and_involve_both_sides() {
        // 0 <-> 1 with 1 -> 2 (end)
        let mut model = Model::new();
        let a = model.component(Component::entry(Id::from(0i64), 0.0));
        let b = model.component(Component::relay(Id::from(1i64)));
        let c = model.component(Component::relay(Id::from(2i64)));
        let t = model.threat("t", 0.0);
        model.vector(a, b, t);
        model.vector(b, a, t);
        model.vector(b, c, t);
        model.terminal(c);
        let mut history = History::new(&model, 0);
        history.advance(0.0);
        assert!(history.sweep(Pass::thorough(true)));
        assert!(history.trial().involved_time(a.index()) == Some(0.0));
        assert!(history.trial().involved_time(b.index()) == Some(0.0));
    }

    #[test]
    fn target_gate_requires_full_coincidence() {
        // two entries converging on an AND node that feeds the end
        let mut model = Model::new();
        let a = model.component(Component::entry(Id::from(0i64), 0.0));
        let b = model.component(Component::entry(Id::from(1i64), 0.0));
        let gate = model.component(Component {
            id: Id::from(2i64),
            origin: Id::from(2i64),
            start: None,
            coincidence: Some(2),
        });
        let end = model.component(Component::relay(Id::from(3i64)));
        let t = model.threat("t", 0.0);
        model.vector(a, gate, t);
        model.vector(b, gate, t);
        model.vector(gate, end, t);
        model.terminal(end);
        let ref mut both = History::new(&model, 0);
        both.advance(0.0);
        let pass = Pass {
            gate: Gate::Target,
            ..Pass::default()
        };
        assert!(both.sweep(pass));
        assert!(both.trial().hit_time(gate.index()) == Some(0.0));
        // with one entry missing the gate never opens
        let mut lone = Model::new();
        let a = lone.component(Component::entry(Id::from(0i64), 0.0));
        let gate = lone.component(Component {
            id: Id::from(1i64),
            origin: Id::from(1i64),
            start: None,
            coincidence: Some(2),
        });
        let end = lone.component(Component::relay(Id::from(2i64)));
        let t = lone.threat("t", 0.0);
        lone.vector(a, gate, t);
        lone.vector(gate, end, t);
        lone.terminal(end);
        let ref mut one = History::new(&lone, 0);
        one.advance(0.0);
        assert!(!one.sweep(pass));
        assert!(one.trial().hit_time(gate.index()).is_none());
    }

    #[test]
    fn source_gate_admits_on_first_arrival() {
        // the default gate checks the expanding node's countdown, so a
        // gate fed by ungated sources opens on the first arrival
        let mut model = Model::new();
        let a = model.component(Component::entry(Id::from(0i64), 0.0));
        let gate = model.component(Component {
            id: Id::from(1i64),
            origin: Id::from(1i64),
            start: None,
            coincidence: Some(2),
        });
        let end = model.component(Component::relay(Id::from(2i64)));
        let t = model.threat("t", 0.0);
        model.vector(a, gate, t);
        model.vector(gate, end, t);
        model.terminal(end);
        let mut history = History::new(&model, 0);
        history.advance(0.0);
        assert!(history.sweep(Pass::default()));
        assert!(history.trial().hit_time(gate.index()) == Some(0.0));
    }

    #[test]
    fn hit_never_exceeds_involvement() {
        let ref model = crate::generate::model(24, 0.08, 6, 11);
        let mut history = History::new(model, 42);
        history.run(300.0, 10.0, Pass::thorough(true));
        let age = history.age();
        for i in 0..model.size() {
            if let Some(involved) = history.trial().involved_time(i) {
                let hit = history.trial().hit_time(i).expect("involved nodes are hit");
                assert!(hit <= involved);
                assert!(involved <= age);
            }
        }
    }

    #[test]
    fn identical_seeds_identical_histories() {
        let ref model = chain(4, 30.0);
        let mut a = History::new(model, 7);
        let mut b = History::new(model, 7);
        a.run(100.0, 5.0, Pass::thorough(true));
        b.run(100.0, 5.0, Pass::thorough(true));
        for i in 0..model.size() {
            assert!(a.trial().hit_time(i) == b.trial().hit_time(i));
            assert!(a.trial().involved_time(i) == b.trial().involved_time(i));
        }
    }
}
