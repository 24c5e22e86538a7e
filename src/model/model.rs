use super::component::Component;
use super::threat::Threat;
use super::vector::Vector;
use crate::Days;
use crate::Rate;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use std::collections::BTreeMap;

/// immutable campaign topology: components wired by threat-bearing
/// edges, a table of interned threats, and the set of terminal nodes.
///
/// the graph is directed and may contain cycles, self-loops, and
/// parallel edges. a model never changes once a campaign starts; all
/// per-history mutation lives in Trial, which is keyed by the same
/// node and threat indices.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub(crate) graph: DiGraph<Component, Vector>,
    pub(crate) threats: Vec<Threat>,
    pub(crate) names: BTreeMap<String, usize>,
    pub(crate) ends: Vec<NodeIndex>,
    pub(crate) age: Days,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// intern a threat under an external name, returning its dense
    /// index. re-registering an existing name overwrites its rate, so
    /// shared (common-mode) names collapse onto a single activation.
    pub fn threat(&mut self, name: &str, rate: Rate) -> usize {
        match self.names.get(name) {
            Some(&index) => {
                self.threats[index] = Threat::from(rate);
                index
            }
            None => {
                let index = self.threats.len();
                self.threats.push(Threat::from(rate));
                self.names.insert(name.to_string(), index);
                index
            }
        }
    }

    /// append a component, returning its graph index
    pub fn component(&mut self, component: Component) -> NodeIndex {
        self.graph.add_node(component)
    }

    /// wire an edge between two components. out-of-range references
    /// are reported and skipped rather than poisoning the model.
    pub fn vector(&mut self, from: NodeIndex, to: NodeIndex, threat: usize) {
        if from.index() >= self.graph.node_count() || to.index() >= self.graph.node_count() {
            log::warn!("skipping edge with unknown endpoint {:?} -> {:?}", from, to);
        } else if threat >= self.threats.len() {
            log::warn!("skipping edge with unknown threat index {}", threat);
        } else {
            self.graph.add_edge(from, to, Vector::from(threat));
        }
    }

    /// mark a component as terminal; reaching any terminal is a hit
    pub fn terminal(&mut self, node: NodeIndex) {
        if self.ends.contains(&node) {
            log::warn!("terminal already registered: {:?}", node);
        } else {
            self.ends.push(node);
        }
    }

    pub fn graph(&self) -> &DiGraph<Component, Vector> {
        &self.graph
    }
    pub fn threats(&self) -> &[Threat] {
        &self.threats
    }
    pub fn ends(&self) -> &[NodeIndex] {
        &self.ends
    }
    pub fn size(&self) -> usize {
        self.graph.node_count()
    }
    pub fn is_end(&self, node: NodeIndex) -> bool {
        self.ends.contains(&node)
    }
}
