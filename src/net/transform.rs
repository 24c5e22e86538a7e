use super::catalog::Catalog;
use super::echo;
use super::echo::Expansion;
use super::net::Findings;
use super::net::Net;
use super::net::Span;
use crate::model::component::Component;
use crate::model::id::Id;
use crate::model::model::Model;
use crate::montecarlo::campaign::Campaign;
use petgraph::graph::NodeIndex;
use std::collections::BTreeMap;

/// translate a node-net into an executable threat model.
///
/// every net node becomes an entry junction in the graph, carrying its
/// start rate and end flag; cyber components additionally expand into
/// internal threat-state nodes tagged with the originating id. plain
/// edges between unexpanded nodes become always-on threats keyed by
/// the edge id, so functional wiring is free to traverse. expansion
/// edges whose source is not an internal node attach at the owning
/// junction, which is what lets neighbors reach into a component
/// through its interfaces. malformed references are reported and
/// skipped.
pub fn model(net: &Net, catalog: &Catalog) -> Model {
    let mut model = Model::new();
    let mut translator: BTreeMap<Id, NodeIndex> = BTreeMap::new();
    // bundle spans onto their endpoints
    let mut positions: BTreeMap<&Id, usize> = BTreeMap::new();
    for (i, junction) in net.nodes.iter().enumerate() {
        positions.entry(&junction.id).or_insert(i);
    }
    let mut incoming: Vec<Vec<&Span>> = vec![Vec::new(); net.nodes.len()];
    let mut outgoing: Vec<Vec<&Span>> = vec![Vec::new(); net.nodes.len()];
    for span in &net.edges {
        match (positions.get(&span.from), positions.get(&span.to)) {
            (Some(&from), Some(&to)) => {
                outgoing[from].push(span);
                incoming[to].push(span);
            }
            _ => log::warn!("skipping edge {} with unknown endpoint", span.id),
        }
    }
    // expand the cyber components
    let expansions: Vec<Option<Expansion>> = net
        .nodes
        .iter()
        .enumerate()
        .map(|(i, junction)| match junction.data.echo {
            Some(_) => Some(echo::expand(junction, &incoming[i], &outgoing[i], catalog)),
            None => None,
        })
        .collect();
    // junctions first, then each component's internals
    for (i, junction) in net.nodes.iter().enumerate() {
        match translator.contains_key(&junction.id) {
            true => log::warn!("duplicate node id: {}", junction.id),
            false => {
                let index = model.component(Component {
                    id: junction.id.clone(),
                    origin: junction.id.clone(),
                    start: junction.data.start,
                    coincidence: None,
                });
                translator.insert(junction.id.clone(), index);
                if junction.data.end == Some(true) {
                    model.terminal(index);
                }
            }
        }
        if let Some(ref expansion) = expansions[i] {
            for internal in &expansion.nodes {
                match translator.contains_key(internal) {
                    true => log::warn!("duplicate internal node id: {}", internal),
                    false => {
                        let index = model.component(Component {
                            id: internal.clone(),
                            origin: junction.id.clone(),
                            start: None,
                            coincidence: None,
                        });
                        translator.insert(internal.clone(), index);
                    }
                }
            }
        }
    }
    // wiring: expansion edges where they exist, free spans elsewhere
    for (i, junction) in net.nodes.iter().enumerate() {
        let Some(&owner) = translator.get(&junction.id) else {
            continue;
        };
        match &expansions[i] {
            Some(expansion) => {
                for spawn in &expansion.edges {
                    if !translator.contains_key(&spawn.from) {
                        log::warn!("unknown node id: {}", spawn.from);
                        continue;
                    }
                    let Some(&to) = translator.get(&spawn.to) else {
                        log::warn!("unknown node id: {}", spawn.to);
                        continue;
                    };
                    let from = match expansion.owns(&spawn.from) {
                        true => translator[&spawn.from],
                        false => owner,
                    };
                    let threat = model.threat(&spawn.threat, spawn.rate);
                    model.vector(from, to, threat);
                }
            }
            None => {
                for span in &outgoing[i] {
                    let Some(&to) = translator.get(&span.to) else {
                        log::warn!("unknown node id: {}", span.to);
                        continue;
                    };
                    let threat = model.threat(&span.id.to_string(), 0.0);
                    model.vector(owner, to, threat);
                }
            }
        }
    }
    model
}

/// copy campaign results back onto the node-net. a net node inherits
/// the minimum MTTC (and MTTI) across every threat-graph node that
/// shares its origin, along with that node's sample list; top-level
/// aggregates and the history count ride along for histogramming.
pub fn project(net: &Net, model: &Model, campaign: &Campaign) -> Net {
    let mut out = net.clone();
    out.histories = Some(campaign.histories);
    out.mttc = Some(campaign.mttc);
    out.mtti = campaign.mtti;
    if !campaign.nodes.is_empty() {
        for junction in out.nodes.iter_mut() {
            junction.results.get_or_insert_with(Findings::default);
        }
    }
    debug_assert!(campaign.nodes.is_empty() || campaign.nodes.len() == model.size());
    for report in &campaign.nodes {
        for junction in out.nodes.iter_mut().filter(|j| j.id == report.origin) {
            let findings = junction.results.get_or_insert_with(Findings::default);
            if let Some(mttc) = report.mttc {
                if findings.mttc.is_none_or(|held| held > mttc) {
                    findings.mttc = Some(mttc);
                    findings.mttc_samples = Some(report.mttc_samples.clone());
                }
            }
            if let Some(mtti) = report.mtti {
                if findings.mtti.is_none_or(|held| held > mtti) {
                    findings.mtti = Some(mtti);
                    findings.mtti_samples = Some(report.mtti_samples.clone());
                }
            }
        }
    }
    out
}
