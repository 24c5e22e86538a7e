use super::component::Component;
use super::id::Id;
use super::model::Model;
use crate::Days;
use crate::Rate;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// stable JSON boundary for a threat graph, used by tests and by
/// anything that wants to hand-author a model without going through
/// the node-net expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub age: Days,
    pub end: Vec<Id>,
    pub threats: BTreeMap<String, ThreatSchema>,
    pub graph: Vec<NodeSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatSchema {
    pub rate: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSchema {
    pub id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coincidence: Option<u32>,
    #[serde(default)]
    pub edges: Vec<EdgeSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSchema {
    pub to: Id,
    pub threat: Id,
}

impl Schema {
    pub fn from_json(json: &str) -> anyhow::Result<Model> {
        let schema: Schema = serde_json::from_str(json)?;
        Ok(Model::from(schema))
    }
}

impl From<Schema> for Model {
    /// unknown node or threat references are reported and the edge is
    /// omitted; the rest of the graph stands.
    fn from(schema: Schema) -> Self {
        let mut model = Model::new();
        model.age = schema.age;
        for (name, threat) in &schema.threats {
            model.threat(name, threat.rate);
        }
        let mut translator: BTreeMap<Id, NodeIndex> = BTreeMap::new();
        for node in &schema.graph {
            if translator.contains_key(&node.id) {
                log::warn!("duplicate node id: {}", node.id);
                continue;
            }
            let index = model.component(Component {
                id: node.id.clone(),
                origin: node.id.clone(),
                start: node.start_rate,
                coincidence: node.coincidence,
            });
            translator.insert(node.id.clone(), index);
        }
        for node in &schema.graph {
            let Some(&from) = translator.get(&node.id) else {
                continue;
            };
            for edge in &node.edges {
                let Some(&to) = translator.get(&edge.to) else {
                    log::warn!("unknown node id: {}", edge.to);
                    continue;
                };
                let Some(&threat) = model.names.get(&edge.threat.to_string()) else {
                    log::warn!("unknown threat id: {}", edge.threat);
                    continue;
                };
                model.vector(from, to, threat);
            }
        }
        for end in &schema.end {
            match translator.get(end) {
                Some(&node) => model.terminal(node),
                None => log::warn!("unknown terminal id: {}", end),
            }
        }
        model
    }
}

impl From<&Model> for Schema {
    fn from(model: &Model) -> Self {
        let mut names = vec![String::new(); model.threats.len()];
        for (name, &index) in &model.names {
            names[index] = name.clone();
        }
        Self {
            age: model.age,
            end: model
                .ends
                .iter()
                .map(|&end| model.graph[end].id.clone())
                .collect(),
            threats: model
                .names
                .iter()
                .map(|(name, &index)| (name.clone(), ThreatSchema { rate: model.threats[index].rate }))
                .collect(),
            graph: model
                .graph
                .node_indices()
                .map(|node| NodeSchema {
                    id: model.graph[node].id.clone(),
                    start_rate: model.graph[node].start,
                    coincidence: model.graph[node].coincidence,
                    edges: model
                        .graph
                        .edges(node)
                        .map(|edge| EdgeSchema {
                            to: model.graph[edge.target()].id.clone(),
                            threat: Id::Text(names[edge.weight().threat].clone()),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = r#"{
        "age": 0.0,
        "end": [2],
        "threats": { "a": { "rate": 30 }, "b": { "rate": 30 } },
        "graph": [
            { "id": 0, "start_rate": 0, "edges": [ { "to": 1, "threat": "a" } ] },
            { "id": 1, "edges": [ { "to": 2, "threat": "b" } ] },
            { "id": 2, "edges": [] }
        ]
    }"#;

    #[test]
    fn chain_loads() {
        let model = Schema::from_json(CHAIN).unwrap();
        assert!(model.size() == 3);
        assert!(model.graph().edge_count() == 2);
        assert!(model.ends().len() == 1);
        assert!(model.graph()[NodeIndex::new(0)].start == Some(0.0));
    }

    #[test]
    fn bad_references_are_omitted() {
        let json = r#"{
            "age": 0.0,
            "end": [1, 9],
            "threats": { "a": { "rate": 0 } },
            "graph": [
                { "id": 0, "start_rate": 0, "edges": [
                    { "to": 1, "threat": "a" },
                    { "to": 9, "threat": "a" },
                    { "to": 1, "threat": "ghost" } ] },
                { "id": 1, "edges": [] }
            ]
        }"#;
        let model = Schema::from_json(json).unwrap();
        assert!(model.graph().edge_count() == 1);
        assert!(model.ends().len() == 1);
    }

    #[test]
    fn round_trip() {
        let model = Schema::from_json(CHAIN).unwrap();
        let schema = Schema::from(&model);
        let back = Model::from(schema);
        assert!(back.size() == model.size());
        assert!(back.graph().edge_count() == model.graph().edge_count());
        assert!(back.ends() == model.ends());
    }
}
