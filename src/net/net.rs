use crate::Days;
use crate::Rate;
use crate::model::id::Id;
use crate::montecarlo::campaign::Aggregate;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// the domain-facing graph of components and interfaces, prior to the
/// expansion that produces an executable threat graph. this is the
/// JSON boundary: analysis reads one of these in and hands the same
/// structure back with result fields attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    pub nodes: Vec<Junction>,
    pub edges: Vec<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mttc: Option<Aggregate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtti: Option<Aggregate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histories: Option<usize>,
}

/// a node of the node-net
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Junction {
    pub id: Id,
    #[serde(rename = "trace data", default)]
    pub data: Marking,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Findings>,
}

/// an edge of the node-net
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub id: Id,
    pub from: Id,
    pub to: Id,
    #[serde(rename = "trace data", default)]
    pub data: Marking,
}

/// model data carried by a node or edge. a node should carry one of
/// `start` (an entry point), `echo` (a cyber component expanded into
/// internal threat states), or `foxtrot` (a functional OR-gate relay);
/// an edge carries `echo` (a cyber interface) or `foxtrot` (a
/// functional dependency). `common` shares threat identities across
/// locations for common-mode coupling, and `end` marks analysis
/// terminals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Marking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo: Option<Questionnaire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foxtrot: Option<Function>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common: Option<String>,
}

/// questionnaire answers keyed by question id, each a scale factor on
/// the concept's base discovery rate
pub type Answers = BTreeMap<String, f64>;

/// a cyber questionnaire: either a named entry ("simple" or a catalog
/// key) or the answer record itself
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Questionnaire {
    Name(String),
    Answers(Answers),
}

/// a functional dependency: either the literal "simple" or an explicit
/// record of answers plus the incoming interfaces it rides on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Function {
    Name(String),
    Record(Behavior),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Behavior {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<Id>,
    #[serde(flatten)]
    pub answers: Answers,
}

/// per-node results attached after a campaign
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Findings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mttc: Option<Days>,
    #[serde(rename = "mttc samples", skip_serializing_if = "Option::is_none")]
    pub mttc_samples: Option<Vec<Days>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtti: Option<Days>,
    #[serde(rename = "mtti samples", skip_serializing_if = "Option::is_none")]
    pub mtti_samples: Option<Vec<Days>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = r#"{
        "nodes": [
            { "id": 0, "trace data": { "start": 0 } },
            { "id": 1, "trace data": { "echo": "Windows_XP_Desktop" } },
            { "id": 2, "trace data": { "foxtrot": "simple", "end": true } }
        ],
        "edges": [
            { "id": 0, "from": 0, "to": 1, "trace data": { "echo": "IP" } },
            { "id": 1, "from": 1, "to": 2, "trace data": { "foxtrot": "simple" } }
        ]
    }"#;

    #[test]
    fn wire_format_parses() {
        let net: Net = serde_json::from_str(SIMPLE).unwrap();
        assert!(net.nodes.len() == 3);
        assert!(net.edges.len() == 2);
        assert!(net.nodes[0].data.start == Some(0.0));
        assert!(net.nodes[2].data.end == Some(true));
        assert!(matches!(net.nodes[1].data.echo, Some(Questionnaire::Name(_))));
    }

    #[test]
    fn explicit_answers_parse() {
        let json = r#"{ "id": "pump", "trace data": { "echo": { "q8a": 1.0, "q8b": 0.5 }, "common": "plc" } }"#;
        let junction: Junction = serde_json::from_str(json).unwrap();
        let Some(Questionnaire::Answers(ref answers)) = junction.data.echo else {
            panic!("expected answers");
        };
        assert!(answers["q8a"] == 1.0);
        assert!(answers["q8b"] == 0.5);
        assert!(junction.data.common.as_deref() == Some("plc"));
    }

    #[test]
    fn behavior_record_keeps_from_list() {
        let json = r#"{ "q2": 1.0, "q7": 2.0, "from": [0, "edge-3"] }"#;
        let behavior: Behavior = serde_json::from_str(json).unwrap();
        assert!(behavior.from.len() == 2);
        assert!(behavior.answers["q7"] == 2.0);
        assert!(!behavior.answers.contains_key("from"));
    }

    #[test]
    fn round_trip_is_lossless() {
        let net: Net = serde_json::from_str(SIMPLE).unwrap();
        let json = serde_json::to_string(&net).unwrap();
        let back: Net = serde_json::from_str(&json).unwrap();
        assert!(back.nodes.len() == net.nodes.len());
        assert!(back.edges.len() == net.edges.len());
        assert!(json.contains("trace data"));
        assert!(!json.contains("results"));
    }
}
