use super::catalog::Catalog;
use super::net::Answers;
use super::net::Behavior;
use super::net::Function;
use super::net::Junction;
use super::net::Marking;
use super::net::Questionnaire;
use super::net::Span;
use crate::Days;
use crate::Rate;
use crate::model::id::Id;

/// questionnaire-driven expansion of a cyber component into its
/// internal threat states.
///
/// every component carries a user-mode and a kernel-mode execution
/// node, every incoming interface contributes an interface-access
/// node, and the questionnaire answers decide which concept edges wire
/// them together. threat concept ids:
///
///   1   abuse of native code
///   2   abuse of pivot functions
///   3   authentication implementation flaw
///   4   change of controlled parameters (free)
///   5   denial of local services
///   6   denial of network services
///   7   exploitation of poor memory management
///   8   impersonation (sometimes free)
///   9   indicator / alert manipulation
///   10  injecting faults
///   11  interface device use (free)
///   12  interface overload
///   13  no authentication (free)
///   14  no user mode / kernel mode differentiation (free)
///   15  privilege management implementation flaw
///   16  resource manipulation
///   17  sensor repurposing (input, free)
///   18  sensor repurposing (output, free)
///
/// internal node ids are derived from the component id: `{id}-0` user
/// mode, `{id}-1` kernel mode, `{edge}-{id}-0` interface access.

/// observed vulnerability-discovery counts per concept, indexed by
/// concept id; zero observations make a concept free
const SAMPLES: [u32; 19] = [0, 27, 7, 22, 0, 26, 13, 11, 0, 8, 16, 0, 23, 0, 0, 19, 9, 0, 0];
const POPULATION: f64 = 96.0;
const MONTH: Days = 30.42;

/// mean days between discoveries of a concept, scaled by the
/// questionnaire answer factor
pub fn rate(concept: usize, factor: f64) -> Rate {
    match SAMPLES[concept] {
        0 => 0.0,
        observed => MONTH * factor * POPULATION / observed as f64,
    }
}

/// a threat-graph fragment spawned by expanding one component
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub nodes: Vec<Id>,
    pub edges: Vec<Spawn>,
}

impl Expansion {
    pub fn owns(&self, id: &Id) -> bool {
        self.nodes.contains(id)
    }
}

/// one expansion edge with its resolved threat identity and rate
#[derive(Debug, Clone)]
pub struct Spawn {
    pub from: Id,
    pub to: Id,
    pub threat: String,
    pub rate: Rate,
}

/// the key scoping threat identities; sharing one across locations
/// couples their activations into a common mode
fn common(data: &Marking, id: &Id) -> String {
    data.common.clone().unwrap_or_else(|| id.to_string())
}

fn standard<const N: usize>(questions: [&str; N]) -> Answers {
    questions
        .into_iter()
        .map(|question| (question.to_string(), 1.0))
        .collect()
}

/// resolve a component questionnaire against the catalog, falling
/// back to the standard component model
fn component(questionnaire: &Questionnaire, catalog: &Catalog) -> Answers {
    match questionnaire {
        Questionnaire::Answers(answers) => answers.clone(),
        Questionnaire::Name(name) => match catalog.nodes.get(name) {
            Some(answers) => answers.clone(),
            None => standard(["q8a", "q8b", "q8c"]),
        },
    }
}

/// resolve an incoming-interface questionnaire
fn inbound(questionnaire: &Questionnaire, catalog: &Catalog) -> Answers {
    match questionnaire {
        Questionnaire::Answers(answers) => answers.clone(),
        Questionnaire::Name(name) => match catalog.edges.get(name) {
            Some(answers) => answers.clone(),
            None => standard(["q4a", "q4b", "q4c", "q5a", "q6", "q6a"]),
        },
    }
}

/// resolve an outgoing-interface questionnaire
fn outbound(questionnaire: &Questionnaire, catalog: &Catalog) -> Answers {
    match questionnaire {
        Questionnaire::Answers(answers) => answers.clone(),
        Questionnaire::Name(name) => match catalog.edges.get(name) {
            Some(answers) => answers.clone(),
            None => standard(["q1"]),
        },
    }
}

/// resolve a functional dependency; "simple" rides on every incoming
/// interface with the standard answers
fn behavior(function: &Function, incoming: &[&Span]) -> Behavior {
    match function {
        Function::Record(behavior) => behavior.clone(),
        Function::Name(name) => match name.as_str() {
            "simple" => Behavior {
                from: incoming.iter().map(|span| span.id.clone()).collect(),
                answers: standard(["q2", "q4c", "q7"]),
            },
            other => {
                log::warn!("unknown function model: {}", other);
                Behavior::default()
            }
        },
    }
}

/// expand one component into internal nodes and concept edges
pub fn expand(
    junction: &Junction,
    incoming: &[&Span],
    outgoing: &[&Span],
    catalog: &Catalog,
) -> Expansion {
    let Some(ref questionnaire) = junction.data.echo else {
        return Expansion::default();
    };
    let answers = component(questionnaire, catalog);
    let key = common(&junction.data, &junction.id);
    let user = junction.id.scoped("0");
    let kernel = junction.id.scoped("1");
    let mut nodes = vec![user.clone(), kernel.clone()];
    let mut edges: Vec<Spawn> = Vec::new();
    let mut spawn = |from: &Id, to: &Id, key: &str, concept: usize, factor: f64| {
        edges.push(Spawn {
            from: from.clone(),
            to: to.clone(),
            threat: format!("{}-{}", key, concept),
            rate: rate(concept, factor),
        });
    };
    // escalation inside the component
    if let Some(&factor) = answers.get("q8") {
        spawn(&user, &kernel, &key, 14, factor);
    }
    if let Some(&factor) = answers.get("q8a") {
        spawn(&user, &kernel, &key, 7, factor);
    }
    if let Some(&factor) = answers.get("q8b") {
        spawn(&user, &kernel, &key, 15, factor);
    }
    // every incoming interface gets an access node; its questionnaire
    // decides how far an attacker gets through it
    for span in incoming {
        let access = Id::Text(format!("{}-{}-0", span.id, junction.id));
        nodes.push(access.clone());
        if let Some(ref questionnaire) = span.data.echo {
            let answers = inbound(questionnaire, catalog);
            let key = common(&span.data, &span.id);
            if let Some(&factor) = answers.get("q5") {
                spawn(&span.from, &access, &key, 13, factor);
            }
            if let Some(&factor) = answers.get("q5a") {
                spawn(&span.from, &access, &key, 3, factor);
            }
            if let Some(&factor) = answers.get("q5b") {
                spawn(&span.from, &access, &key, 8, factor);
            }
            if let Some(&factor) = answers.get("q6a") {
                spawn(&access, &user, &key, 12, factor);
            }
            if let Some(&factor) = answers.get("q6") {
                spawn(&access, &user, &key, 1, factor);
            }
        }
    }
    // outgoing edges: functional dependencies can be denied through
    // the interfaces they ride on, cyber interfaces grant onward use
    for span in outgoing {
        if let Some(ref function) = span.data.foxtrot {
            let behavior = behavior(function, incoming);
            let key = common(&span.data, &span.id);
            for carrier in incoming.iter().filter(|j| behavior.from.contains(&j.id)) {
                if let Some(ref questionnaire) = carrier.data.echo {
                    let answers = inbound(questionnaire, catalog);
                    let access = Id::Text(format!("{}-{}-0", carrier.id, junction.id));
                    if let Some(&factor) = answers.get("q4a") {
                        spawn(&carrier.from, &span.to, &key, 6, factor);
                    }
                    if let Some(&factor) = answers.get("q4b") {
                        spawn(&access, &span.to, &key, 16, factor);
                    }
                    if let Some(&factor) = answers.get("q6a") {
                        spawn(&access, &span.to, &key, 10, factor);
                    }
                }
            }
            if let Some(&factor) = behavior.answers.get("q7") {
                spawn(&user, &span.to, &key, 5, factor);
            }
            if let Some(&factor) = behavior.answers.get("q4c") {
                spawn(&user, &span.to, &key, 9, factor);
            }
            if let Some(&factor) = behavior.answers.get("q2") {
                spawn(&kernel, &span.to, &key, 4, factor);
            }
        }
        if let Some(ref questionnaire) = span.data.echo {
            let outward = outbound(questionnaire, catalog);
            let key = common(&span.data, &span.id);
            if let Some(&factor) = outward.get("q1") {
                spawn(&kernel, &span.to, &key, 1, factor);
            }
            if let Some(&factor) = answers.get("q8c") {
                spawn(&user, &span.to, &common(&junction.data, &junction.id), 2, factor);
            }
        }
    }
    Expansion { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_concepts_have_rates() {
        assert!((rate(1, 1.0) - 30.42 * 96.0 / 27.0).abs() < 1e-9);
        assert!((rate(7, 2.0) - 30.42 * 2.0 * 96.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn unobserved_concepts_are_free() {
        for concept in [0, 4, 8, 11, 13, 14, 17, 18] {
            assert!(rate(concept, 1.0) == 0.0);
        }
    }

    fn junction(id: i64, data: Marking) -> Junction {
        Junction {
            id: Id::from(id),
            data,
            results: None,
        }
    }

    fn span(id: i64, from: i64, to: i64, data: Marking) -> Span {
        Span {
            id: Id::from(id),
            from: Id::from(from),
            to: Id::from(to),
            data,
        }
    }

    #[test]
    fn standard_component_shape() {
        let ref catalog = Catalog::default();
        let node = junction(
            1,
            Marking {
                echo: Some(Questionnaire::Name("simple".to_string())),
                ..Marking::default()
            },
        );
        let into = span(
            10,
            0,
            1,
            Marking {
                echo: Some(Questionnaire::Name("simple".to_string())),
                ..Marking::default()
            },
        );
        let out = span(
            11,
            1,
            2,
            Marking {
                echo: Some(Questionnaire::Name("simple".to_string())),
                ..Marking::default()
            },
        );
        let expansion = expand(&node, &[&into], &[&out], catalog);
        // user mode, kernel mode, one interface access node
        assert!(expansion.nodes.len() == 3);
        assert!(expansion.owns(&Id::from("1-0")));
        assert!(expansion.owns(&Id::from("1-1")));
        assert!(expansion.owns(&Id::from("10-1-0")));
        // q8a, q8b escalations; q5a, q6, q6a through the interface;
        // q1 and q8c onward
        assert!(expansion.edges.len() == 7);
        assert!(expansion.edges.iter().any(|s| s.threat == "1-7"));
        assert!(expansion.edges.iter().any(|s| s.threat == "10-3"));
        assert!(expansion.edges.iter().any(|s| s.threat == "11-1"));
        assert!(expansion.edges.iter().any(|s| s.threat == "1-2"));
    }

    #[test]
    fn functional_dependencies_ride_interfaces() {
        let ref catalog = Catalog::default();
        let node = junction(
            1,
            Marking {
                echo: Some(Questionnaire::Name("simple".to_string())),
                ..Marking::default()
            },
        );
        let into = span(
            10,
            0,
            1,
            Marking {
                echo: Some(Questionnaire::Name("simple".to_string())),
                ..Marking::default()
            },
        );
        let out = span(
            11,
            1,
            2,
            Marking {
                foxtrot: Some(Function::Name("simple".to_string())),
                ..Marking::default()
            },
        );
        let expansion = expand(&node, &[&into], &[&out], catalog);
        // denial concepts from the carried interface: q4a, q4b, q6a
        assert!(expansion.edges.iter().any(|s| s.threat == "11-6"));
        assert!(expansion.edges.iter().any(|s| s.threat == "11-16"));
        assert!(expansion.edges.iter().any(|s| s.threat == "11-10"));
        // and the component's own functional concepts: q7, q4c, q2
        assert!(expansion.edges.iter().any(|s| s.threat == "11-5"));
        assert!(expansion.edges.iter().any(|s| s.threat == "11-9"));
        assert!(expansion.edges.iter().any(|s| s.threat == "11-4"));
        // change of controlled parameters is a free concept
        let change = expansion.edges.iter().find(|s| s.threat == "11-4").unwrap();
        assert!(change.rate == 0.0);
    }

    #[test]
    fn common_keys_couple_threats() {
        let ref catalog = Catalog::default();
        let node = junction(
            1,
            Marking {
                echo: Some(Questionnaire::Name("simple".to_string())),
                common: Some("fleet".to_string()),
                ..Marking::default()
            },
        );
        let expansion = expand(&node, &[], &[], catalog);
        assert!(expansion.edges.iter().all(|s| s.threat.starts_with("fleet-")));
    }

    #[test]
    fn components_without_echo_stay_flat() {
        let node = junction(0, Marking { start: Some(0.0), ..Marking::default() });
        let expansion = expand(&node, &[], &[], &Catalog::default());
        assert!(expansion.nodes.is_empty());
        assert!(expansion.edges.is_empty());
    }
}
