use crate::model::component::Component;
use crate::model::id::Id;
use crate::model::model::Model;
use crate::net::net::Function;
use crate::net::net::Junction;
use crate::net::net::Marking;
use crate::net::net::Net;
use crate::net::net::Questionnaire;
use crate::net::net::Span;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// random threat model: one entry, one terminal, a chain backbone so
/// connectivity never needs checking, and random extra edges drawing
/// threats from a shared rate-30 pool. `connectivity` scales the edge
/// count relative to a fully connected graph.
pub fn model(n: usize, connectivity: f64, threats: usize, seed: u64) -> Model {
    let ref mut rng = SmallRng::seed_from_u64(seed);
    let mut model = Model::new();
    let nodes = (0..n)
        .map(|i| {
            model.component(match i {
                0 => Component::entry(Id::from(i), 0.0),
                _ => Component::relay(Id::from(i)),
            })
        })
        .collect::<Vec<_>>();
    model.terminal(nodes[n - 1]);
    let pool = (0..threats)
        .map(|i| model.threat(&i.to_string(), 30.0))
        .collect::<Vec<_>>();
    let mut draw = |rng: &mut SmallRng| pool[(rng.random::<f64>() * threats as f64) as usize];
    for i in 0..n - 1 {
        let threat = draw(rng);
        model.vector(nodes[i], nodes[i + 1], threat);
    }
    let extras = (n as f64 * n as f64 * connectivity - (n as f64 - 1.0)).round() as i64;
    for _ in 0..extras.max(0) {
        // quick pick-two-without-replacement
        let from = (rng.random::<f64>() * n as f64) as usize;
        let mut to = (rng.random::<f64>() * (n as f64 - 1.0)) as usize;
        if to >= from {
            to += 1;
        }
        let threat = draw(rng);
        model.vector(nodes[from], nodes[to], threat);
    }
    model
}

/// random node-net: a tenth of the nodes are entries and a tenth are
/// terminal functional nodes, with the cyber components chained in
/// between and wired up at random to the requested connectivity
pub fn net(n: usize, connectivity: f64, seed: u64) -> Net {
    let ref mut rng = SmallRng::seed_from_u64(seed);
    let separates = (n / 10).max(1);
    let mut nodes: Vec<Junction> = Vec::with_capacity(n);
    for i in 0..separates {
        nodes.push(junction(i, Marking { start: Some(0.0), ..Marking::default() }));
    }
    for i in separates..n - separates {
        nodes.push(junction(i, Marking { echo: echo(), ..Marking::default() }));
    }
    for i in n - separates..n {
        nodes.push(junction(
            i,
            Marking {
                foxtrot: foxtrot(),
                end: Some(true),
                ..Marking::default()
            },
        ));
    }
    let mut edges: Vec<Span> = Vec::new();
    let components = separates..n - separates;
    // a chain through the components, ending on the last terminal
    for i in components.clone().take(components.len() - 1) {
        edges.push(span(edges.len(), i, i + 1, Marking { echo: echo(), ..Marking::default() }));
    }
    edges.push(span(
        edges.len(),
        n - separates - 1,
        n - 1,
        Marking { foxtrot: foxtrot(), ..Marking::default() },
    ));
    // entries reach random components, components feed every terminal
    let mut pick = |rng: &mut SmallRng| {
        separates + (rng.random::<f64>() * (n - 2 * separates) as f64) as usize
    };
    for i in 0..separates {
        let to = pick(rng);
        edges.push(span(edges.len(), i, to, Marking { echo: echo(), ..Marking::default() }));
    }
    for i in n - separates..n {
        let from = pick(rng);
        edges.push(span(edges.len(), from, i, Marking { foxtrot: foxtrot(), ..Marking::default() }));
    }
    // random component wiring until connectivity is satisfied
    while edges.len() < (connectivity * n as f64 * n as f64) as usize + 1 {
        let from = pick(rng);
        let mut to = pick(rng);
        if to == from {
            to = if to + 1 < n - separates { to + 1 } else { separates };
        }
        edges.push(span(edges.len(), from, to, Marking { echo: echo(), ..Marking::default() }));
    }
    Net {
        nodes,
        edges,
        mttc: None,
        mtti: None,
        histories: None,
    }
}

fn echo() -> Option<Questionnaire> {
    Some(Questionnaire::Name("simple".to_string()))
}

fn foxtrot() -> Option<Function> {
    Some(Function::Name("simple".to_string()))
}

fn junction(id: usize, data: Marking) -> Junction {
    Junction {
        id: Id::from(id),
        data,
        results: None,
    }
}

fn span(id: usize, from: usize, to: usize, data: Marking) -> Span {
    Span {
        id: Id::from(id),
        from: Id::from(from),
        to: Id::from(to),
        data,
    }
}
