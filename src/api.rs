use crate::montecarlo::criteria::Criteria;
use crate::montecarlo::mean::Expectation;
use crate::net::catalog::Catalog;
use crate::net::net::Net;
use crate::net::transform;
use anyhow::Context;

/// convergence criteria for the string-in/string-out analyses
const CRITERIA: Criteria = Criteria {
    window: 100,
    p_tolerance: 0.01,
    t_tolerance: 0.01,
};

/// mean-time-to-involvement analysis over a node-net JSON string:
/// expand the net into a threat graph, run the involvement campaign,
/// and hand back the same net annotated with per-node results.
pub fn mtti(input: &str) -> anyhow::Result<String> {
    analyze(input, true)
}

/// mean-time-to-compromise analysis over a node-net JSON string
pub fn mttc(input: &str) -> anyhow::Result<String> {
    analyze(input, false)
}

fn analyze(input: &str, involvement: bool) -> anyhow::Result<String> {
    let net: Net = serde_json::from_str(input).context("parse node-net")?;
    let ref catalog = Catalog::discover();
    let ref model = transform::model(&net, catalog);
    let campaign = Expectation {
        criteria: CRITERIA,
        details: true,
        involvement,
        ..Expectation::default()
    }
    .estimate(model)?;
    let annotated = transform::project(&net, model, &campaign);
    serde_json::to_string(&annotated).context("serialize node-net")
}
