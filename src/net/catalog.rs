use super::net::Answers;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// named questionnaire entries for components and interfaces. a
/// catalog lives in an `echo.json` next to the process; nets that name
/// entries the catalog lacks fall back to the standard models.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub nodes: BTreeMap<String, Answers>,
    #[serde(default)]
    pub edges: BTreeMap<String, Answers>,
}

impl Catalog {
    const PATH: &'static str = "echo.json";

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse catalog {}", path.display()))
    }

    /// best-effort discovery at expansion time; an absent catalog just
    /// means every named entry resolves to its standard model
    pub fn discover() -> Self {
        match Self::load(Path::new(Self::PATH)) {
            Ok(catalog) => catalog,
            Err(reason) => {
                log::debug!("no echo catalog: {:#}", reason);
                Self::default()
            }
        }
    }
}
