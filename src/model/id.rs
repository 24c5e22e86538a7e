use serde::Deserialize;
use serde::Serialize;

/// external identifier for nodes, edges, and threats at the wire
/// boundary. inputs may use integers or strings interchangeably, and
/// expansion composes new string ids out of old ones, so both shapes
/// are kept around instead of forcing one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    Text(String),
}

impl Id {
    /// derive a suffixed id, used for expansion-internal nodes
    pub fn scoped(&self, suffix: &str) -> Self {
        Self::Text(format!("{}-{}", self, suffix))
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<usize> for Id {
    fn from(n: usize) -> Self {
        Self::Number(n as i64)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_composition() {
        let id = Id::from(3i64);
        assert!(id.scoped("0") == Id::from("3-0"));
        assert!(id.scoped("0").scoped("1") == Id::from("3-0-1"));
    }

    #[test]
    fn wire_shapes() {
        let n: Id = serde_json::from_str("7").unwrap();
        let s: Id = serde_json::from_str("\"pump\"").unwrap();
        assert!(n == Id::from(7i64));
        assert!(s == Id::from("pump"));
    }
}
