/// an edge in the threat graph, traversable whenever its threat is on.
/// threats are interned by the model, so an edge carries only the dense
/// index into the threat table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector {
    pub threat: usize,
}

impl From<usize> for Vector {
    fn from(threat: usize) -> Self {
        Self { threat }
    }
}
