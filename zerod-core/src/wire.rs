//! Wires: the edges of the block graph, each carrying one pressure and
//! one flow degree of freedom.

/// An ordered pair `(upstream_block, downstream_block)`. The order only
/// fixes the wire's name; which endpoint is "upstream" in the physical
/// sense is determined by each block's own `flow_directions` sign, not
/// by this ordering.
#[derive(Debug, Clone)]
pub struct Wire {
    pub upstream: String,
    pub downstream: String,
    /// Global index of this wire's pressure DOF; the flow DOF is `dof_p + 1`.
    pub dof_p: usize,
}

impl Wire {
    pub fn new(upstream: impl Into<String>, downstream: impl Into<String>, dof_p: usize) -> Self {
        Self {
            upstream: upstream.into(),
            downstream: downstream.into(),
            dof_p,
        }
    }

    pub fn dof_q(&self) -> usize {
        self.dof_p + 1
    }

    pub fn name_p(&self) -> String {
        format!("P_{}_{}", self.upstream, self.downstream)
    }

    pub fn name_q(&self) -> String {
        format!("Q_{}_{}", self.upstream, self.downstream)
    }

    /// True if this wire connects the two named blocks, in either order.
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.upstream == a && self.downstream == b) || (self.upstream == b && self.downstream == a)
    }
}
