//! Per-run cancellation, deadline, and call-chain state.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Context threaded through every model send and every tool execution.
///
/// Cloning shares the cancellation token. [`RunContext::enter`] derives the
/// context for a nested agent run: it gets a child token, inherits the
/// deadline, and records the agent on the call chain.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
    call_chain: Vec<String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a caller-owned token; cancelling it aborts the run.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Agent names currently executing, outermost first.
    pub fn call_chain(&self) -> &[String] {
        &self.call_chain
    }

    pub fn is_active(&self, agent: &str) -> bool {
        self.call_chain.iter().any(|name| name == agent)
    }

    /// Context for a run of `agent` nested inside this one.
    pub fn enter(&self, agent: &str) -> Self {
        let mut call_chain = self.call_chain.clone();
        call_chain.push(agent.to_string());
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
            call_chain,
        }
    }
}
