//! Conversation engine: the turn loop behind [`Agent::run`].
//!
//! Each run opens one session and walks a small state machine:
//!
//! ```text
//! AwaitingModel -> ProcessingResponse -> DispatchingTool -> AwaitingModel
//!                                     \-> Done
//! (any state) -> Failed
//! ```
//!
//! Only the first tool call in a response is dispatched. Tool failures are
//! reported back to the model as `{"error": ...}` results; the run itself
//! fails only on transport errors, the round-trip limit, cancellation, or an
//! expired deadline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use super::agent::Agent;
use crate::context::RunContext;
use crate::error::{CadreError, Result};
use crate::session::{ModelSession, SessionRequest};
use crate::tools::ToolExecutionContext;
use crate::types::{ContentPart, ModelResponse, ToolCallRequest, ToolResultPart};
use crate::util::timeout::{guard, with_timeout};

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    /// Concatenated text of the final response. May be empty.
    pub text: String,
    /// Number of messages sent to the model.
    pub round_trips: usize,
    /// Every tool call dispatched, in order.
    pub dispatches: Vec<DispatchRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub tool_name: String,
    /// Whether the model was sent an error payload for this call.
    pub is_error: bool,
}

#[derive(Debug)]
enum TurnState {
    AwaitingModel(Vec<ContentPart>),
    ProcessingResponse(ModelResponse),
    DispatchingTool(ToolCallRequest),
    Done(String),
    Failed(CadreError),
}

pub(crate) async fn run(agent: &Agent, prompt: &str, parent: &RunContext) -> Result<RunOutput> {
    let run_id = Uuid::new_v4();
    let span = info_span!("agent_run", agent = %agent.name(), run_id = %run_id);
    drive(agent, prompt, parent).instrument(span).await
}

async fn drive(agent: &Agent, prompt: &str, parent: &RunContext) -> Result<RunOutput> {
    agent.config().validate()?;
    let ctx = parent.enter(agent.name());

    let identity = agent.identity();
    let request = SessionRequest {
        agent: identity.name.clone(),
        model: identity.model.clone(),
        system_prompt: identity.system_prompt.clone(),
        tools: agent.registry().list_specs(),
    };
    debug!(tools = request.tools.len(), "opening model session");
    let session = guard(&ctx, agent.client().open_session(request))
        .await
        .map_err(|err| into_transport("failed to open model session", err))?;
    let mut session = OpenSession::new(session);

    let outcome = match session.live() {
        Ok(live) => Conversation::new(agent, &ctx).converse(live, prompt).await,
        Err(err) => Err(err),
    };

    match (outcome, session.close().await) {
        (Ok(output), Ok(())) => Ok(output),
        (Ok(_), Err(err)) => Err(CadreError::transport_with_source(
            "failed to close model session",
            err,
        )),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "session close failed after run error");
            Err(err)
        }
    }
}

/// Upper bound on a single `ModelSession::close`.
const SESSION_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// An open session that is closed exactly once.
///
/// A run future dropped before [`OpenSession::close`] (a parent abandoning a
/// sub-agent on tool timeout or cancellation) hands the session to a
/// background task that closes it.
struct OpenSession {
    session: Option<Box<dyn ModelSession>>,
}

impl OpenSession {
    fn new(session: Box<dyn ModelSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn live(&mut self) -> Result<&mut dyn ModelSession> {
        match self.session.as_mut() {
            Some(session) => Ok(session.as_mut()),
            None => Err(CadreError::transport("model session already closed")),
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.session.take() {
            Some(mut session) => release(session.as_mut()).await,
            None => Ok(()),
        }
    }
}

impl Drop for OpenSession {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("run abandoned before close; closing session in background");
                handle.spawn(
                    async move {
                        if let Err(err) = release(session.as_mut()).await {
                            warn!(error = %err, "background session close failed");
                        }
                    }
                    .in_current_span(),
                );
            }
            Err(_) => warn!("run abandoned outside a tokio runtime; session not closed"),
        }
    }
}

async fn release(session: &mut dyn ModelSession) -> Result<()> {
    with_timeout(SESSION_CLOSE_TIMEOUT, session.close()).await
}

struct Conversation<'a> {
    agent: &'a Agent,
    ctx: &'a RunContext,
    round_trips: usize,
    dispatches: Vec<DispatchRecord>,
}

impl<'a> Conversation<'a> {
    fn new(agent: &'a Agent, ctx: &'a RunContext) -> Self {
        Self {
            agent,
            ctx,
            round_trips: 0,
            dispatches: Vec::new(),
        }
    }

    async fn converse(mut self, session: &mut dyn ModelSession, prompt: &str) -> Result<RunOutput> {
        let mut state = TurnState::AwaitingModel(vec![ContentPart::text(prompt)]);
        loop {
            state = match state {
                TurnState::AwaitingModel(parts) => self.send(session, parts).await,
                TurnState::ProcessingResponse(response) => Self::inspect(response),
                TurnState::DispatchingTool(call) => self.dispatch(call).await,
                TurnState::Done(text) => {
                    debug!(round_trips = self.round_trips, "run complete");
                    return Ok(RunOutput {
                        text,
                        round_trips: self.round_trips,
                        dispatches: self.dispatches,
                    });
                }
                TurnState::Failed(err) => return Err(err),
            };
        }
    }

    async fn send(&mut self, session: &mut dyn ModelSession, parts: Vec<ContentPart>) -> TurnState {
        let limit = self.agent.config().max_round_trips;
        if self.round_trips >= limit {
            return TurnState::Failed(CadreError::TurnLimitExceeded { limit });
        }
        self.round_trips += 1;
        debug!(round_trip = self.round_trips, "sending to model");

        match guard(self.ctx, session.send(parts)).await {
            Ok(response) => TurnState::ProcessingResponse(response),
            Err(err) => TurnState::Failed(into_transport("model session send failed", err)),
        }
    }

    fn inspect(response: ModelResponse) -> TurnState {
        let Some(first) = response.first_tool_call() else {
            return TurnState::Done(response.text());
        };
        let dropped = response.tool_calls().len() - 1;
        if dropped > 0 {
            warn!(
                tool = %first.name,
                dropped,
                "response held several tool calls; dispatching only the first"
            );
        }
        TurnState::DispatchingTool(first.clone())
    }

    async fn dispatch(&mut self, call: ToolCallRequest) -> TurnState {
        let exec_ctx = ToolExecutionContext {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            run: self.ctx.clone(),
        };
        let outcome = self
            .agent
            .registry()
            .dispatch(&call, &exec_ctx, self.agent.config().tool_timeout())
            .await;

        let result = match outcome {
            Ok(value) => ToolResultPart::success(&call, value),
            Err(err) if err.is_recoverable() => {
                warn!(tool = %call.name, error = %err, "tool call failed; reporting to model");
                ToolResultPart::error(&call, err.to_string())
            }
            Err(err) => return TurnState::Failed(err),
        };

        self.dispatches.push(DispatchRecord {
            tool_name: call.name.clone(),
            is_error: result.is_error,
        });
        TurnState::AwaitingModel(vec![ContentPart::ToolResult(result)])
    }
}

/// Session failures end the run as transport errors; interruptions keep their kind.
fn into_transport(context: &str, err: CadreError) -> CadreError {
    match err {
        CadreError::Cancelled | CadreError::Timeout(_) | CadreError::Transport { .. } => err,
        other => CadreError::transport_with_source(context, other),
    }
}
