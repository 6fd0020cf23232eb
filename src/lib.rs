//! Cadre: tool-calling agents over an abstract model session.
//!
//! An [`Agent`](agent::Agent) owns a registry of tools and a handle to a
//! [`ModelClient`](session::ModelClient). Each run opens a session,
//! advertises the tool menu, and loops: send, inspect the response, dispatch
//! at most one tool call, feed the result back. The loop ends on a text-only
//! response. Tool failures are reported to the model rather than ending the
//! run, and any agent can be registered on another as a sub-agent tool.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use cadre::prelude::*;
//!
//! # async fn example(client: Arc<dyn ModelClient>) -> cadre::error::Result<()> {
//! let mut agent = Agent::new(AgentIdentity::new("assistant"), client);
//! agent.register_tool(AgentTool::new(
//!     "get_weather",
//!     "Current weather for a city",
//!     Schema::object().string("city", "City name", true).build(),
//!     |args, _ctx| async move {
//!         let city = args.get_str("city")?;
//!         Ok(serde_json::json!({ "city": city, "forecast": "sunny" }))
//!     },
//! ));
//!
//! let answer = agent.run("What's the weather in Paris?").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod prelude;
pub mod schema;
pub mod session;
pub mod tools;
pub mod types;
pub mod util;
