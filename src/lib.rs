//! Inbox triage: classifies emails as Productive or Unproductive and
//! suggests a reply.

pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod llm;
pub mod pipeline;
pub mod reply;
