//! IEEE 11073-20601 Personal Health Device communication engine core.
//!
//! The engine is a pair of static, ordered transition tables — one per role
//! — driven by a single-threaded cooperative event pump (`Context::run_to_quiescence`).
//! Inbound bytes are decoded and classified into `Event`s by `dispatch`,
//! application calls enqueue their own `Event`s directly, and every table
//! row's action runs synchronously before the next event in the pump is
//! considered. Actions never re-enter the pump themselves; they push
//! further events for the next iteration to pick up.

mod actions;
mod context;
mod dispatch;
mod event;
mod fsm;
mod invoke;
mod listener;
mod pump;
mod tables;

pub use context::Context;
pub use event::{Event, EventData};
pub use fsm::{ProcessResult, TransitionRule, TransitionTable};
pub use invoke::{InvokeTracker, Request, RequestOutcome};
pub use listener::Listener;
pub use tables::table_for;
