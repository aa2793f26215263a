use phd_core::state::State;

use crate::context::Context;
use crate::event::{Event, EventData};

/// A transition's post-action: runs after the state has been updated,
/// with the triggering event and its payload still in hand. Actions may
/// send APDUs, arm timers, or push further events onto the context's pump,
/// but must never call `fsm::process` or `Context::run_to_quiescence`
/// themselves — the pump loop is the only re-entry point, matching the
/// single-threaded cooperative model the rest of the engine assumes.
pub type ActionFn = fn(&mut Context, Event, &EventData);

/// One row of a transition table: `(state, event) -> (next_state, action)`.
/// A `next_state` equal to `state` still counts as a match; `action` may be
/// `None` for a pure state change with no side effect.
#[derive(Clone, Copy)]
pub struct TransitionRule {
    pub state: State,
    pub event: Event,
    pub next_state: State,
    pub action: Option<ActionFn>,
}

pub type TransitionTable = &'static [TransitionRule];

/// Outcome of running one event through a transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// A matching rule fired and the state changed.
    StateChanged { from: State, to: State },
    /// A matching rule fired but `next_state == state`.
    StateUnchanged(State),
    /// No rule in the table matches `(state, event)`.
    NotProcessed,
}

/// Scans `table` for the first rule matching `(ctx.state, event)`, applies
/// its state change, and runs its action. Transcribed from the reference
/// implementation's `fsm_process_evt`: a linear first-match-wins scan, not
/// a hash lookup, so row order in `tables.rs` is significant whenever two
/// rules could otherwise overlap (none do, but the algorithm does not rely
/// on that).
pub fn process(table: TransitionTable, ctx: &mut Context, event: Event, data: &EventData) -> ProcessResult {
    let from = ctx.state;

    for rule in table {
        if rule.state == from && rule.event == event {
            ctx.state = rule.next_state;

            if let Some(action) = rule.action {
                action(ctx, event, data);
            }

            return if rule.next_state == from {
                ProcessResult::StateUnchanged(from)
            } else {
                ProcessResult::StateChanged { from, to: rule.next_state }
            };
        }
    }

    ProcessResult::NotProcessed
}
