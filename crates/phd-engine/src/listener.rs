use phd_apdu::ConfigReport;
use phd_core::state::State;

use crate::invoke::RequestOutcome;

/// Observer hook for a `Context`. All callbacks run synchronously from
/// inside `Context::run_to_quiescence` and must not call back into the
/// context they were invoked from.
pub trait Listener {
    fn on_state_changed(&mut self, _from: State, _to: State) {}

    /// An unrecognized `dev_config_id` arrived in a `ConfigReport` and the
    /// manager must decide whether to accept it, accept it as unknown, or
    /// reject it (via `Context::accept_known_config` /
    /// `accept_unknown_config` / `reject_config`).
    fn on_config_report(&mut self, _report: &ConfigReport) {}

    /// A confirmed request this listener cared about has completed.
    fn on_request_complete(&mut self, _invoke_id: u16, _outcome: &RequestOutcome) {}
}
