use phd_apdu::{Abort, AbortReason, Apdu, DataApdu, ErrorValue, Presentation, RejectProblem, Roer, Rorj};

use crate::context::Context;
use crate::event::{Event, EventData};

pub(crate) fn send_abort(ctx: &mut Context, reason: AbortReason) {
    let apdu = Apdu::Abrt(Abort { reason });
    if let Err(e) = ctx.send_apdu(&apdu) {
        tracing::warn!("failed to send ABRT: {}", e);
    }
}

pub(crate) fn send_roer(ctx: &mut Context, invoke_id: u16, error_value: ErrorValue) {
    let apdu = Apdu::Prst(Presentation { data: DataApdu::Roer { invoke_id, choice: Roer { error_value } } });
    if let Err(e) = ctx.send_apdu(&apdu) {
        tracing::warn!("failed to send ROER: {}", e);
    }
}

pub(crate) fn send_rorj(ctx: &mut Context, invoke_id: u16, problem: RejectProblem) {
    let apdu = Apdu::Prst(Presentation { data: DataApdu::Rorj { invoke_id, choice: Rorj { problem } } });
    if let Err(e) = ctx.send_apdu(&apdu) {
        tracing::warn!("failed to send RORJ: {}", e);
    }
}

/// Forces the association down: aborts, drops every outstanding request,
/// and clears the guard timer. Used whenever a transition lands back in
/// `Unassociated` from somewhere other than a clean release.
pub(crate) fn abort_association(ctx: &mut Context, reason: AbortReason) {
    send_abort(ctx, reason);
    ctx.clear_guard_timer();
    ctx.invoke_tracker.drain_all();
    ctx.pending_config_report = None;
    ctx.peer_dev_config_id = None;
}

/// Either role, any associated state: `RxAbrt` -> `Unassociated`. The peer
/// already told us it is tearing the association down; no ABRT is owed back.
pub(crate) fn on_abrt_received(ctx: &mut Context, _event: Event, _data: &EventData) {
    tracing::warn!("association aborted by peer");
    ctx.clear_guard_timer();
    ctx.invoke_tracker.drain_all();
    ctx.pending_config_report = None;
    ctx.peer_dev_config_id = None;
}

/// Either role, any associated state: `ReqAssocAbort` -> `Unassociated`. The
/// application gave up on the association outright.
pub(crate) fn application_requested_abort_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    abort_association(ctx, AbortReason::UndefinedReason);
}

/// Either role, any state: an AARQ/AARE/RLRQ/RLRE/PRST turned up that the
/// current state never expects (e.g. a second AARQ mid-association, or any
/// PRST before an association context exists to interpret it) ->
/// `Unassociated`, matching `communication_abort_undefined_reason_tx` at
/// these rows in the reference state tables.
pub(crate) fn unexpected_apdu_abort_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    abort_association(ctx, AbortReason::UndefinedReason);
}

pub(crate) fn extract_apdu(data: &EventData) -> Option<&Apdu> {
    match data {
        EventData::Inbound(apdu) => Some(apdu),
        _ => None,
    }
}

pub(crate) fn extract_data_apdu(data: &EventData) -> Option<&DataApdu> {
    match extract_apdu(data)? {
        Apdu::Prst(p) => Some(&p.data),
        _ => None,
    }
}
