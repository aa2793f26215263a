use std::time::Duration;

use phd_apdu::{Apdu, ReleaseRequest, ReleaseRequestReason, ReleaseResponse, ReleaseResponseReason};

use crate::actions::common::abort_association;
use crate::context::Context;
use crate::event::{Event, EventData};

/// Both roles: `Operating` + `ReqAssocRelease` -> `Disassociating`. Sends an
/// RLRQ with the normal reason and arms the release guard timer, matching
/// `disassociating_release_request_normal_tx`.
pub(crate) fn disassociating_release_request_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    let apdu = Apdu::Rlrq(ReleaseRequest { reason: ReleaseRequestReason::Normal });
    if let Err(e) = ctx.send_apdu(&apdu) {
        tracing::warn!("failed to send RLRQ: {}", e);
        return;
    }

    let timeout = Duration::from_secs(ctx.config.config().timeouts.release_secs);
    ctx.arm_guard_timer(timeout);
}

/// Both roles: `Operating` + `RxRlrq` -> `Unassociated`. The peer released
/// first; answer with an RLRE and drop the association cleanly, no ABRT
/// owed, matching `disassociating_release_response_tx_normal`.
pub(crate) fn disassociating_release_response_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    let apdu = Apdu::Rlre(ReleaseResponse { reason: ReleaseResponseReason::Normal });
    if let Err(e) = ctx.send_apdu(&apdu) {
        tracing::warn!("failed to send RLRE: {}", e);
    }
    ctx.clear_guard_timer();
    ctx.invoke_tracker.drain_all();
    ctx.pending_config_report = None;
    ctx.peer_dev_config_id = None;
}

/// Both roles: `Disassociating` + `RxRlre` -> `Unassociated`. The peer
/// confirmed our release request; nothing further to send.
pub(crate) fn disassociating_release_confirmed_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    ctx.clear_guard_timer();
    ctx.invoke_tracker.drain_all();
    ctx.pending_config_report = None;
    ctx.peer_dev_config_id = None;
    tracing::info!("association released cleanly");
}

/// Both roles: `Disassociating` + `Timeout` -> `Unassociated`. No RLRE
/// arrived within the guard window; the release degrades into an abort.
pub(crate) fn disassociating_timeout_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    tracing::warn!("release request timed out waiting for RLRE");
    abort_association(ctx, phd_apdu::AbortReason::UndefinedReason);
}

/// Both roles: `Disassociating` + any in-flight RORS/ROER/RORJ -> `Unassociated`.
/// A confirmed response arriving after we already asked to release is
/// erratum behavior in the original protocol text; the reference
/// implementation resolves it by aborting undefined-reason rather than
/// processing the response, via `communication_abort_undefined_reason_tx`.
pub(crate) fn disassociating_abort_erratum_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    tracing::warn!("confirmed response arrived while disassociating; aborting");
    abort_association(ctx, phd_apdu::AbortReason::UndefinedReason);
}
