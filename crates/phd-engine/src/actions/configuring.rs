use std::time::Duration;

use phd_apdu::consts::MDS_HANDLE;
use phd_apdu::{
    Apdu, ConfigObjectList, ConfigReport, ConfigReportRsp, ConfigResult, DataApdu, ErrorValue, EventInfo, EventReplyInfo,
    EventReportArgumentSimple, EventReportResultSimple, EventType, Presentation, RejectProblem, RorsChoice, RoivChoice,
};

use crate::actions::common::{abort_association, extract_apdu, extract_data_apdu, send_roer, send_rorj};
use crate::context::Context;
use crate::event::{Event, EventData};
use crate::invoke::RequestOutcome;

/// Agent: sends the `ConfirmedEventReport` carrying our `ConfigReport`,
/// tracked as a confirmed request and guarded by the config-report timer.
/// Called directly from the AARE-accepted-unknown transition rather than
/// from a dedicated table row, since sending the report is not optional
/// once the manager has asked for it.
pub(crate) fn configuring_send_config_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    let dev_config_id = ctx.mds.dev_config_id();
    let config_object_list = ctx.mds.configuration_attributes(dev_config_id).unwrap_or_else(ConfigObjectList::default);

    let report = ConfigReport { config_report_id: dev_config_id, config_object_list };
    let argument = EventReportArgumentSimple {
        obj_handle: MDS_HANDLE,
        event_time: 0,
        event_type: EventType::NotiConfig,
        event_info: EventInfo::Config(report),
    };
    let choice = RoivChoice::ConfirmedEventReport(argument.clone());

    let timeout = Duration::from_secs(ctx.config.config().timeouts.config_report_secs);
    let timer_id = ctx.arm_guard_timer(timeout);
    let deadline = *ctx.timers.get(&timer_id).expect("guard timer just armed");
    let invoke_id = ctx.invoke_tracker.send_request(choice.clone(), deadline);

    let apdu = Apdu::Prst(Presentation { data: DataApdu::Roiv { invoke_id, choice } });
    if let Err(e) = ctx.send_apdu(&apdu) {
        tracing::warn!("failed to send config report: {}", e);
    }
}

/// Manager: `WaitingForConfig` + `RxRoivConfirmedEventReport` -> `CheckingConfig`.
/// Stashes the report and hands it to the application via the listener
/// hook; the actual accept/reject decision arrives later as a `ReqAgentSupplied*`
/// application request.
pub(crate) fn configuring_transition_waiting_for_config(ctx: &mut Context, _event: Event, data: &EventData) {
    ctx.clear_guard_timer();

    let Some(DataApdu::Roiv { invoke_id, choice: RoivChoice::ConfirmedEventReport(arg) }) = extract_data_apdu(data) else { return };
    let EventInfo::Config(report) = &arg.event_info else { return };

    let invoke_id = *invoke_id;
    let report = report.clone();

    ctx.pending_config_report = Some(report.clone());
    ctx.pending_config_invoke_id = Some(invoke_id);
    ctx.notify_config_report(&report);
}

/// Manager: `WaitingForConfig` + `Timeout` -> `Unassociated`. No
/// `ConfirmedEventReport` carrying the config report arrived in time.
pub(crate) fn configuring_wait_timeout_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    tracing::warn!("timed out waiting for agent's configuration report");
    abort_association(ctx, phd_apdu::AbortReason::UndefinedReason);
}

fn send_config_response(ctx: &mut Context, config_result: ConfigResult) -> Result<(), &'static str> {
    let report = ctx.pending_config_report.take().ok_or("no pending config report")?;
    let invoke_id = ctx.pending_config_invoke_id.take().ok_or("no pending config invoke id")?;

    let result = EventReportResultSimple {
        obj_handle: MDS_HANDLE,
        event_type: EventType::NotiConfig,
        event_reply_info: EventReplyInfo::ConfigReportRsp(ConfigReportRsp { config_report_id: report.config_report_id, config_result }),
    };

    let apdu = Apdu::Prst(Presentation { data: DataApdu::Rors { invoke_id, choice: RorsChoice::ConfirmedEventReport(result) } });
    ctx.send_apdu(&apdu).map_err(|_| "send failed")
}

/// Manager: `CheckingConfig` + `ReqAgentSuppliedKnownConfig` -> `Operating`.
pub(crate) fn configuring_configuration_response_known_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    if send_config_response(ctx, ConfigResult::AcceptedConfig).is_err() {
        tracing::warn!("failed to send config report response (known)");
    }
}

/// Manager: `CheckingConfig` + `ReqAgentSuppliedUnknownConfig` -> `Operating`.
/// Functionally identical to the known-config path; kept as a distinct
/// action so the application's decision is visible in a trace.
pub(crate) fn configuring_configuration_response_unknown_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    if send_config_response(ctx, ConfigResult::UnsupportedConfig).is_err() {
        tracing::warn!("failed to send config report response (unknown, unsupported)");
    }
}

/// Manager: `CheckingConfig` + `ReqAgentSuppliedBadConfig` -> `WaitingForConfig`.
/// The config report itself was malformed rather than merely unrecognized,
/// so the reply is a RORJ against the agent's ROIV rather than a RORS.
pub(crate) fn configuring_configuration_rorj_tx(ctx: &mut Context, _event: Event, _data: &EventData) {
    ctx.pending_config_report = None;
    let Some(invoke_id) = ctx.pending_config_invoke_id.take() else {
        tracing::warn!("no pending config invoke id to reject");
        return;
    };
    send_rorj(ctx, invoke_id, RejectProblem::UnrecognizedApdu);
}

/// Agent: `ConfigSending` + `RxRorsConfirmedEventReportKnown` -> `Operating`.
/// The manager accepted the reported configuration.
pub(crate) fn configuring_configuration_accepted_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    retire_config_invoke(ctx, data);
    tracing::info!("configuration report accepted by manager");
}

/// Agent: `ConfigSending` + `RxRorsConfirmedEventReportUnknown` -> `ConfigSending`.
/// The manager rejected the reported configuration as unsupported; the
/// agent stays in `ConfigSending` and may retry with a different report.
pub(crate) fn configuring_configuration_rejected_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    retire_config_invoke(ctx, data);
    tracing::warn!("configuration report rejected by manager as unsupported");
}

/// Either role: `ConfigSending`/`WaitingApproval` (agent) or
/// `WaitingForConfig` (manager) + a CMIP ROIV the peer has no standing to
/// issue yet -> same state. Neither side's DIM view is settled until the
/// configuration round finishes; reject with a ROER rather than dropping
/// silently, matching `communication_agent_roer_no_tx`/
/// `communication_roer_tx` at these rows in the reference state tables
/// (4.23/5.23 agent side, 6.25 manager side).
pub(crate) fn configuring_roiv_reject_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(DataApdu::Roiv { invoke_id, .. }) = extract_data_apdu(data) else { return };
    send_roer(ctx, *invoke_id, ErrorValue::InvalidObjectInstance);
}

/// Manager: `CheckingConfig` + `RxRoivAllExceptConfirmedEventReport` ->
/// `Unassociated`. A CMIP request is never acceptable before the pending
/// configuration report has been accepted or rejected; reject it and tear
/// the association down, matching `communication_roer_tx`'s effect at this
/// row in the reference state table (7.25).
pub(crate) fn configuring_unexpected_roiv_reject_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    if let Some(DataApdu::Roiv { invoke_id, .. }) = extract_data_apdu(data) {
        send_roer(ctx, *invoke_id, ErrorValue::InvalidObjectInstance);
    }
    ctx.clear_guard_timer();
    ctx.invoke_tracker.drain_all();
    ctx.pending_config_report = None;
    ctx.peer_dev_config_id = None;
}

fn retire_config_invoke(ctx: &mut Context, data: &EventData) {
    let Some(apdu) = extract_apdu(data) else { return };
    if let Apdu::Prst(p) = apdu {
        if let DataApdu::Rors { invoke_id, choice } = &p.data {
            if let Some(_request) = ctx.invoke_tracker.retire(*invoke_id) {
                ctx.notify_request_complete(*invoke_id, &RequestOutcome::Success(choice.clone()));
            }
        }
    }
}
