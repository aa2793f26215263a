use std::time::Duration;

use phd_apdu::consts::MDS_HANDLE;
use phd_apdu::{
    ActionArgument, ActionResult, Apdu, DataApdu, ErrorValue, EventInfo, EventReplyInfo, EventReportArgumentSimple,
    EventReportResultSimple, OperationalState, Presentation, RejectProblem, RorsChoice, RoivChoice,
    ScannerOperationalStateSet, SegmentDataResult, SegmentDataStatus, SegmentInfo, SegmentInfoList, SetTimeInvoke,
};

use crate::actions::common::{extract_apdu, extract_data_apdu, send_roer, send_rorj};
use crate::context::Context;
use crate::event::{Event, EventData};
use crate::invoke::RequestOutcome;

// --- manager: inbound event reports -------------------------------------

/// Manager: `Operating` + `RxRoivEventReport` / `RxRoivConfirmedEventReport`
/// -> `Operating`. Unconfirmed reports are applied and dropped; confirmed
/// ones additionally owe a RORS carrying the reply the report type expects.
/// A report against the MDS handle itself (no object it actually addresses)
/// has no action to take, matching `operating_event_report`'s `NO_SUCH_ACTION`
/// ROER in the reference implementation.
pub(crate) fn operating_event_report(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(DataApdu::Roiv { invoke_id, choice }) = extract_data_apdu(data) else { return };
    let invoke_id = *invoke_id;

    let (confirmed, argument) = match choice {
        RoivChoice::EventReport(arg) => (false, arg.clone()),
        RoivChoice::ConfirmedEventReport(arg) => (true, arg.clone()),
        _ => return,
    };

    if argument.obj_handle == MDS_HANDLE && !matches!(argument.event_info, EventInfo::Config(_)) {
        if confirmed {
            send_roer(ctx, invoke_id, ErrorValue::NoSuchAction);
        }
        return;
    }

    let reply_info = match &argument.event_info {
        EventInfo::Config(_) => return, // handled by the configuring sub-protocol
        EventInfo::SegmentData(event) => {
            let status = match ctx.mds.pm_store_ingest(event.clone()) {
                Ok(()) => SegmentDataStatus::ManagerConfirm,
                Err(e) => {
                    tracing::warn!("segment ingest rejected: {}", e);
                    SegmentDataStatus::ManagerAbort
                }
            };
            EventReplyInfo::SegmentDataResult(SegmentDataResult { segment_instance: event.segment_instance, status })
        }
        EventInfo::ScanReport(_) | EventInfo::Raw(_) => EventReplyInfo::Empty,
    };

    if !confirmed {
        return;
    }

    let result = EventReportResultSimple { obj_handle: argument.obj_handle, event_type: argument.event_type, event_reply_info: reply_info };
    let apdu = Apdu::Prst(Presentation { data: DataApdu::Rors { invoke_id, choice: RorsChoice::ConfirmedEventReport(result) } });
    if let Err(e) = ctx.send_apdu(&apdu) {
        tracing::warn!("failed to send event report response: {}", e);
    }
}

/// Manager: `Operating` + `RxRoivAllExceptConfirmedEventReport` -> `Operating`.
/// The manager never serves CMIP operations addressed at it; the agent's
/// ROIV is rejected outright.
pub(crate) fn operating_roiv_non_event_report(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(DataApdu::Roiv { invoke_id, .. }) = extract_data_apdu(data) else { return };
    send_rorj(ctx, *invoke_id, RejectProblem::UnrecognizedApdu);
}

// --- manager: outbound requests to the agent's DIM ----------------------

/// Manager: `Operating` + `ReqGet` -> `Operating`.
pub(crate) fn operating_service_get_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let EventData::Get { obj_handle } = data else { return };
    let choice = RoivChoice::Get { obj_handle: *obj_handle };
    send_roiv_request(ctx, choice);
}

/// Manager: `Operating` + `ReqSetScanner` -> `Operating`. Builds a
/// `ConfirmedSet` so the manager can observe whether the agent actually
/// applied the requested operational state.
pub(crate) fn operating_set_scanner_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let EventData::SetScanner { obj_handle, state } = data else { return };
    let choice = RoivChoice::ConfirmedSet(ScannerOperationalStateSet { obj_handle: *obj_handle, state: *state });
    send_roiv_request(ctx, choice);
}

/// Manager: `Operating` + `ReqAction` -> `Operating`.
pub(crate) fn operating_action_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let EventData::Action { obj_handle, argument } = data else { return };
    let choice = RoivChoice::ConfirmedAction { obj_handle: *obj_handle, argument: argument.clone() };
    send_roiv_request(ctx, choice);
}

fn send_roiv_request(ctx: &mut Context, choice: RoivChoice) {
    let timeout = Duration::from_secs(ctx.config.config().timeouts.association_secs);
    let timer_id = ctx.arm_timer(timeout);
    let deadline = *ctx.timers.get(&timer_id).expect("timer just armed");
    let invoke_id = ctx.invoke_tracker.send_request(choice.clone(), deadline);

    let apdu = Apdu::Prst(Presentation { data: DataApdu::Roiv { invoke_id, choice } });
    if let Err(e) = ctx.send_apdu(&apdu) {
        tracing::warn!("failed to send request to agent: {}", e);
    }
}

// --- manager: responses to its own outstanding requests -----------------

fn retired_request(ctx: &mut Context, data: &EventData) -> Option<(u16, crate::invoke::Request)> {
    let apdu = extract_apdu(data)?;
    let Apdu::Prst(p) = apdu else { return None };
    let invoke_id = p.data.invoke_id();
    let request = ctx.invoke_tracker.retire(invoke_id)?;
    Some((invoke_id, request))
}

/// Manager: `Operating` + `RxRorsGet` -> `Operating`.
pub(crate) fn operating_get_response_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(Apdu::Prst(p)) = extract_apdu(data).cloned() else { return };
    let DataApdu::Rors { invoke_id, choice } = p.data else { return };
    if ctx.invoke_tracker.retire(invoke_id).is_some() {
        ctx.notify_request_complete(invoke_id, &RequestOutcome::Success(choice));
    }
}

/// Manager: `Operating` + `RxRorsConfirmedSet` -> `Operating`. Applies the
/// agent's accepted operational state back onto the manager's own shadow
/// copy of the scanner object, mirroring `operating_set_scanner_response`.
pub(crate) fn operating_set_scanner_response_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some((invoke_id, request)) = retired_request(ctx, data) else { return };
    if let RoivChoice::ConfirmedSet(set) = request.roiv_choice {
        if let Err(e) = ctx.mds.set_scanner_operational_state(set.obj_handle, set.state) {
            tracing::warn!("failed to mirror scanner state locally: {}", e);
        }
    }
    let Some(Apdu::Prst(p)) = extract_apdu(data) else { return };
    if let DataApdu::Rors { choice, .. } = &p.data {
        ctx.notify_request_complete(invoke_id, &RequestOutcome::Success(choice.clone()));
    }
}

/// Manager: `Operating` + `RxRorsConfirmedAction` -> `Operating`. Dispatches
/// on the original action type the way `operating_rors_confirmed_action_tx`
/// does, since a `SetTime` acknowledgement needs no further handling but a
/// `SegmentGetInfo`/`SegmentTrigXfer` result is meaningful to the application.
pub(crate) fn operating_rors_confirmed_action_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some((invoke_id, _request)) = retired_request(ctx, data) else { return };
    let Some(Apdu::Prst(p)) = extract_apdu(data) else { return };
    if let DataApdu::Rors { choice, .. } = &p.data {
        if let RorsChoice::ConfirmedAction { result, .. } = choice {
            match result {
                ActionResult::SetTimeOk => tracing::info!("agent clock set confirmed"),
                ActionResult::SegmentInfoList(list) => tracing::info!("agent segment info: {} segment(s)", list.segments.len()),
                ActionResult::TrigSegmDataXferRsp(rsp) => tracing::info!("segment {} transfer trigger: {:?}", rsp.segment_instance, rsp.status),
                ActionResult::Other(_) => {}
            }
        }
        ctx.notify_request_complete(invoke_id, &RequestOutcome::Success(choice.clone()));
    }
}

/// Manager: `Operating` + `RxRoer` -> `Operating`. Recovers the original
/// request's CMIP choice from the retired invoke entry so an erroring
/// `ConfirmedSet` can still log which scanner/attribute the agent rejected,
/// matching `operating_roer_confirmed_action_tx`'s use of `get_roiv_*` on
/// the tracked request.
pub(crate) fn operating_roer_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some((invoke_id, request)) = retired_request(ctx, data) else { return };
    let Some(Apdu::Prst(p)) = extract_apdu(data) else { return };
    if let DataApdu::Roer { choice, .. } = &p.data {
        tracing::warn!("agent rejected {:?} with {:?}", request.roiv_choice, choice.error_value);
        ctx.notify_request_complete(invoke_id, &RequestOutcome::Error(choice.error_value));
    }
}

/// Manager: `Operating` + `RxRorj` -> `Operating`.
pub(crate) fn operating_rorj_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some((invoke_id, request)) = retired_request(ctx, data) else { return };
    let Some(Apdu::Prst(p)) = extract_apdu(data) else { return };
    if let DataApdu::Rorj { choice, .. } = &p.data {
        tracing::warn!("agent rejected {:?} with {:?}", request.roiv_choice, choice.problem);
        ctx.notify_request_complete(invoke_id, &RequestOutcome::Reject(*choice));
    }
}

/// Both roles: `Operating` + `Timeout` -> `Operating`. A confirmed request's
/// guard timer fired with no response; retire it as timed out rather than
/// leaving it open forever.
pub(crate) fn operating_confirmed_timeout_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let EventData::TimerFired(timer_id) = data else { return };
    if let Some(request) = ctx.invoke_tracker.retire_by_timer(*timer_id) {
        tracing::warn!("confirmed request {:?} timed out waiting for a response", request.roiv_choice);
        ctx.notify_request_complete(request.invoke_id, &RequestOutcome::TimedOut);
    }
}

// --- agent: serving the manager's CMIP operations -----------------------

/// Agent: `Operating` + `RxRoivGet` -> `Operating`. The DIM here only knows
/// about scanner objects; anything else is `NoSuchObjectInstance`.
pub(crate) fn operating_agent_get_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(DataApdu::Roiv { invoke_id, choice: RoivChoice::Get { obj_handle } }) = extract_data_apdu(data) else { return };
    let invoke_id = *invoke_id;
    let obj_handle = *obj_handle;

    match ctx.mds.get_scanner(obj_handle) {
        Ok(scanner) => {
            let attributes = encode_operational_state(scanner.operational_state);
            let apdu = Apdu::Prst(Presentation { data: DataApdu::Rors { invoke_id, choice: RorsChoice::Get { obj_handle, attributes } } });
            if let Err(e) = ctx.send_apdu(&apdu) {
                tracing::warn!("failed to send Get response: {}", e);
            }
        }
        Err(_) => send_roer(ctx, invoke_id, ErrorValue::NoSuchObjectInstance),
    }
}

fn encode_operational_state(state: OperationalState) -> Vec<u8> {
    vec![match state {
        OperationalState::Disabled => 0,
        OperationalState::Enabled => 1,
        OperationalState::NotAvailable => 2,
    }]
}

/// Agent: `Operating` + `RxRoivSet` -> `Operating`. Unconfirmed: applied
/// silently, no response owed.
pub(crate) fn operating_agent_set_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(DataApdu::Roiv { choice: RoivChoice::Set(set), .. }) = extract_data_apdu(data) else { return };
    if let Err(e) = ctx.mds.set_scanner_operational_state(set.obj_handle, set.state) {
        tracing::warn!("unconfirmed scanner set failed: {}", e);
    }
}

/// Agent: `Operating` + `RxRoivConfirmedSet` -> `Operating`.
pub(crate) fn operating_agent_confirmed_set_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(DataApdu::Roiv { invoke_id, choice: RoivChoice::ConfirmedSet(set) }) = extract_data_apdu(data) else { return };
    let invoke_id = *invoke_id;
    let set = *set;

    match ctx.mds.set_scanner_operational_state(set.obj_handle, set.state) {
        Ok(()) => {
            let apdu = Apdu::Prst(Presentation { data: DataApdu::Rors { invoke_id, choice: RorsChoice::ConfirmedSet { obj_handle: set.obj_handle } } });
            if let Err(e) = ctx.send_apdu(&apdu) {
                tracing::warn!("failed to send ConfirmedSet response: {}", e);
            }
        }
        Err(_) => send_roer(ctx, invoke_id, ErrorValue::NoSuchObjectInstance),
    }
}

/// Agent: `Operating` + `RxRoivAction` -> `Operating`. Unconfirmed actions
/// are applied for their side effect only; no result is meaningful to send
/// back, so only `SegmentClear` (the one action with no reply payload) is
/// honored here.
pub(crate) fn operating_agent_action_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(DataApdu::Roiv { choice: RoivChoice::Action { argument, .. }, .. }) = extract_data_apdu(data) else { return };
    if let ActionArgument::SegmentClear { segment_instance, .. } = argument {
        if let Err(e) = ctx.mds.pm_store_clear(*segment_instance) {
            tracing::warn!("unconfirmed segment clear failed: {}", e);
        }
    }
}

/// Agent: `Operating` + `RxRoivConfirmedAction` -> `Operating`. Dispatches
/// on the action type, matching `operating_rors_confirmed_action_tx`'s
/// `MDC_ACT_*` branches in the reference implementation.
pub(crate) fn operating_agent_confirmed_action_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let Some(DataApdu::Roiv { invoke_id, choice: RoivChoice::ConfirmedAction { obj_handle, argument } }) = extract_data_apdu(data) else { return };
    let invoke_id = *invoke_id;
    let obj_handle = *obj_handle;
    let argument = argument.clone();

    let result = match argument {
        ActionArgument::SetTime(SetTimeInvoke { date_time_epoch_secs }) => {
            ctx.mds.clock_set_epoch_secs(date_time_epoch_secs);
            Ok(ActionResult::SetTimeOk)
        }
        ActionArgument::SegmentClear { segment_instance, .. } => match ctx.mds.pm_store_clear(segment_instance) {
            Ok(()) => Ok(ActionResult::SetTimeOk),
            Err(e) => Err(e),
        },
        ActionArgument::SegmentGetInfo { .. } => match ctx.mds.pm_store_segment(obj_handle) {
            Some(record) => {
                let segments = SegmentInfoList { segments: vec![SegmentInfo { segment_instance: record.segment_instance, info: record.data }] };
                Ok(ActionResult::SegmentInfoList(segments))
            }
            None => Err(phd_dim::DimError::NoSuchObjectInstance { obj_handle }),
        },
        ActionArgument::SegmentTrigXfer { segment_instance, .. } => {
            let status = if ctx.mds.pm_store_segment(segment_instance).is_some() {
                phd_apdu::TrigSegmDataXferStatus::Success
            } else {
                phd_apdu::TrigSegmDataXferStatus::Fail
            };
            Ok(ActionResult::TrigSegmDataXferRsp(phd_apdu::TrigSegmDataXferRsp { segment_instance, status }))
        }
        ActionArgument::Other(_) => Err(phd_dim::DimError::InvalidArgumentValue { obj_handle }),
    };

    match result {
        Ok(result) => {
            let apdu = Apdu::Prst(Presentation { data: DataApdu::Rors { invoke_id, choice: RorsChoice::ConfirmedAction { obj_handle, result } } });
            if let Err(e) = ctx.send_apdu(&apdu) {
                tracing::warn!("failed to send ConfirmedAction response: {}", e);
            }
        }
        Err(_) => send_roer(ctx, invoke_id, ErrorValue::NoSuchObjectInstance),
    }
}

/// Agent: `Operating` + `ReqSendEvent` -> `Operating`. Unconfirmed event
/// reports (e.g. periodic scan data) carry no invoke tracking.
pub(crate) fn operating_agent_send_event_tx(ctx: &mut Context, _event: Event, data: &EventData) {
    let EventData::SendEvent(argument) = data else { return };
    send_agent_event(ctx, argument.clone(), false);
}

fn send_agent_event(ctx: &mut Context, argument: EventReportArgumentSimple, confirmed: bool) {
    let choice = if confirmed { RoivChoice::ConfirmedEventReport(argument) } else { RoivChoice::EventReport(argument) };
    let invoke_id = if confirmed {
        let timeout = Duration::from_secs(ctx.config.config().timeouts.config_report_secs);
        let timer_id = ctx.arm_timer(timeout);
        let deadline = *ctx.timers.get(&timer_id).expect("timer just armed");
        ctx.invoke_tracker.send_request(choice.clone(), deadline)
    } else {
        0
    };

    let apdu = Apdu::Prst(Presentation { data: DataApdu::Roiv { invoke_id, choice } });
    if let Err(e) = ctx.send_apdu(&apdu) {
        tracing::warn!("failed to send event report: {}", e);
    }
}
