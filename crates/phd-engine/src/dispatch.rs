use phd_apdu::{AssociationRequest, AssociationResponse, AssociationResult, ConfigResult, DataApdu, EventReplyInfo, RorsChoice, RoivChoice};
use phd_apdu::consts::DATA_PROTO_ID_20601;
use phd_core::role::Role;

use crate::context::Context;
use crate::event::{Event, EventData};

/// Turns one decoded inbound APDU into zero or more FSM events.
///
/// A DATA-apdu's RORS/ROER/RORJ is routed only if its invoke id matches an
/// outstanding request; an unmatched one is dropped here and produces no
/// event at all, per the confirmed-service exactly-once-response invariant.
/// Actual retirement of the matched request happens later, inside the
/// action the resulting event triggers, once it has `&mut Context`.
pub fn classify(ctx: &Context, apdu: phd_apdu::Apdu) -> Vec<(Event, EventData)> {
    let event = match &apdu {
        phd_apdu::Apdu::Aarq(req) => Some(classify_aarq(ctx, req)),
        phd_apdu::Apdu::Aare(resp) => Some(classify_aare(resp)),
        phd_apdu::Apdu::Rlrq(_) => Some(Event::RxRlrq),
        phd_apdu::Apdu::Rlre(_) => Some(Event::RxRlre),
        phd_apdu::Apdu::Abrt(_) => Some(Event::RxAbrt),
        phd_apdu::Apdu::Prst(p) => classify_data_apdu(ctx, &p.data),
    };

    match event {
        Some(event) => vec![(event, EventData::Inbound(apdu))],
        None => Vec::new(),
    }
}

fn classify_aarq(ctx: &Context, req: &AssociationRequest) -> Event {
    if req.data_proto_id != DATA_PROTO_ID_20601 {
        return Event::RxAarqUnacceptable;
    }
    if ctx.config.config().is_known_configuration(req.config.dev_config_id) {
        Event::RxAarqAcceptableAndKnown
    } else {
        Event::RxAarqAcceptableAndUnknown
    }
}

fn classify_aare(resp: &AssociationResponse) -> Event {
    match resp.result {
        AssociationResult::Accepted => Event::RxAareAcceptedKnown,
        AssociationResult::AcceptedUnknownConfig => Event::RxAareAcceptedUnknown,
        AssociationResult::RejectedPermanent | AssociationResult::RejectedTransient | AssociationResult::RejectedUnknownConfig => Event::RxAareRejected,
    }
}

fn classify_data_apdu(ctx: &Context, data: &DataApdu) -> Option<Event> {
    match data {
        DataApdu::Roiv { choice, .. } => Some(classify_roiv(ctx.role, choice)),
        DataApdu::Rors { invoke_id, choice } => {
            ctx.invoke_tracker.check_known(*invoke_id)?;
            Some(classify_rors(choice))
        }
        DataApdu::Roer { invoke_id, .. } => {
            ctx.invoke_tracker.check_known(*invoke_id)?;
            Some(Event::RxRoer)
        }
        DataApdu::Rorj { invoke_id, .. } => {
            ctx.invoke_tracker.check_known(*invoke_id)?;
            Some(Event::RxRorj)
        }
    }
}

/// The agent's table branches on the specific CMIP operation a ROIV carries
/// (it owns the DIM objects the operation addresses). The manager's table
/// never does — `communication_process_roiv` in the reference
/// implementation only ever distinguishes event-report shapes from
/// everything else, so every other choice collapses to the single
/// `RxRoivAllExceptConfirmedEventReport` event for that role.
fn classify_roiv(role: Role, choice: &RoivChoice) -> Event {
    match choice {
        RoivChoice::EventReport(_) => Event::RxRoivEventReport,
        RoivChoice::ConfirmedEventReport(_) => Event::RxRoivConfirmedEventReport,
        _ if role == Role::Manager => Event::RxRoivAllExceptConfirmedEventReport,
        RoivChoice::Get { .. } => Event::RxRoivGet,
        RoivChoice::Set(_) => Event::RxRoivSet,
        RoivChoice::ConfirmedSet(_) => Event::RxRoivConfirmedSet,
        RoivChoice::Action { .. } => Event::RxRoivAction,
        RoivChoice::ConfirmedAction { .. } => Event::RxRoivConfirmedAction,
    }
}

fn classify_rors(choice: &RorsChoice) -> Event {
    match choice {
        RorsChoice::Get { .. } => Event::RxRorsGet,
        RorsChoice::ConfirmedSet { .. } => Event::RxRorsConfirmedSet,
        RorsChoice::ConfirmedAction { .. } => Event::RxRorsConfirmedAction,
        RorsChoice::ConfirmedEventReport(result) => match &result.event_reply_info {
            EventReplyInfo::ConfigReportRsp(rsp) => match rsp.config_result {
                ConfigResult::AcceptedConfig => Event::RxRorsConfirmedEventReportKnown,
                ConfigResult::UnsupportedConfig => Event::RxRorsConfirmedEventReportUnknown,
            },
            EventReplyInfo::Empty | EventReplyInfo::SegmentDataResult(_) => Event::RxRorsConfirmedEventReport,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phd_apdu::{Apdu, BitcodeCodec, Presentation};
    use phd_config::{SharedConfig, StackRole};
    use phd_dim::MemoryMds;
    use phd_transport::loopback::LoopbackTransport;

    fn test_context() -> Context {
        let config = SharedConfig::new(StackRole::Manager);
        let (transport, _peer) = LoopbackTransport::pair();
        Context::new(phd_core::Role::Manager, config, Box::new(MemoryMds::new(0)), Box::new(transport), Box::new(BitcodeCodec))
    }

    #[test]
    fn unmatched_roer_invoke_id_is_dropped_silently() {
        let ctx = test_context();
        let apdu = Apdu::Prst(Presentation { data: DataApdu::Roer { invoke_id: 42, choice: phd_apdu::Roer { error_value: phd_apdu::ErrorValue::NoSuchObjectInstance } } });
        assert!(classify(&ctx, apdu).is_empty());
    }

    #[test]
    fn aarq_with_wrong_data_proto_id_is_unacceptable() {
        let ctx = test_context();
        let mut config = phd_apdu::default_association_information();
        config.system_type = 0;
        let apdu = Apdu::Aarq(AssociationRequest { assoc_version: 0x8000_0000, data_proto_id: 1, config });
        let events = classify(&ctx, apdu);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, Event::RxAarqUnacceptable);
    }

    #[test]
    fn manager_collapses_non_event_report_roiv_to_the_catch_all() {
        let ctx = test_context();
        let apdu = Apdu::Prst(Presentation { data: DataApdu::Roiv { invoke_id: 1, choice: RoivChoice::Get { obj_handle: 0 } } });
        let events = classify(&ctx, apdu);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, Event::RxRoivAllExceptConfirmedEventReport);
    }

    #[test]
    fn manager_keeps_event_report_distinct_from_the_catch_all() {
        use phd_apdu::{EventInfo, EventReportArgumentSimple, EventType};

        let ctx = test_context();
        let argument = EventReportArgumentSimple { obj_handle: 0, event_time: 0, event_type: EventType::NotiScanReportFixed, event_info: EventInfo::Raw(vec![]) };
        let apdu = Apdu::Prst(Presentation { data: DataApdu::Roiv { invoke_id: 1, choice: RoivChoice::EventReport(argument) } });
        let events = classify(&ctx, apdu);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, Event::RxRoivEventReport);
    }
}
