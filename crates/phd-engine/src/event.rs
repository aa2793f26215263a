use phd_apdu::{ActionArgument, Apdu, EventReportArgumentSimple, OperationalState};
use phd_core::timers::TimerId;

/// Every stimulus the FSM engine can process: transport indications,
/// application requests, and inbound-APDU events (including the PRST
/// sub-classifications the dispatcher derives).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    TransportConnection,
    TransportDisconnect,
    Timeout,

    ReqAssoc,
    ReqAssocRelease,
    ReqAssocAbort,
    ReqSendEvent,
    ReqSendConfig,
    ReqAgentSuppliedUnknownConfig,
    ReqAgentSuppliedKnownConfig,
    ReqAgentSuppliedBadConfig,
    ReqSetScanner,
    ReqAction,
    ReqGet,

    RxAarq,
    RxAarqAcceptableAndKnown,
    RxAarqAcceptableAndUnknown,
    RxAarqUnacceptable,
    RxAare,
    RxAareAcceptedKnown,
    RxAareAcceptedUnknown,
    RxAareRejected,
    RxRlrq,
    RxRlre,
    RxAbrt,
    RxPrst,

    RxRoiv,
    RxRoivEventReport,
    RxRoivConfirmedEventReport,
    RxRoivGet,
    RxRoivSet,
    RxRoivConfirmedSet,
    RxRoivAction,
    RxRoivConfirmedAction,
    /// Manager only: synthesized by `dispatch::classify` for any ROIV that is
    /// neither an `EventReport` nor a `ConfirmedEventReport`. The manager's
    /// table never branches on the specific CMIP operation the way the
    /// agent's does — see `communication_process_roiv` in the reference
    /// implementation's operating module.
    RxRoivAllExceptConfirmedEventReport,

    RxRors,
    RxRorsGet,
    RxRorsConfirmedEventReport,
    RxRorsConfirmedEventReportKnown,
    RxRorsConfirmedEventReportUnknown,
    RxRorsConfirmedSet,
    RxRorsConfirmedAction,
    RxRoer,
    RxRorj,
}

/// Payload accompanying an `Event`. Inbound-APDU events carry the decoded
/// APDU; application-request events carry whatever the caller supplied.
#[derive(Debug, Clone)]
pub enum EventData {
    None,
    Inbound(Apdu),
    SendEvent(EventReportArgumentSimple),
    SetScanner { obj_handle: u16, state: OperationalState },
    Action { obj_handle: u16, argument: ActionArgument },
    Get { obj_handle: u16 },
    /// Accompanies `Event::Timeout`: identifies which armed deadline fired,
    /// so an action can tell a stale invoke timeout from the guard on the
    /// current state (the FSM table itself only keys on `(state, event)`).
    TimerFired(TimerId),
}
