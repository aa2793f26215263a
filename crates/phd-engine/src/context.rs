use std::collections::HashMap;
use std::time::Duration;

use phd_apdu::{ActionArgument, Apdu, Codec, ConfigReport, EventReportArgumentSimple, OperationalState};
use phd_config::SharedConfig;
use phd_core::error::EngineError;
use phd_core::role::Role;
use phd_core::state::State;
use phd_core::timers::{Deadline, TimerId};
use phd_dim::Mds;
use phd_transport::{Transport, TransportEvent};

use crate::dispatch;
use crate::event::{Event, EventData};
use crate::fsm::{self, ProcessResult};
use crate::invoke::{InvokeTracker, RequestOutcome};
use crate::listener::Listener;
use crate::pump::EventPump;
use crate::tables;

/// All mutable state for one side of one association: role, FSM state,
/// the three external collaborators (DIM, transport, codec), the invoke
/// tracker, the pending event queue, armed timers, and anything a
/// `ConfigReport` decision is waiting on.
///
/// `Context` is driven exclusively through `run_to_quiescence`: every public
/// `request_*` method only enqueues an event, it never calls `fsm::process`
/// directly, so an application can batch several requests before draining
/// the pump.
pub struct Context {
    pub role: Role,
    pub state: State,
    pub config: SharedConfig,
    pub mds: Box<dyn Mds>,
    pub transport: Box<dyn Transport>,
    pub codec: Box<dyn Codec>,
    pub invoke_tracker: InvokeTracker,
    pub pump: EventPump,
    pub listeners: Vec<Box<dyn Listener>>,
    /// Bumped on every disconnect so a timer armed before it can be told
    /// apart from one armed after, even if both share a `TimerId` value
    /// after wraparound.
    pub generation: u64,
    pub timers: HashMap<TimerId, Deadline>,
    next_timer_id: u64,
    /// The single per-state guard timer (association / release / config
    /// report), if one is currently armed. Kept separate from per-invoke
    /// deadlines so an action leaving the guarded state can cancel exactly
    /// the right timer without scanning `timers` for it.
    pub guard_timer: Option<TimerId>,
    /// Manager only: a `ConfigReport` awaiting `accept_known_config` /
    /// `accept_unknown_config` / `reject_config`.
    pub pending_config_report: Option<ConfigReport>,
    /// The invoke id the agent's `ConfirmedEventReport` ROIV carried; the
    /// manager's RORS/RORJ response must echo it back.
    pub pending_config_invoke_id: Option<u16>,
    /// The peer's `dev_config_id`, learned from its AARQ/AARE.
    pub peer_dev_config_id: Option<u16>,
}

impl Context {
    pub fn new(role: Role, config: SharedConfig, mds: Box<dyn Mds>, transport: Box<dyn Transport>, codec: Box<dyn Codec>) -> Self {
        Self {
            role,
            state: State::Disconnected,
            config,
            mds,
            transport,
            codec,
            invoke_tracker: InvokeTracker::new(),
            pump: EventPump::new(),
            listeners: Vec::new(),
            generation: 0,
            timers: HashMap::new(),
            next_timer_id: 0,
            guard_timer: None,
            pending_config_report: None,
            pending_config_invoke_id: None,
            peer_dev_config_id: None,
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(listener);
    }

    pub fn notify_request_complete(&mut self, invoke_id: u16, outcome: &RequestOutcome) {
        for listener in &mut self.listeners {
            listener.on_request_complete(invoke_id, outcome);
        }
    }

    pub fn notify_config_report(&mut self, report: &ConfigReport) {
        for listener in &mut self.listeners {
            listener.on_config_report(report);
        }
    }

    pub fn push_event(&mut self, event: Event, data: EventData) {
        self.pump.push_back(event, data);
    }

    pub fn push_prio_event(&mut self, event: Event, data: EventData) {
        self.pump.push_prio(event, data);
    }

    /// Arms a new timer against the current generation and returns its id.
    pub fn arm_timer(&mut self, timeout: Duration) -> TimerId {
        let id = TimerId(self.next_timer_id);
        self.next_timer_id = self.next_timer_id.wrapping_add(1);
        let deadline = Deadline::from_now(id, self.generation, timeout);
        self.timers.insert(id, deadline);
        id
    }

    pub fn cancel_timer(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }

    /// Arms the single per-state guard timer, cancelling whichever one was
    /// previously armed (there is only ever one live at a time: the
    /// association/AARE guard, the release guard, or the config-report
    /// guard, depending on which state is current).
    pub fn arm_guard_timer(&mut self, timeout: Duration) -> TimerId {
        self.clear_guard_timer();
        let id = self.arm_timer(timeout);
        self.guard_timer = Some(id);
        id
    }

    pub fn clear_guard_timer(&mut self) {
        if let Some(id) = self.guard_timer.take() {
            self.cancel_timer(id);
        }
    }

    /// Encodes and sends an APDU, translating transport/codec failures into
    /// an `EngineError` the caller can log or fold into an abort.
    pub fn send_apdu(&mut self, apdu: &Apdu) -> Result<(), EngineError> {
        let bytes = self.codec.encode_apdu(apdu).map_err(|e| EngineError::Decode { reason: e.to_string() })?;
        self.transport.send(&bytes).map_err(|e| EngineError::TransportFailure { reason: e.to_string() })
    }

    /// Opens the transport and enqueues the `TransportConnection` event that
    /// lifts a fresh `Context` out of `Disconnected`. The one entry point a
    /// binary needs to bring a `Context` up; everything past it is driven by
    /// `run_to_quiescence` and the `request_*` methods.
    pub fn connect(&mut self) -> Result<(), EngineError> {
        self.transport.connect().map_err(|e| EngineError::TransportFailure { reason: e.to_string() })?;
        self.push_event(Event::TransportConnection, EventData::None);
        Ok(())
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.timers.clear();
        self.guard_timer = None;
        self.pending_config_report = None;
        self.pending_config_invoke_id = None;
        self.invoke_tracker.drain_all();
    }

    /// Drains the transport's pending events, decoding bytes into APDUs and
    /// classifying them into FSM events via `dispatch`. Must run before
    /// draining the pump on each pass of `run_to_quiescence`.
    fn poll_transport(&mut self) {
        for event in self.transport.poll_events() {
            match event {
                TransportEvent::Connected => {
                    self.config.state_write().connected = true;
                    self.push_event(Event::TransportConnection, EventData::None);
                }
                TransportEvent::Disconnected => {
                    self.config.state_write().connected = false;
                    self.bump_generation();
                    self.push_event(Event::TransportDisconnect, EventData::None);
                }
                TransportEvent::Bytes { payload, .. } => match self.codec.decode_apdu(&payload) {
                    Ok(apdu) => {
                        for (event, data) in dispatch::classify(self, apdu) {
                            self.push_event(event, data);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("inbound bytes failed to decode, aborting association: {}", e);
                        self.push_prio_event(Event::ReqAssocAbort, EventData::None);
                    }
                },
            }
        }
    }

    /// Retires any timer whose deadline has elapsed under the current
    /// generation, feeding a `Timeout` event into the pump for each.
    fn poll_timers(&mut self) {
        let generation = self.generation;
        let fired: Vec<TimerId> = self
            .timers
            .iter()
            .filter(|(_, d)| d.generation == generation && d.has_elapsed())
            .map(|(id, _)| *id)
            .collect();

        for id in fired {
            self.timers.remove(&id);
            self.push_event(Event::Timeout, EventData::TimerFired(id));
        }
    }

    /// Runs the pump to exhaustion: poll the transport, poll timers, then
    /// process every queued event through the table for this role, one at
    /// a time, until nothing is left. Actions may enqueue further events;
    /// those are processed in the same call before it returns.
    pub fn run_to_quiescence(&mut self) {
        loop {
            self.poll_transport();
            self.poll_timers();

            let Some((event, data)) = self.pump.pop_front() else { break };
            let table = tables::table_for(self.role);

            match fsm::process(table, self, event, &data) {
                ProcessResult::StateChanged { from, to } => {
                    for listener in &mut self.listeners {
                        listener.on_state_changed(from, to);
                    }
                }
                ProcessResult::StateUnchanged(_) => {}
                ProcessResult::NotProcessed => {
                    tracing::trace!("{:?} not processed in state {}", event, self.state);
                }
            }
        }
    }

    // --- application-facing requests -----------------------------------

    pub fn request_associate(&mut self) {
        self.push_event(Event::ReqAssoc, EventData::None);
    }

    pub fn request_release(&mut self) {
        self.push_event(Event::ReqAssocRelease, EventData::None);
    }

    pub fn request_abort(&mut self) {
        self.push_prio_event(Event::ReqAssocAbort, EventData::None);
    }

    pub fn request_send_event(&mut self, argument: EventReportArgumentSimple) {
        self.push_event(Event::ReqSendEvent, EventData::SendEvent(argument));
    }

    pub fn request_send_config(&mut self) {
        self.push_event(Event::ReqSendConfig, EventData::None);
    }

    pub fn request_get(&mut self, obj_handle: u16) {
        self.push_event(Event::ReqGet, EventData::Get { obj_handle });
    }

    pub fn request_set_scanner(&mut self, obj_handle: u16, state: OperationalState) {
        self.push_event(Event::ReqSetScanner, EventData::SetScanner { obj_handle, state });
    }

    pub fn request_action(&mut self, obj_handle: u16, argument: ActionArgument) {
        self.push_event(Event::ReqAction, EventData::Action { obj_handle, argument });
    }

    /// Manager only: accepts the pending `ConfigReport`'s `dev_config_id` as
    /// already known (skipping the negotiation round).
    pub fn accept_known_config(&mut self) {
        self.push_event(Event::ReqAgentSuppliedKnownConfig, EventData::None);
    }

    /// Manager only: accepts the pending `ConfigReport` as a new, previously
    /// unseen configuration.
    pub fn accept_unknown_config(&mut self) {
        self.push_event(Event::ReqAgentSuppliedUnknownConfig, EventData::None);
    }

    /// Manager only: rejects the pending `ConfigReport` as unsupported.
    pub fn reject_config(&mut self) {
        self.push_event(Event::ReqAgentSuppliedBadConfig, EventData::None);
    }
}
