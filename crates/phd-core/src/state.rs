/// Association-lifecycle state, shared between the agent and manager
/// transition tables.
///
/// Not every state is reachable by both roles: the agent never enters
/// `WaitingForConfig`/`CheckingConfig` (those are manager-side names for the
/// unknown-configuration negotiation), and the manager never enters
/// `Associating`/`ConfigSending`/`WaitingApproval` (agent-side names for the
/// same negotiation, seen from the other end of the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Disconnected,
    Unassociated,

    // Agent-side negotiation states
    Associating,
    ConfigSending,
    WaitingApproval,

    // Manager-side negotiation states
    WaitingForConfig,
    CheckingConfig,

    Operating,
    Disassociating,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Disconnected => "disconnected",
            State::Unassociated => "unassociated",
            State::Associating => "associating",
            State::ConfigSending => "config_sending",
            State::WaitingApproval => "waiting_approval",
            State::WaitingForConfig => "waiting_for_config",
            State::CheckingConfig => "checking_config",
            State::Operating => "operating",
            State::Disassociating => "disassociating",
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
