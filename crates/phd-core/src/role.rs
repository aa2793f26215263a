/// Which side of an association this context implements.
///
/// The two roles share the `State` enumeration and the FSM engine, but
/// consult distinct transition tables: the agent reaches out with an AARQ,
/// the manager waits and decides acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Agent,
    Manager,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Agent => write!(f, "agent"),
            Role::Manager => write!(f, "manager"),
        }
    }
}
