//! Link capability contracts.
//!
//! Each role is a minimal "connect exactly once" protocol: the first link
//! wins, later attempts leave the slot unchanged and are reported by the
//! caller. The ordering roles (Start/Startup Before/After) are the one
//! exception — they accept an insertion-ordered set of peers.

use crate::nodes::node::NodeId;

/// Names of the link capability roles a node kind may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    Flow,
    Object,
    Team,
    Office,
    Pool,
    TeamOversight,
    StartBefore,
    StartAfter,
    StartupBefore,
    StartupAfter,
}

impl LinkRole {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkRole::Flow => "flow",
            LinkRole::Object => "object",
            LinkRole::Team => "team",
            LinkRole::Office => "office",
            LinkRole::Pool => "pool",
            LinkRole::TeamOversight => "team oversight",
            LinkRole::StartBefore => "start before",
            LinkRole::StartAfter => "start after",
            LinkRole::StartupBefore => "startup before",
            LinkRole::StartupAfter => "startup after",
        }
    }
}

/// Single-valued link state: holds at most one peer, first write wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkSlot {
    target: Option<NodeId>,
}

impl LinkSlot {
    pub const fn new() -> Self {
        Self { target: None }
    }

    /// Attempt to link. Returns `true` when newly linked; `false` leaves the
    /// existing target in place (the caller raises the duplicate-link issue).
    pub fn link(&mut self, target: NodeId) -> bool {
        if self.target.is_some() {
            return false;
        }
        self.target = Some(target);
        true
    }

    pub fn get(&self) -> Option<NodeId> {
        self.target
    }

    pub fn is_linked(&self) -> bool {
        self.target.is_some()
    }
}

/// Set-valued link state for the ordering roles.
///
/// Peers are kept in insertion order; re-adding a peer is idempotent rather
/// than an issue, since ordering constraints are naturally a set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkSet {
    peers: Vec<NodeId>,
}

impl LinkSet {
    pub const fn new() -> Self {
        Self { peers: Vec::new() }
    }

    /// Returns `true` when the peer was newly added.
    pub fn add(&mut self, peer: NodeId) -> bool {
        if self.peers.contains(&peer) {
            return false;
        }
        self.peers.push(peer);
        true
    }

    pub fn peers(&self) -> &[NodeId] {
        &self.peers
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Borrowed view of one role's state on a node kind, dispatched by pattern
/// match over the kind variant.
pub enum RoleState<'a> {
    Single(&'a mut LinkSlot),
    Set(&'a mut LinkSet),
}
