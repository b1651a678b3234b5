use crate::peer::ballot::Ballot;
use bytes::Bytes;

// Every message carries the sender's done horizon (`done`): the highest seq its application has
// released, or `None` if it hasn't released anything yet.

#[derive(Clone, Debug)]
pub struct PrepareArgs {
    pub sender: usize,
    pub seq: u64,
    pub ballot: Ballot,
    pub done: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct PrepareReply {
    pub outcome: PrepareOutcome,
    pub done: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PrepareOutcome {
    /// The acceptor promised to ignore lower ballots, and reports what it has already accepted.
    Promised { accepted: Option<AcceptedProposal> },
    /// The acceptor already promised `promised`, which is at least as high as the requested ballot.
    Rejected { promised: Ballot },
    /// The seq is below the acceptor's forget floor.
    Forgotten,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AcceptedProposal {
    pub ballot: Ballot,
    pub value: Bytes,
}

#[derive(Clone, Debug)]
pub struct AcceptArgs {
    pub sender: usize,
    pub seq: u64,
    pub ballot: Ballot,
    pub value: Bytes,
    pub done: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct AcceptReply {
    pub outcome: AcceptOutcome,
    pub done: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AcceptOutcome {
    Accepted,
    Rejected { promised: Ballot },
    Forgotten,
}

#[derive(Clone, Debug)]
pub struct DecidedArgs {
    pub sender: usize,
    pub seq: u64,
    pub value: Bytes,
    pub done: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct DecidedReply {
    pub done: Option<u64>,
}

/// PaxosRpcHandler is the acceptor/learner side of a peer, as seen by whatever transport delivers
/// requests to it. Handlers only touch in-memory state and never block on I/O.
pub trait PaxosRpcHandler: Send + Sync {
    fn handle_prepare(&self, args: PrepareArgs) -> Result<PrepareReply, PeerDeadError>;
    fn handle_accept(&self, args: AcceptArgs) -> Result<AcceptReply, PeerDeadError>;
    fn handle_decided(&self, args: DecidedArgs) -> Result<DecidedReply, PeerDeadError>;
}

#[derive(Debug, thiserror::Error)]
#[error("Paxos peer has been killed")]
pub struct PeerDeadError;
