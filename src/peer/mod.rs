mod backoff;
mod ballot;
mod instance;
mod paxos_rpcs;
mod peer;
mod progress;
mod proposer;
mod stop_signal;

pub use ballot::Ballot;
pub use instance::Fate;
pub use paxos_rpcs::AcceptArgs;
pub use paxos_rpcs::AcceptOutcome;
pub use paxos_rpcs::AcceptReply;
pub use paxos_rpcs::AcceptedProposal;
pub use paxos_rpcs::DecidedArgs;
pub use paxos_rpcs::DecidedReply;
pub use paxos_rpcs::PaxosRpcHandler;
pub use paxos_rpcs::PeerDeadError;
pub use paxos_rpcs::PrepareArgs;
pub use paxos_rpcs::PrepareOutcome;
pub use paxos_rpcs::PrepareReply;

pub(crate) use peer::Peer;
pub(crate) use peer::PeerConfig;
pub(crate) use stop_signal::StopCheck;
pub(crate) use stop_signal::new as new_stop_signal;
pub(crate) use stop_signal::Stopper;
