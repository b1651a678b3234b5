mod api;
mod peer;
mod server;
mod transport;
mod grpc {
    include!("../generated/paxos.rs");
}

pub use api::create_paxos_peer_with_transport;
pub use api::try_create_paxos_peer;
pub use api::PaxosMemberInfo;
pub use api::PaxosOptions;
pub use api::PaxosPeer;
pub use api::PaxosPeerConfig;
pub use api::PaxosPeerCreationError;
pub use peer::AcceptArgs;
pub use peer::AcceptOutcome;
pub use peer::AcceptReply;
pub use peer::AcceptedProposal;
pub use peer::Ballot;
pub use peer::DecidedArgs;
pub use peer::DecidedReply;
pub use peer::Fate;
pub use peer::PaxosRpcHandler;
pub use peer::PeerDeadError;
pub use peer::PrepareArgs;
pub use peer::PrepareOutcome;
pub use peer::PrepareReply;
pub use transport::ConnectError;
pub use transport::GrpcTransport;
pub use transport::LocalNetwork;
pub use transport::LocalTransport;
pub use transport::PeerTransport;
pub use transport::TransportError;

// `crate::{root_mod}` holds no code. Just `mod` and `pub use` statements.
// No `mod` is `pub`. Types are exported through individual `pub use` statements.
