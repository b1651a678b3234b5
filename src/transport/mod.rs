//! The transport seam between a peer's proposer and every other peer's acceptor.
mod grpc_client;
mod local_network;
mod proto_convert;

pub use grpc_client::ConnectError;
pub use grpc_client::GrpcTransport;
pub use local_network::LocalNetwork;
pub use local_network::LocalTransport;

pub(crate) use proto_convert::ProtoConvertError;

use crate::peer::{AcceptArgs, AcceptReply, DecidedArgs, DecidedReply, PrepareArgs, PrepareReply};

/// PeerTransport delivers a peer's outbound RPCs, addressed by the target's index in the peer
/// list. Every call either returns the decoded reply or fails in bounded time. There are no
/// retries; the proposer's backoff loop owns retry policy. Calls to self never go through here.
#[async_trait::async_trait]
pub trait PeerTransport: Send + Sync {
    async fn prepare(&self, to: usize, args: PrepareArgs) -> Result<PrepareReply, TransportError>;
    async fn accept(&self, to: usize, args: AcceptArgs) -> Result<AcceptReply, TransportError>;
    async fn decided(&self, to: usize, args: DecidedArgs) -> Result<DecidedReply, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Peer {0} is not in the peer list")]
    UnknownPeer(usize),
    #[error("Peer unreachable: {0}")]
    Unreachable(String),
    #[error("Timed out waiting for reply")]
    Timeout,
    #[error("Malformed reply: {0}")]
    MalformedReply(String),
    #[error("Peer has been killed")]
    PeerDead,
}
