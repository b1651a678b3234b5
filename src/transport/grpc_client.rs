use crate::grpc::grpc_paxos_client::GrpcPaxosClient;
use crate::peer::{AcceptArgs, AcceptReply, DecidedArgs, DecidedReply, PrepareArgs, PrepareReply};
use crate::transport::{PeerTransport, TransportError};
use std::convert::TryFrom;
use std::future::Future;
use std::net::SocketAddr;
use tokio::time::Duration;
use tonic::codegen::http::uri;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;

/// GrpcTransport talks to every other peer over one lazily connected gRPC channel each.
/// Every call is bounded by `rpc_timeout`, so an unreachable peer costs at most that long.
pub struct GrpcTransport {
    logger: slog::Logger,
    // Index `me` is `None`: we never call ourselves over the network.
    clients: Vec<Option<GrpcPaxosClient<Channel>>>,
    rpc_timeout: Duration,
}

impl GrpcTransport {
    /// Must be called from within a tokio runtime.
    pub fn new(
        logger: slog::Logger,
        me: usize,
        peer_addrs: &[SocketAddr],
        rpc_timeout: Duration,
    ) -> Result<Self, ConnectError> {
        let mut clients = Vec::with_capacity(peer_addrs.len());
        for (index, addr) in peer_addrs.iter().enumerate() {
            if index == me {
                clients.push(None);
                continue;
            }

            let url = format!("http://{}", addr);
            slog::debug!(logger, "Peer {} lives at {}", index, url);
            let channel = Endpoint::from_shared(url)?.connect_lazy()?;
            clients.push(Some(GrpcPaxosClient::new(channel)));
        }

        Ok(GrpcTransport {
            logger,
            clients,
            rpc_timeout,
        })
    }

    fn client(&self, to: usize) -> Result<GrpcPaxosClient<Channel>, TransportError> {
        match self.clients.get(to) {
            Some(Some(client)) => Ok(client.clone()),
            _ => Err(TransportError::UnknownPeer(to)),
        }
    }

    async fn call<F, P>(&self, to: usize, rpc: F) -> Result<P, TransportError>
    where
        F: Future<Output = Result<tonic::Response<P>, Status>>,
    {
        slog::trace!(self.logger, "ClientWire - calling peer {}", to);
        match tokio::time::timeout(self.rpc_timeout, rpc).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => Err(Self::convert_status(status)),
            Err(_timeout) => Err(TransportError::Timeout),
        }
    }

    fn convert_status(status: Status) -> TransportError {
        match status.code() {
            tonic::Code::Unavailable if status.message() == crate::server::PEER_DEAD_MESSAGE => TransportError::PeerDead,
            _ => TransportError::Unreachable(format!("{:?}", status)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid peer URI: {0}")]
    InvalidUri(#[from] uri::InvalidUri),
    #[error("Failed to set up channel: {0}")]
    Channel(#[from] tonic::transport::Error),
}

#[async_trait::async_trait]
impl PeerTransport for GrpcTransport {
    async fn prepare(&self, to: usize, args: PrepareArgs) -> Result<PrepareReply, TransportError> {
        let mut client = self.client(to)?;
        let proto_reply = self.call(to, client.prepare(crate::grpc::ProtoPrepareReq::from(args))).await?;
        slog::trace!(self.logger, "ClientWire - {:?}", proto_reply);

        PrepareReply::try_from(proto_reply).map_err(|e| TransportError::MalformedReply(e.to_string()))
    }

    async fn accept(&self, to: usize, args: AcceptArgs) -> Result<AcceptReply, TransportError> {
        let mut client = self.client(to)?;
        let proto_reply = self.call(to, client.accept(crate::grpc::ProtoAcceptReq::from(args))).await?;
        slog::trace!(self.logger, "ClientWire - {:?}", proto_reply);

        AcceptReply::try_from(proto_reply).map_err(|e| TransportError::MalformedReply(e.to_string()))
    }

    async fn decided(&self, to: usize, args: DecidedArgs) -> Result<DecidedReply, TransportError> {
        let mut client = self.client(to)?;
        let proto_reply = self.call(to, client.decided(crate::grpc::ProtoDecidedReq::from(args))).await?;
        slog::trace!(self.logger, "ClientWire - {:?}", proto_reply);

        Ok(DecidedReply::from(proto_reply))
    }
}
