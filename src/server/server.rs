use crate::grpc::grpc_paxos_server::{GrpcPaxos, GrpcPaxosServer};
use crate::grpc::{
    ProtoAcceptReq, ProtoAcceptResult, ProtoDecidedReq, ProtoDecidedResult, ProtoPrepareReq, ProtoPrepareResult,
};
use crate::peer::{AcceptArgs, DecidedArgs, PaxosRpcHandler, PeerDeadError, PrepareArgs};
use crate::server::RpcServerShutdownSignal;
use crate::transport::ProtoConvertError;
use std::convert::TryFrom;
use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// Status message a killed peer answers with, so callers can tell "dead" apart from "unreachable".
pub(crate) const PEER_DEAD_MESSAGE: &str = "Paxos peer has been killed";

/// RpcServer is the type that implements the Paxos gRPC interface.
pub(crate) struct RpcServer {
    logger: slog::Logger,
    handler: Arc<dyn PaxosRpcHandler>,
}

impl RpcServer {
    pub(crate) fn new(logger: slog::Logger, handler: Arc<dyn PaxosRpcHandler>) -> Self {
        RpcServer { logger, handler }
    }

    pub(crate) async fn run(self, socket_addr: SocketAddr, shutdown_signal: RpcServerShutdownSignal) {
        let logger = self.logger.clone();
        slog::info!(logger, "Listening on '{:?}'", socket_addr);

        let result = Server::builder()
            .add_service(GrpcPaxosServer::new(self))
            .serve_with_shutdown(socket_addr, shutdown_signal)
            .await;

        slog::info!(logger, "Server run() has exited: {:?}", result);
    }

    fn handle_prepare(&self, rpc_request: ProtoPrepareReq) -> Result<ProtoPrepareResult, Status> {
        let app_input = PrepareArgs::try_from(rpc_request).map_err(Self::convert_input_error)?;
        let app_result = self.handler.handle_prepare(app_input).map_err(Self::convert_dead)?;
        Ok(ProtoPrepareResult::from(app_result))
    }

    fn handle_accept(&self, rpc_request: ProtoAcceptReq) -> Result<ProtoAcceptResult, Status> {
        let app_input = AcceptArgs::try_from(rpc_request).map_err(Self::convert_input_error)?;
        let app_result = self.handler.handle_accept(app_input).map_err(Self::convert_dead)?;
        Ok(ProtoAcceptResult::from(app_result))
    }

    fn handle_decided(&self, rpc_request: ProtoDecidedReq) -> Result<ProtoDecidedResult, Status> {
        let app_input = DecidedArgs::from(rpc_request);
        let app_result = self.handler.handle_decided(app_input).map_err(Self::convert_dead)?;
        Ok(ProtoDecidedResult::from(app_result))
    }

    fn convert_input_error(e: ProtoConvertError) -> Status {
        Status::invalid_argument(e.to_string())
    }

    fn convert_dead(_: PeerDeadError) -> Status {
        Status::unavailable(PEER_DEAD_MESSAGE)
    }
}

#[async_trait::async_trait]
impl GrpcPaxos for RpcServer {
    async fn prepare(&self, rpc_request_wrapped: Request<ProtoPrepareReq>) -> Result<Response<ProtoPrepareResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_prepare(rpc_request);
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn accept(&self, rpc_request_wrapped: Request<ProtoAcceptReq>) -> Result<Response<ProtoAcceptResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_accept(rpc_request);
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn decided(&self, rpc_request_wrapped: Request<ProtoDecidedReq>) -> Result<Response<ProtoDecidedResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_decided(rpc_request);
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }
}
