use crate::api::options::PaxosOptionsValidated;
use crate::api::paxos_peer::PaxosPeer;
use crate::api::types::PaxosMemberInfo;
use crate::peer::{new_stop_signal, Peer, PeerConfig};
use crate::server::{RpcServer, RpcServerShutdownSignal};
use crate::transport::{GrpcTransport, PeerTransport};
use crate::PaxosOptions;
use std::convert::TryFrom;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::runtime::Handle;

pub struct PaxosPeerConfig {
    /// Index of this peer in `members`.
    pub me: usize,
    pub members: Vec<PaxosMemberInfo>,
    pub info_logger: slog::Logger,
    pub options: PaxosOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum PaxosPeerCreationError {
    #[error("Invalid cluster info: {0}")]
    InvalidClusterInfo(String),
    #[error("Illegal options for configuring peer: {0}")]
    IllegalOptions(String),
    #[error("my index {me} not in cluster of {num_peers} peers")]
    MeNotInCluster { me: usize, num_peers: usize },
    #[error("Must be called from within a tokio runtime")]
    NoRuntime,
}

/// Creates a peer that talks to the rest of the group over gRPC, and starts serving Paxos RPCs on
/// the address `members[me]`. The server shuts down when the peer is killed.
pub async fn try_create_paxos_peer(config: PaxosPeerConfig) -> Result<PaxosPeer, PaxosPeerCreationError> {
    if config.members.is_empty() {
        return Err(PaxosPeerCreationError::InvalidClusterInfo(
            "cluster has no members".to_string(),
        ));
    }
    check_me(config.me, config.members.len())?;
    let options = validate_options(config.options)?;

    let root_logger = config.info_logger.new(slog::o!("Peer" => config.me));
    let peer_addrs: Vec<SocketAddr> = config.members.iter().map(SocketAddr::from).collect();
    let my_server_addr = peer_addrs[config.me];

    let transport = GrpcTransport::new(root_logger.clone(), config.me, &peer_addrs, options.rpc_timeout)
        .map_err(|e| PaxosPeerCreationError::InvalidClusterInfo(e.to_string()))?;

    let (paxos_peer, peer) = build_peer(root_logger.clone(), config.me, peer_addrs.len(), Arc::new(transport), options)?;

    let shutdown_signal = RpcServerShutdownSignal::new(peer.stop_check());
    let rpc_server = RpcServer::new(root_logger, peer);
    tokio::spawn(rpc_server.run(my_server_addr, shutdown_signal));

    Ok(paxos_peer)
}

/// Creates a peer that sends through `transport`. The caller is responsible for delivering inbound
/// requests to `PaxosPeer::rpc_handler()`.
pub fn create_paxos_peer_with_transport(
    info_logger: slog::Logger,
    me: usize,
    num_peers: usize,
    transport: Arc<dyn PeerTransport>,
    options: PaxosOptions,
) -> Result<PaxosPeer, PaxosPeerCreationError> {
    check_me(me, num_peers)?;
    let options = validate_options(options)?;

    let root_logger = info_logger.new(slog::o!("Peer" => me));
    let (paxos_peer, _) = build_peer(root_logger, me, num_peers, transport, options)?;

    Ok(paxos_peer)
}

fn build_peer(
    logger: slog::Logger,
    me: usize,
    num_peers: usize,
    transport: Arc<dyn PeerTransport>,
    options: PaxosOptionsValidated,
) -> Result<(PaxosPeer, Arc<Peer>), PaxosPeerCreationError> {
    let runtime = Handle::try_current().map_err(|_| PaxosPeerCreationError::NoRuntime)?;
    let (stopper, stop_check) = new_stop_signal();

    let peer = Arc::new(Peer::new(PeerConfig {
        logger: logger.clone(),
        me,
        num_peers,
        transport,
        backoff_min: options.backoff_min,
        backoff_max: options.backoff_max,
        runtime,
        stop_check,
    }));
    slog::info!(logger, "Created peer {} of {}", me, num_peers);

    Ok((PaxosPeer::new(logger, peer.clone(), stopper), peer))
}

fn check_me(me: usize, num_peers: usize) -> Result<(), PaxosPeerCreationError> {
    if me >= num_peers {
        return Err(PaxosPeerCreationError::MeNotInCluster { me, num_peers });
    }

    Ok(())
}

fn validate_options(options: PaxosOptions) -> Result<PaxosOptionsValidated, PaxosPeerCreationError> {
    PaxosOptionsValidated::try_from(options).map_err(|e| PaxosPeerCreationError::IllegalOptions(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LocalNetwork;
    use std::net::Ipv4Addr;

    fn logger() -> slog::Logger {
        slog::Logger::root(slog::Discard, slog::o!())
    }

    #[tokio::test]
    async fn me_out_of_range_is_rejected() {
        let network = LocalNetwork::new();
        let result =
            create_paxos_peer_with_transport(logger(), 3, 3, Arc::new(network.endpoint(3)), PaxosOptions::default());
        assert!(matches!(
            result,
            Err(PaxosPeerCreationError::MeNotInCluster { me: 3, num_peers: 3 })
        ));
    }

    #[tokio::test]
    async fn empty_cluster_is_rejected() {
        let result = try_create_paxos_peer(PaxosPeerConfig {
            me: 0,
            members: vec![],
            info_logger: logger(),
            options: PaxosOptions::default(),
        })
        .await;
        assert!(matches!(result, Err(PaxosPeerCreationError::InvalidClusterInfo(_))));
    }

    #[tokio::test]
    async fn illegal_options_are_rejected() {
        let result = try_create_paxos_peer(PaxosPeerConfig {
            me: 0,
            members: vec![PaxosMemberInfo {
                ip_addr: Ipv4Addr::LOCALHOST,
                rpc_port: 6999,
            }],
            info_logger: logger(),
            options: PaxosOptions {
                backoff_min: Some(tokio::time::Duration::from_secs(2)),
                ..PaxosOptions::default()
            },
        })
        .await;
        assert!(matches!(result, Err(PaxosPeerCreationError::IllegalOptions(_))));
    }

    #[test]
    fn requires_runtime() {
        let network = LocalNetwork::new();
        let result =
            create_paxos_peer_with_transport(logger(), 0, 1, Arc::new(network.endpoint(0)), PaxosOptions::default());
        assert!(matches!(result, Err(PaxosPeerCreationError::NoRuntime)));
    }

    #[tokio::test]
    async fn killed_peer_is_dead_and_idempotent() {
        let network = LocalNetwork::new();
        let paxos_peer =
            create_paxos_peer_with_transport(logger(), 0, 1, Arc::new(network.endpoint(0)), PaxosOptions::default())
                .unwrap();
        assert!(!paxos_peer.is_dead());

        paxos_peer.kill();
        paxos_peer.kill();
        assert!(paxos_peer.is_dead());

        paxos_peer.start(0, "ignored");
        assert_eq!(None, paxos_peer.max());
    }
}
