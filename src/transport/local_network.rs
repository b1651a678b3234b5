use crate::peer::{
    AcceptArgs, AcceptReply, DecidedArgs, DecidedReply, PaxosRpcHandler, PeerDeadError, PrepareArgs, PrepareReply,
};
use crate::transport::{PeerTransport, TransportError};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::time::Duration;

/// LocalNetwork is an in-process network that connects peers living in the same process, and
/// lets tests break it: partition the group, make a peer deaf, or make delivery unreliable.
///
/// Requests are delivered by calling the target's `PaxosRpcHandler` directly. A call that can't
/// be delivered fails after a short random delay, like a request lost on the wire.
#[derive(Clone, Default)]
pub struct LocalNetwork {
    state: Arc<Mutex<NetworkState>>,
}

#[derive(Default)]
struct NetworkState {
    handlers: HashMap<usize, Weak<dyn PaxosRpcHandler>>,
    // Peer -> partition group. `None` means fully connected.
    groups: Option<HashMap<usize, usize>>,
    deaf: HashSet<usize>,
    unreliable: HashSet<usize>,
}

/// Route describes how a single request will be treated, decided when it's sent.
enum Route {
    Lost,
    Deliver {
        handler: Arc<dyn PaxosRpcHandler>,
        unreliable: bool,
    },
}

const UNDELIVERABLE_MAX_DELAY_MS: u64 = 20;
const UNRELIABLE_MAX_DELAY_MS: u64 = 27;
const UNRELIABLE_DROP_PER_MILLE: u32 = 100;

impl LocalNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `handler` reachable as peer `peer`, replacing any previous registration.
    ///
    /// The network holds the handler weakly. Once every other `Arc` to it is dropped, the peer is
    /// unreachable, and a peer that sends through this network doesn't keep itself alive.
    pub fn register(&self, peer: usize, handler: Arc<dyn PaxosRpcHandler>) {
        self.lock_state().handlers.insert(peer, Arc::downgrade(&handler));
    }

    pub fn unregister(&self, peer: usize) {
        self.lock_state().handlers.remove(&peer);
    }

    /// Returns the transport that peer `me` should send through.
    pub fn endpoint(&self, me: usize) -> LocalTransport {
        LocalTransport {
            network: self.clone(),
            me,
        }
    }

    /// Splits the network into the given groups. Peers talk only within their own group; a peer
    /// that isn't listed in any group can't talk to anybody.
    pub fn partition(&self, groups: &[&[usize]]) {
        let mut group_of = HashMap::new();
        for (group_id, members) in groups.iter().enumerate() {
            for peer in members.iter() {
                group_of.insert(*peer, group_id);
            }
        }
        self.lock_state().groups = Some(group_of);
    }

    pub fn heal(&self) {
        self.lock_state().groups = None;
    }

    /// A deaf peer receives nothing, but can still send requests and hear the replies.
    pub fn set_deaf(&self, peer: usize, deaf: bool) {
        let mut state = self.lock_state();
        if deaf {
            state.deaf.insert(peer);
        } else {
            state.deaf.remove(&peer);
        }
    }

    /// Requests to an unreliable peer are delayed, and some requests and replies are dropped.
    pub fn set_unreliable(&self, peer: usize, unreliable: bool) {
        let mut state = self.lock_state();
        if unreliable {
            state.unreliable.insert(peer);
        } else {
            state.unreliable.remove(&peer);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, NetworkState> {
        self.state.lock().expect("LocalNetwork mutex guard poison")
    }

    fn route(&self, from: usize, to: usize) -> Route {
        let state = self.lock_state();

        let connected = match &state.groups {
            None => true,
            Some(group_of) => match (group_of.get(&from), group_of.get(&to)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        };
        if !connected || state.deaf.contains(&to) {
            return Route::Lost;
        }

        match state.handlers.get(&to).and_then(Weak::upgrade) {
            None => Route::Lost,
            Some(handler) => Route::Deliver {
                handler,
                unreliable: state.unreliable.contains(&to),
            },
        }
    }

    async fn deliver<R, F>(&self, from: usize, to: usize, handle: F) -> Result<R, TransportError>
    where
        F: FnOnce(&dyn PaxosRpcHandler) -> Result<R, PeerDeadError>,
    {
        let (handler, unreliable) = match self.route(from, to) {
            Route::Lost => {
                sleep_random_millis(UNDELIVERABLE_MAX_DELAY_MS).await;
                return Err(TransportError::Unreachable(format!("peer {} not reachable from {}", to, from)));
            }
            Route::Deliver { handler, unreliable } => (handler, unreliable),
        };

        if unreliable {
            sleep_random_millis(UNRELIABLE_MAX_DELAY_MS).await;
            if should_drop() {
                return Err(TransportError::Timeout);
            }
        }

        let reply = handle(handler.as_ref()).map_err(|_| TransportError::PeerDead)?;

        if unreliable && should_drop() {
            // The handler ran, but the caller never hears about it.
            return Err(TransportError::Timeout);
        }

        Ok(reply)
    }
}

fn should_drop() -> bool {
    rand::thread_rng().gen_range(0..1000) < UNRELIABLE_DROP_PER_MILLE
}

async fn sleep_random_millis(max_millis: u64) {
    let millis = rand::thread_rng().gen_range(0..=max_millis);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// LocalTransport is one peer's view of a LocalNetwork.
pub struct LocalTransport {
    network: LocalNetwork,
    me: usize,
}

#[async_trait::async_trait]
impl PeerTransport for LocalTransport {
    async fn prepare(&self, to: usize, args: PrepareArgs) -> Result<PrepareReply, TransportError> {
        self.network
            .deliver(self.me, to, move |handler| handler.handle_prepare(args))
            .await
    }

    async fn accept(&self, to: usize, args: AcceptArgs) -> Result<AcceptReply, TransportError> {
        self.network
            .deliver(self.me, to, move |handler| handler.handle_accept(args))
            .await
    }

    async fn decided(&self, to: usize, args: DecidedArgs) -> Result<DecidedReply, TransportError> {
        self.network
            .deliver(self.me, to, move |handler| handler.handle_decided(args))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::{Ballot, PrepareOutcome};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHandler {
        prepares: AtomicUsize,
    }

    impl PaxosRpcHandler for CountingHandler {
        fn handle_prepare(&self, _args: PrepareArgs) -> Result<PrepareReply, PeerDeadError> {
            self.prepares.fetch_add(1, Ordering::SeqCst);
            Ok(PrepareReply {
                outcome: PrepareOutcome::Promised { accepted: None },
                done: None,
            })
        }

        fn handle_accept(&self, _args: AcceptArgs) -> Result<AcceptReply, PeerDeadError> {
            Err(PeerDeadError)
        }

        fn handle_decided(&self, _args: DecidedArgs) -> Result<DecidedReply, PeerDeadError> {
            Ok(DecidedReply { done: Some(3) })
        }
    }

    fn prepare_args(sender: usize) -> PrepareArgs {
        PrepareArgs {
            sender,
            seq: 0,
            ballot: Ballot::new(1, sender),
            done: None,
        }
    }

    fn network_with_handlers(n: usize) -> (LocalNetwork, Vec<Arc<CountingHandler>>) {
        let network = LocalNetwork::new();
        let mut handlers = Vec::with_capacity(n);
        for peer in 0..n {
            let handler = Arc::new(CountingHandler::default());
            network.register(peer, handler.clone());
            handlers.push(handler);
        }
        (network, handlers)
    }

    #[tokio::test]
    async fn delivers_when_connected() {
        let (network, handlers) = network_with_handlers(2);
        let transport = network.endpoint(0);

        assert!(transport.prepare(1, prepare_args(0)).await.is_ok());
        let reply = transport
            .decided(
                1,
                DecidedArgs {
                    sender: 0,
                    seq: 0,
                    value: Default::default(),
                    done: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(Some(3), reply.done);
        assert_eq!(1, handlers[1].prepares.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn partition_blocks_cross_group_calls() {
        let (network, handlers) = network_with_handlers(3);
        network.partition(&[&[0, 1], &[2]]);

        assert!(network.endpoint(0).prepare(1, prepare_args(0)).await.is_ok());
        assert!(network.endpoint(0).prepare(2, prepare_args(0)).await.is_err());
        assert!(network.endpoint(2).prepare(0, prepare_args(2)).await.is_err());
        assert_eq!(0, handlers[2].prepares.load(Ordering::SeqCst));

        network.heal();
        assert!(network.endpoint(0).prepare(2, prepare_args(0)).await.is_ok());
    }

    #[tokio::test]
    async fn unlisted_peer_is_isolated() {
        let (network, _handlers) = network_with_handlers(3);
        network.partition(&[&[0, 1]]);
        assert!(network.endpoint(2).prepare(0, prepare_args(2)).await.is_err());
        assert!(network.endpoint(0).prepare(2, prepare_args(0)).await.is_err());
    }

    #[tokio::test]
    async fn deaf_peer_can_send_but_not_receive() {
        let (network, handlers) = network_with_handlers(2);
        network.set_deaf(0, true);

        assert!(network.endpoint(0).prepare(1, prepare_args(0)).await.is_ok());
        assert!(network.endpoint(1).prepare(0, prepare_args(1)).await.is_err());
        assert_eq!(0, handlers[0].prepares.load(Ordering::SeqCst));

        network.set_deaf(0, false);
        assert!(network.endpoint(1).prepare(0, prepare_args(1)).await.is_ok());
    }

    #[tokio::test]
    async fn dead_and_missing_peers_fail() {
        let (network, _handlers) = network_with_handlers(2);
        let result = network
            .endpoint(0)
            .accept(
                1,
                AcceptArgs {
                    sender: 0,
                    seq: 0,
                    ballot: Ballot::new(1, 0),
                    value: Default::default(),
                    done: None,
                },
            )
            .await;
        assert!(matches!(result, Err(TransportError::PeerDead)));

        network.unregister(1);
        assert!(network.endpoint(0).prepare(1, prepare_args(0)).await.is_err());
    }

    #[tokio::test]
    async fn dropped_handler_is_unreachable() {
        let (network, mut handlers) = network_with_handlers(2);
        let transport = network.endpoint(0);
        assert!(transport.prepare(1, prepare_args(0)).await.is_ok());

        let handler = handlers.pop().unwrap();
        let weak = Arc::downgrade(&handler);
        drop(handler);

        assert!(weak.upgrade().is_none());
        assert!(matches!(
            transport.prepare(1, prepare_args(0)).await,
            Err(TransportError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn unreliable_peer_drops_some_calls() {
        let (network, _handlers) = network_with_handlers(2);
        network.set_unreliable(1, true);

        let transport = network.endpoint(0);
        let mut failures = 0;
        for _ in 0..200 {
            if transport.prepare(1, prepare_args(0)).await.is_err() {
                failures += 1;
            }
        }
        // ~19% expected. Loose bounds keep this from flaking.
        assert!(failures > 5, "only {} failures", failures);
        assert!(failures < 100, "{} failures", failures);
    }
}
