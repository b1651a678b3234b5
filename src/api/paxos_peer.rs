use crate::peer::{Fate, PaxosRpcHandler, Peer, Stopper};
use bytes::Bytes;
use std::sync::Arc;

/// PaxosPeer is the application's handle on one member of a Paxos group.
///
/// None of its methods block or fail. Work happens on background tasks, and the application polls
/// `status()` to learn decisions. Dropping the handle kills the peer.
pub struct PaxosPeer {
    logger: slog::Logger,
    peer: Arc<Peer>,
    stopper: Stopper,
}

impl PaxosPeer {
    pub(super) fn new(logger: slog::Logger, peer: Arc<Peer>, stopper: Stopper) -> Self {
        PaxosPeer { logger, peer, stopper }
    }

    /// Asks the group to agree on `value` for `seq`, and returns immediately. A no-op if `seq` is
    /// already decided locally, below `min()`, or already being proposed by this peer.
    pub fn start(&self, seq: u64, value: impl Into<Bytes>) {
        self.peer.start(seq, value.into());
    }

    pub fn status(&self, seq: u64) -> Fate {
        self.peer.status(seq)
    }

    /// Tells the peer that the application no longer needs any seq `<= seq`. Smaller values than
    /// previously given are ignored.
    pub fn done(&self, seq: u64) {
        self.peer.done(seq);
    }

    /// Every seq below `min()` has been forgotten by this peer. Never decreases.
    pub fn min(&self) -> u64 {
        self.peer.min()
    }

    /// The highest seq passed to `start()` on this peer, if any.
    pub fn max(&self) -> Option<u64> {
        self.peer.max()
    }

    /// Stops serving RPCs and stops every proposer. Idempotent.
    pub fn kill(&self) {
        if !self.peer.is_dead() {
            slog::info!(self.logger, "Killing peer");
        }
        self.stopper.stop();
    }

    pub fn is_dead(&self) -> bool {
        self.peer.is_dead()
    }

    /// Number of RPCs this peer has served for other peers.
    pub fn rpc_count(&self) -> u64 {
        self.peer.rpc_count()
    }

    /// Number of instances this peer is holding in memory.
    pub fn retained_instances(&self) -> usize {
        self.peer.retained_instances()
    }

    /// The acceptor side of this peer, for registering with a transport's server.
    pub fn rpc_handler(&self) -> Arc<dyn PaxosRpcHandler> {
        self.peer.clone()
    }
}
