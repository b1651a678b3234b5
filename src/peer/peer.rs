use crate::peer::ballot::{Ballot, BallotAllocator};
use crate::peer::instance::{DecideResult, Fate, InstanceTable};
use crate::peer::paxos_rpcs::{
    AcceptArgs, AcceptOutcome, AcceptReply, DecidedArgs, DecidedReply, PaxosRpcHandler, PeerDeadError, PrepareArgs,
    PrepareOutcome, PrepareReply,
};
use crate::peer::progress::ProgressTracker;
use crate::peer::proposer::Proposer;
use crate::peer::stop_signal::StopCheck;
use crate::transport::PeerTransport;
use bytes::Bytes;
use std::cmp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::time::Duration;

pub(crate) struct PeerConfig {
    pub(crate) logger: slog::Logger,
    pub(crate) me: usize,
    pub(crate) num_peers: usize,
    pub(crate) transport: Arc<dyn PeerTransport>,
    pub(crate) backoff_min: Duration,
    pub(crate) backoff_max: Duration,
    pub(crate) runtime: Handle,
    pub(crate) stop_check: StopCheck,
}

/// Peer is one member of a Paxos group. It is an acceptor for every seq, and runs a proposer task
/// for every seq the local application has asked it to drive to a decision.
///
/// All mutable state sits behind one mutex, which is never held across an `.await`.
pub(crate) struct Peer {
    logger: slog::Logger,
    me: usize,
    num_peers: usize,
    state: Mutex<PeerState>,
    transport: Arc<dyn PeerTransport>,
    backoff_min: Duration,
    backoff_max: Duration,
    runtime: Handle,
    stop_check: StopCheck,
    rpc_count: AtomicU64,
}

struct PeerState {
    instances: InstanceTable,
    progress: ProgressTracker,
    ballots: BallotAllocator,
    max_started: Option<u64>,
}

impl Peer {
    pub(crate) fn new(config: PeerConfig) -> Self {
        let state = PeerState {
            instances: InstanceTable::new(),
            progress: ProgressTracker::new(config.me, config.num_peers),
            ballots: BallotAllocator::new(config.me),
            max_started: None,
        };

        Peer {
            logger: config.logger,
            me: config.me,
            num_peers: config.num_peers,
            state: Mutex::new(state),
            transport: config.transport,
            backoff_min: config.backoff_min,
            backoff_max: config.backoff_max,
            runtime: config.runtime,
            stop_check: config.stop_check,
            rpc_count: AtomicU64::new(0),
        }
    }

    // ------- Application API --------

    pub(crate) fn start(self: &Arc<Self>, seq: u64, value: Bytes) {
        if self.is_dead() {
            return;
        }

        {
            let mut state = self.lock_state();
            state.max_started = Some(state.max_started.map_or(seq, |max| cmp::max(max, seq)));

            if !state.instances.try_claim_proposer(seq) {
                slog::debug!(
                    self.logger,
                    "Not proposing seq {}: forgotten, decided, or already being proposed",
                    seq
                );
                return;
            }
        }

        let proposer = Proposer::new(self.clone(), seq, value, self.stop_check.clone());
        self.runtime.spawn(proposer.run());
    }

    pub(crate) fn status(&self, seq: u64) -> Fate {
        self.lock_state().instances.fate(seq)
    }

    pub(crate) fn done(&self, seq: u64) {
        if self.is_dead() {
            return;
        }

        let mut state = self.lock_state();
        if state.progress.record(self.me, Some(seq)) {
            self.forget_if_floor_advanced(&mut state);
        }
    }

    pub(crate) fn min(&self) -> u64 {
        self.lock_state().instances.floor()
    }

    pub(crate) fn max(&self) -> Option<u64> {
        self.lock_state().max_started
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.stop_check.should_stop()
    }

    pub(crate) fn stop_check(&self) -> StopCheck {
        self.stop_check.clone()
    }

    pub(crate) fn rpc_count(&self) -> u64 {
        self.rpc_count.load(Ordering::Relaxed)
    }

    pub(crate) fn retained_instances(&self) -> usize {
        self.lock_state().instances.len()
    }

    // ------- Proposer support --------

    pub(crate) fn logger(&self) -> &slog::Logger {
        &self.logger
    }

    pub(crate) fn me(&self) -> usize {
        self.me
    }

    pub(crate) fn transport(&self) -> &Arc<dyn PeerTransport> {
        &self.transport
    }

    pub(crate) fn backoff_bounds(&self) -> (Duration, Duration) {
        (self.backoff_min, self.backoff_max)
    }

    pub(crate) fn majority(&self) -> usize {
        (self.num_peers / 2) + 1
    }

    pub(crate) fn remote_peers(&self) -> impl Iterator<Item = usize> {
        let me = self.me;
        (0..self.num_peers).filter(move |peer| *peer != me)
    }

    pub(crate) fn local_done(&self) -> Option<u64> {
        self.lock_state().progress.local_done()
    }

    /// False once the proposer for `seq` has nothing left to do: the peer is dead, the seq is
    /// decided locally, or it has been forgotten.
    pub(crate) fn should_keep_proposing(&self, seq: u64) -> bool {
        !self.is_dead() && self.status(seq) == Fate::Pending
    }

    pub(crate) fn next_ballot(&self) -> Ballot {
        self.lock_state().ballots.next_ballot()
    }

    pub(crate) fn observe_ballot(&self, ballot: Ballot) {
        self.lock_state().ballots.observe(ballot);
    }

    pub(crate) fn absorb_remote_done(&self, peer: usize, done: Option<u64>) {
        let mut state = self.lock_state();
        if state.progress.record(peer, done) {
            self.forget_if_floor_advanced(&mut state);
        }
    }

    pub(crate) fn local_prepare(&self, seq: u64, ballot: Ballot) -> PrepareOutcome {
        self.lock_state().instances.prepare(seq, ballot)
    }

    pub(crate) fn local_accept(&self, seq: u64, ballot: Ballot, value: Bytes) -> AcceptOutcome {
        self.lock_state().instances.accept(seq, ballot, value)
    }

    pub(crate) fn learn_decided(&self, seq: u64, value: Bytes) {
        let mut state = self.lock_state();
        self.decide_locked(&mut state, seq, value);
    }

    pub(crate) fn release_proposer(&self, seq: u64) {
        self.lock_state().instances.release_proposer(seq);
    }

    // ------- Internals --------

    fn lock_state(&self) -> MutexGuard<'_, PeerState> {
        self.state.lock().expect("Peer state mutex guard poison")
    }

    fn ensure_alive(&self) -> Result<(), PeerDeadError> {
        if self.is_dead() {
            Err(PeerDeadError)
        } else {
            Ok(())
        }
    }

    fn forget_if_floor_advanced(&self, state: &mut PeerState) {
        let new_floor = state.progress.min();
        if state.instances.forget_below(new_floor) {
            slog::info!(
                self.logger,
                "Min advanced to {}. Retaining {} instances.",
                new_floor,
                state.instances.len()
            );
        }
    }

    fn decide_locked(&self, state: &mut PeerState, seq: u64, value: Bytes) {
        match state.instances.decide(seq, value) {
            DecideResult::NewlyDecided => slog::debug!(self.logger, "Seq {} decided", seq),
            DecideResult::AlreadyDecided | DecideResult::Forgotten => {}
            DecideResult::Conflict { existing } => slog::error!(
                self.logger,
                "Learned a second value for decided seq {}. Keeping {:?}. This breaks agreement!",
                seq,
                existing
            ),
        }
    }

    fn absorb_inbound(&self, state: &mut PeerState, sender: usize, done: Option<u64>) {
        self.rpc_count.fetch_add(1, Ordering::Relaxed);
        if sender == self.me {
            slog::warn!(self.logger, "Inbound RPC claims to be from myself. Ignoring its done horizon.");
            return;
        }
        if state.progress.record(sender, done) {
            self.forget_if_floor_advanced(state);
        }
    }
}

impl PaxosRpcHandler for Peer {
    fn handle_prepare(&self, args: PrepareArgs) -> Result<PrepareReply, PeerDeadError> {
        self.ensure_alive()?;

        let mut state = self.lock_state();
        self.absorb_inbound(&mut state, args.sender, args.done);
        state.ballots.observe(args.ballot);
        let outcome = state.instances.prepare(args.seq, args.ballot);

        Ok(PrepareReply {
            outcome,
            done: state.progress.local_done(),
        })
    }

    fn handle_accept(&self, args: AcceptArgs) -> Result<AcceptReply, PeerDeadError> {
        self.ensure_alive()?;

        let mut state = self.lock_state();
        self.absorb_inbound(&mut state, args.sender, args.done);
        state.ballots.observe(args.ballot);
        let outcome = state.instances.accept(args.seq, args.ballot, args.value);

        Ok(AcceptReply {
            outcome,
            done: state.progress.local_done(),
        })
    }

    fn handle_decided(&self, args: DecidedArgs) -> Result<DecidedReply, PeerDeadError> {
        self.ensure_alive()?;

        let mut state = self.lock_state();
        self.absorb_inbound(&mut state, args.sender, args.done);
        self.decide_locked(&mut state, args.seq, args.value);

        Ok(DecidedReply {
            done: state.progress.local_done(),
        })
    }
}
