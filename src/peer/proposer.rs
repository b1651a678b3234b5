use crate::peer::backoff::Backoff;
use crate::peer::ballot::Ballot;
use crate::peer::paxos_rpcs::{AcceptArgs, AcceptOutcome, AcceptedProposal, DecidedArgs, PrepareArgs, PrepareOutcome};
use crate::peer::peer::Peer;
use crate::peer::stop_signal::StopCheck;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Proposer drives one seq to a decision: Prepare, then Accept, then tell everyone, retrying with
/// a higher ballot after a randomized backoff whenever a phase misses a majority.
pub(crate) struct Proposer {
    logger: slog::Logger,
    peer: Arc<Peer>,
    seq: u64,
    candidate: Bytes,
    backoff: Backoff,
    stop_check: StopCheck,
}

#[derive(Debug)]
enum RoundResult {
    Decided,
    NoPrepareQuorum,
    NoAcceptQuorum,
    Forgotten,
    Interrupted,
}

impl Proposer {
    pub(crate) fn new(peer: Arc<Peer>, seq: u64, candidate: Bytes, stop_check: StopCheck) -> Self {
        let logger = peer.logger().new(slog::o!("Seq" => seq));
        let (backoff_min, backoff_max) = peer.backoff_bounds();

        Proposer {
            logger,
            peer,
            seq,
            candidate,
            backoff: Backoff::new(backoff_min, backoff_max),
            stop_check,
        }
    }

    pub(crate) async fn run(mut self) {
        slog::debug!(self.logger, "Proposer started");

        while self.peer.should_keep_proposing(self.seq) {
            let result = self.run_round().await;
            slog::debug!(self.logger, "Round result: {:?}", result);

            match result {
                RoundResult::Decided | RoundResult::Forgotten | RoundResult::Interrupted => break,
                RoundResult::NoPrepareQuorum | RoundResult::NoAcceptQuorum => {}
            }

            // A decision may have arrived from another proposer while we were waiting for votes.
            if !self.peer.should_keep_proposing(self.seq) {
                break;
            }

            let delay = self.backoff.next_delay();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.stop_check.stopped() => break,
            }
        }

        self.peer.release_proposer(self.seq);
        slog::debug!(self.logger, "Proposer exited");
    }

    async fn run_round(&mut self) -> RoundResult {
        let ballot = self.peer.next_ballot();

        let value = match self.prepare_phase(ballot).await {
            Ok(value) => value,
            Err(result) => return result,
        };

        // Phase boundary: don't bother with accepts if we were killed or someone else won.
        if !self.peer.should_keep_proposing(self.seq) {
            return RoundResult::Interrupted;
        }

        if let Err(result) = self.accept_phase(ballot, value.clone()).await {
            return result;
        }

        slog::debug!(self.logger, "Value decided with ballot {:?}", ballot);
        self.peer.learn_decided(self.seq, value.clone());
        self.broadcast_decided(value);

        RoundResult::Decided
    }

    /// On success, returns the value this ballot must propose: the highest-ballot value accepted
    /// by any promising acceptor, or our own candidate if none of them accepted anything.
    async fn prepare_phase(&self, ballot: Ballot) -> Result<Bytes, RoundResult> {
        let seq = self.seq;
        let mut tally = PrepareTally::default();

        let local_outcome = self.peer.local_prepare(seq, ballot);
        if !tally.add(&self.peer, local_outcome) {
            return Err(RoundResult::Forgotten);
        }

        let mut replies = self.fan_out(|peer, to| call_prepare(peer, to, seq, ballot));
        while tally.promises < self.peer.majority() {
            match replies.recv().await {
                Some(Some(outcome)) => {
                    if !tally.add(&self.peer, outcome) {
                        return Err(RoundResult::Forgotten);
                    }
                }
                Some(None) => { /* No vote */ }
                None => break,
            }
        }

        if tally.promises < self.peer.majority() {
            return Err(RoundResult::NoPrepareQuorum);
        }

        Ok(match tally.highest_accepted {
            Some(accepted) => accepted.value,
            None => self.candidate.clone(),
        })
    }

    async fn accept_phase(&self, ballot: Ballot, value: Bytes) -> Result<(), RoundResult> {
        let seq = self.seq;
        let mut accepts = 0;

        match self.peer.local_accept(seq, ballot, value.clone()) {
            AcceptOutcome::Accepted => accepts += 1,
            AcceptOutcome::Rejected { promised } => self.peer.observe_ballot(promised),
            AcceptOutcome::Forgotten => return Err(RoundResult::Forgotten),
        }

        let mut replies = self.fan_out(|peer, to| call_accept(peer, to, seq, ballot, value.clone()));
        while accepts < self.peer.majority() {
            match replies.recv().await {
                Some(Some(AcceptOutcome::Accepted)) => accepts += 1,
                Some(Some(AcceptOutcome::Forgotten)) => return Err(RoundResult::Forgotten),
                Some(Some(AcceptOutcome::Rejected { .. })) | Some(None) => { /* No vote */ }
                None => break,
            }
        }

        if accepts < self.peer.majority() {
            return Err(RoundResult::NoAcceptQuorum);
        }

        Ok(())
    }

    fn broadcast_decided(&self, value: Bytes) {
        let seq = self.seq;
        // Best effort. Nobody waits on the receiver.
        let _ = self.fan_out(|peer, to| call_decided(peer, to, seq, value.clone()));
    }

    /// Spawns one call per remote peer. Replies arrive on the returned channel in completion
    /// order; the channel closes once every call has finished.
    fn fan_out<F, Fut, R>(&self, call: F) -> mpsc::UnboundedReceiver<R>
    where
        F: Fn(Arc<Peer>, usize) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        for to in self.peer.remote_peers() {
            let tx = tx.clone();
            let reply = call(self.peer.clone(), to);
            tokio::task::spawn(async move {
                let _ = tx.send(reply.await);
            });
        }

        rx
    }
}

#[derive(Default)]
struct PrepareTally {
    promises: usize,
    highest_accepted: Option<AcceptedProposal>,
}

impl PrepareTally {
    /// Returns false if the acceptor has forgotten the seq.
    fn add(&mut self, peer: &Peer, outcome: PrepareOutcome) -> bool {
        match outcome {
            PrepareOutcome::Promised { accepted } => {
                self.promises += 1;
                if let Some(accepted) = accepted {
                    let is_higher = match &self.highest_accepted {
                        None => true,
                        Some(highest) => accepted.ballot > highest.ballot,
                    };
                    if is_higher {
                        self.highest_accepted = Some(accepted);
                    }
                }
                true
            }
            PrepareOutcome::Rejected { promised } => {
                peer.observe_ballot(promised);
                true
            }
            PrepareOutcome::Forgotten => false,
        }
    }
}

// ------- Remote calls --------
//
// Each call absorbs the piggybacked done horizon itself, so replies that arrive after the phase
// has moved on still feed garbage collection.

async fn call_prepare(peer: Arc<Peer>, to: usize, seq: u64, ballot: Ballot) -> Option<PrepareOutcome> {
    let args = PrepareArgs {
        sender: peer.me(),
        seq,
        ballot,
        done: peer.local_done(),
    };

    match peer.transport().prepare(to, args).await {
        Ok(reply) => {
            peer.absorb_remote_done(to, reply.done);
            if let PrepareOutcome::Rejected { promised } = reply.outcome {
                peer.observe_ballot(promised);
            }
            Some(reply.outcome)
        }
        Err(e) => {
            slog::debug!(peer.logger(), "Prepare({}) to peer {} failed: {}", seq, to, e);
            None
        }
    }
}

async fn call_accept(peer: Arc<Peer>, to: usize, seq: u64, ballot: Ballot, value: Bytes) -> Option<AcceptOutcome> {
    let args = AcceptArgs {
        sender: peer.me(),
        seq,
        ballot,
        value,
        done: peer.local_done(),
    };

    match peer.transport().accept(to, args).await {
        Ok(reply) => {
            peer.absorb_remote_done(to, reply.done);
            if let AcceptOutcome::Rejected { promised } = reply.outcome {
                peer.observe_ballot(promised);
            }
            Some(reply.outcome)
        }
        Err(e) => {
            slog::debug!(peer.logger(), "Accept({}) to peer {} failed: {}", seq, to, e);
            None
        }
    }
}

async fn call_decided(peer: Arc<Peer>, to: usize, seq: u64, value: Bytes) {
    let args = DecidedArgs {
        sender: peer.me(),
        seq,
        value,
        done: peer.local_done(),
    };

    match peer.transport().decided(to, args).await {
        Ok(reply) => peer.absorb_remote_done(to, reply.done),
        Err(e) => slog::debug!(peer.logger(), "Decided({}) to peer {} failed: {}", seq, to, e),
    }
}
