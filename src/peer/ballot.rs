use std::cmp;
use std::fmt;

/// Ballot orders competing proposals for a single instance. Ballots are compared by round first,
/// then by proposer index, so ballots chosen by different peers never compare equal.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ballot {
    round: u64,
    proposer: u64,
}

impl Ballot {
    /// `round` must be non-zero. Round 0 is reserved for "no ballot" on the wire.
    pub fn new(round: u64, proposer: usize) -> Self {
        Ballot {
            round,
            proposer: proposer as u64,
        }
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn proposer(&self) -> usize {
        self.proposer as usize
    }
}

impl fmt::Debug for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.round, self.proposer)
    }
}

/// BallotAllocator hands out this peer's ballots. Each new ballot has a round one past the highest
/// round this peer has used or observed from anyone, and carries our own index as tie-breaker.
pub(crate) struct BallotAllocator {
    me: usize,
    highest_round: u64,
}

impl BallotAllocator {
    pub(crate) fn new(me: usize) -> Self {
        BallotAllocator { me, highest_round: 0 }
    }

    pub(crate) fn observe(&mut self, ballot: Ballot) {
        self.highest_round = cmp::max(self.highest_round, ballot.round);
    }

    pub(crate) fn next_ballot(&mut self) -> Ballot {
        // Saturates rather than wraps. Only a misbehaving peer can push us this high.
        self.highest_round = self.highest_round.saturating_add(1);
        Ballot::new(self.highest_round, self.me)
    }
}
