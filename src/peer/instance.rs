use crate::peer::ballot::Ballot;
use crate::peer::paxos_rpcs::{AcceptOutcome, AcceptedProposal, PrepareOutcome};
use bytes::Bytes;
use std::collections::BTreeMap;

/// Fate is the externally visible status of one instance, as known by the local peer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Fate {
    /// A majority accepted this value. It will never change.
    Decided(Bytes),
    /// Not decided yet, as far as this peer knows.
    Pending,
    /// The instance is below `Min()` and its state has been discarded.
    Forgotten,
}

impl Fate {
    pub fn is_decided(&self) -> bool {
        matches!(self, Fate::Decided(_))
    }

    pub fn decided_value(&self) -> Option<&Bytes> {
        match self {
            Fate::Decided(value) => Some(value),
            _ => None,
        }
    }
}

/// Acceptor and learner state for a single seq.
#[derive(Default, Debug)]
pub(crate) struct Instance {
    promised: Option<Ballot>,
    accepted: Option<AcceptedProposal>,
    decided: Option<Bytes>,
    // A local proposer task is driving this seq.
    proposing: bool,
}

impl Instance {
    fn prepare(&mut self, ballot: Ballot) -> PrepareOutcome {
        match self.promised {
            Some(promised) if ballot <= promised => PrepareOutcome::Rejected { promised },
            _ => {
                self.promised = Some(ballot);
                PrepareOutcome::Promised {
                    accepted: self.accepted.clone(),
                }
            }
        }
    }

    fn accept(&mut self, ballot: Ballot, value: Bytes) -> AcceptOutcome {
        match self.promised {
            Some(promised) if ballot < promised => AcceptOutcome::Rejected { promised },
            _ => {
                self.promised = Some(ballot);
                self.accepted = Some(AcceptedProposal { ballot, value });
                AcceptOutcome::Accepted
            }
        }
    }
}

/// InstanceTable is a sparse map from seq to instance, with everything below `floor` discarded.
pub(crate) struct InstanceTable {
    instances: BTreeMap<u64, Instance>,
    floor: u64,
}

#[derive(Debug, PartialEq)]
pub(crate) enum DecideResult {
    NewlyDecided,
    AlreadyDecided,
    /// Someone told us about a different value than the one we already know. Only a bug (or a
    /// peer with corrupted state) can cause this.
    Conflict { existing: Bytes },
    Forgotten,
}

impl InstanceTable {
    pub(crate) fn new() -> Self {
        InstanceTable {
            instances: BTreeMap::new(),
            floor: 0,
        }
    }

    pub(crate) fn floor(&self) -> u64 {
        self.floor
    }

    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }

    pub(crate) fn fate(&self, seq: u64) -> Fate {
        if seq < self.floor {
            return Fate::Forgotten;
        }

        match self.instances.get(&seq).and_then(|instance| instance.decided.as_ref()) {
            Some(value) => Fate::Decided(value.clone()),
            None => Fate::Pending,
        }
    }

    pub(crate) fn prepare(&mut self, seq: u64, ballot: Ballot) -> PrepareOutcome {
        match self.instance_mut(seq) {
            Some(instance) => instance.prepare(ballot),
            None => PrepareOutcome::Forgotten,
        }
    }

    pub(crate) fn accept(&mut self, seq: u64, ballot: Ballot, value: Bytes) -> AcceptOutcome {
        match self.instance_mut(seq) {
            Some(instance) => instance.accept(ballot, value),
            None => AcceptOutcome::Forgotten,
        }
    }

    pub(crate) fn decide(&mut self, seq: u64, value: Bytes) -> DecideResult {
        let instance = match self.instance_mut(seq) {
            Some(instance) => instance,
            None => return DecideResult::Forgotten,
        };

        match &instance.decided {
            Some(existing) if existing == &value => DecideResult::AlreadyDecided,
            Some(existing) => DecideResult::Conflict {
                existing: existing.clone(),
            },
            None => {
                instance.decided = Some(value);
                DecideResult::NewlyDecided
            }
        }
    }

    /// Marks `seq` as having a local proposer. Returns false if the seq is forgotten, already
    /// decided, or already has a proposer, in which case the caller must not start another.
    pub(crate) fn try_claim_proposer(&mut self, seq: u64) -> bool {
        match self.instance_mut(seq) {
            Some(instance) if instance.decided.is_none() && !instance.proposing => {
                instance.proposing = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn release_proposer(&mut self, seq: u64) {
        if let Some(instance) = self.instances.get_mut(&seq) {
            instance.proposing = false;
        }
    }

    /// Drops every instance below `new_floor`. The floor never moves backwards.
    pub(crate) fn forget_below(&mut self, new_floor: u64) -> bool {
        if new_floor <= self.floor {
            return false;
        }

        self.instances = self.instances.split_off(&new_floor);
        self.floor = new_floor;
        true
    }

    fn instance_mut(&mut self, seq: u64) -> Option<&mut Instance> {
        if seq < self.floor {
            None
        } else {
            Some(self.instances.entry(seq).or_default())
        }
    }
}
