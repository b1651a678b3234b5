use crate::grpc::{
    proto_accept_result, proto_prepare_result, ProtoAcceptReq, ProtoAcceptResult, ProtoAccepted, ProtoBallot,
    ProtoDecidedReq, ProtoDecidedResult, ProtoForgotten, ProtoPrepareReq, ProtoPrepareResult, ProtoPromise,
    ProtoRejection,
};
use crate::peer::{
    AcceptArgs, AcceptOutcome, AcceptReply, AcceptedProposal, Ballot, DecidedArgs, DecidedReply, PrepareArgs,
    PrepareOutcome, PrepareReply,
};
use bytes::Bytes;
use std::convert::TryFrom;

#[derive(Debug, thiserror::Error)]
pub enum ProtoConvertError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Ballot round 0 in required field '{0}'")]
    ZeroBallot(&'static str),
    #[error("Ballot round in field '{0}' leaves no room for a higher ballot")]
    ExhaustedBallot(&'static str),
}

// ------- Optional value conventions --------

fn encode_done(done: Option<u64>) -> u64 {
    match done {
        None => 0,
        Some(seq) => seq.saturating_add(1),
    }
}

fn decode_done(forget_below: u64) -> Option<u64> {
    match forget_below {
        0 => None,
        n => Some(n - 1),
    }
}

fn encode_ballot(ballot: Ballot) -> ProtoBallot {
    ProtoBallot {
        round: ballot.round(),
        proposer: ballot.proposer() as u64,
    }
}

fn decode_optional_ballot(proto: Option<ProtoBallot>) -> Option<Ballot> {
    match proto {
        None => None,
        Some(ProtoBallot { round: 0, .. }) => None,
        Some(b) => Some(Ballot::new(b.round, b.proposer as usize)),
    }
}

// Round u64::MAX can never be outbid, so it never comes from a well-behaved peer.
fn decode_required_ballot(proto: Option<ProtoBallot>, field: &'static str) -> Result<Ballot, ProtoConvertError> {
    match proto {
        None => Err(ProtoConvertError::MissingField(field)),
        Some(ProtoBallot { round: 0, .. }) => Err(ProtoConvertError::ZeroBallot(field)),
        Some(ProtoBallot { round: u64::MAX, .. }) => Err(ProtoConvertError::ExhaustedBallot(field)),
        Some(b) => Ok(Ballot::new(b.round, b.proposer as usize)),
    }
}

fn encode_rejection(promised: Ballot) -> ProtoRejection {
    ProtoRejection {
        promised: Some(encode_ballot(promised)),
    }
}

// ------- Prepare --------

impl From<PrepareArgs> for ProtoPrepareReq {
    fn from(args: PrepareArgs) -> Self {
        ProtoPrepareReq {
            sender: args.sender as u64,
            seq: args.seq,
            ballot: Some(encode_ballot(args.ballot)),
            forget_below: encode_done(args.done),
        }
    }
}

impl TryFrom<ProtoPrepareReq> for PrepareArgs {
    type Error = ProtoConvertError;

    fn try_from(proto: ProtoPrepareReq) -> Result<Self, Self::Error> {
        Ok(PrepareArgs {
            sender: proto.sender as usize,
            seq: proto.seq,
            ballot: decode_required_ballot(proto.ballot, "ballot")?,
            done: decode_done(proto.forget_below),
        })
    }
}

impl From<PrepareReply> for ProtoPrepareResult {
    fn from(reply: PrepareReply) -> Self {
        let result = match reply.outcome {
            PrepareOutcome::Promised { accepted } => {
                let promise = match accepted {
                    None => ProtoPromise {
                        accepted_ballot: None,
                        accepted_value: Vec::new(),
                    },
                    Some(accepted) => ProtoPromise {
                        accepted_ballot: Some(encode_ballot(accepted.ballot)),
                        accepted_value: accepted.value.to_vec(),
                    },
                };
                proto_prepare_result::Result::Promise(promise)
            }
            PrepareOutcome::Rejected { promised } => proto_prepare_result::Result::Rejected(encode_rejection(promised)),
            PrepareOutcome::Forgotten => proto_prepare_result::Result::Forgotten(ProtoForgotten {
                // Empty
            }),
        };

        ProtoPrepareResult {
            forget_below: encode_done(reply.done),
            result: Some(result),
        }
    }
}

impl TryFrom<ProtoPrepareResult> for PrepareReply {
    type Error = ProtoConvertError;

    fn try_from(proto: ProtoPrepareResult) -> Result<Self, Self::Error> {
        let outcome = match proto.result {
            Some(proto_prepare_result::Result::Promise(ProtoPromise {
                accepted_ballot,
                accepted_value,
            })) => PrepareOutcome::Promised {
                accepted: decode_optional_ballot(accepted_ballot).map(|ballot| AcceptedProposal {
                    ballot,
                    value: Bytes::from(accepted_value),
                }),
            },
            Some(proto_prepare_result::Result::Rejected(rejection)) => PrepareOutcome::Rejected {
                promised: decode_required_ballot(rejection.promised, "promised")?,
            },
            Some(proto_prepare_result::Result::Forgotten(_)) => PrepareOutcome::Forgotten,
            None => return Err(ProtoConvertError::MissingField("result")),
        };

        Ok(PrepareReply {
            outcome,
            done: decode_done(proto.forget_below),
        })
    }
}

// ------- Accept --------

impl From<AcceptArgs> for ProtoAcceptReq {
    fn from(args: AcceptArgs) -> Self {
        ProtoAcceptReq {
            sender: args.sender as u64,
            seq: args.seq,
            ballot: Some(encode_ballot(args.ballot)),
            value: args.value.to_vec(),
            forget_below: encode_done(args.done),
        }
    }
}

impl TryFrom<ProtoAcceptReq> for AcceptArgs {
    type Error = ProtoConvertError;

    fn try_from(proto: ProtoAcceptReq) -> Result<Self, Self::Error> {
        Ok(AcceptArgs {
            sender: proto.sender as usize,
            seq: proto.seq,
            ballot: decode_required_ballot(proto.ballot, "ballot")?,
            value: Bytes::from(proto.value),
            done: decode_done(proto.forget_below),
        })
    }
}

impl From<AcceptReply> for ProtoAcceptResult {
    fn from(reply: AcceptReply) -> Self {
        let result = match reply.outcome {
            AcceptOutcome::Accepted => proto_accept_result::Result::Accepted(ProtoAccepted {
                // Empty
            }),
            AcceptOutcome::Rejected { promised } => proto_accept_result::Result::Rejected(encode_rejection(promised)),
            AcceptOutcome::Forgotten => proto_accept_result::Result::Forgotten(ProtoForgotten {
                // Empty
            }),
        };

        ProtoAcceptResult {
            forget_below: encode_done(reply.done),
            result: Some(result),
        }
    }
}

impl TryFrom<ProtoAcceptResult> for AcceptReply {
    type Error = ProtoConvertError;

    fn try_from(proto: ProtoAcceptResult) -> Result<Self, Self::Error> {
        let outcome = match proto.result {
            Some(proto_accept_result::Result::Accepted(_)) => AcceptOutcome::Accepted,
            Some(proto_accept_result::Result::Rejected(rejection)) => AcceptOutcome::Rejected {
                promised: decode_required_ballot(rejection.promised, "promised")?,
            },
            Some(proto_accept_result::Result::Forgotten(_)) => AcceptOutcome::Forgotten,
            None => return Err(ProtoConvertError::MissingField("result")),
        };

        Ok(AcceptReply {
            outcome,
            done: decode_done(proto.forget_below),
        })
    }
}

// ------- Decided --------

impl From<DecidedArgs> for ProtoDecidedReq {
    fn from(args: DecidedArgs) -> Self {
        ProtoDecidedReq {
            sender: args.sender as u64,
            seq: args.seq,
            value: args.value.to_vec(),
            forget_below: encode_done(args.done),
        }
    }
}

impl From<ProtoDecidedReq> for DecidedArgs {
    fn from(proto: ProtoDecidedReq) -> Self {
        DecidedArgs {
            sender: proto.sender as usize,
            seq: proto.seq,
            value: Bytes::from(proto.value),
            done: decode_done(proto.forget_below),
        }
    }
}

impl From<DecidedReply> for ProtoDecidedResult {
    fn from(reply: DecidedReply) -> Self {
        ProtoDecidedResult {
            forget_below: encode_done(reply.done),
        }
    }
}

impl From<ProtoDecidedResult> for DecidedReply {
    fn from(proto: ProtoDecidedResult) -> Self {
        DecidedReply {
            done: decode_done(proto.forget_below),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_horizon_uses_zero_for_absent() {
        assert_eq!(0, encode_done(None));
        assert_eq!(1, encode_done(Some(0)));
        assert_eq!(None, decode_done(0));
        assert_eq!(Some(0), decode_done(1));
        assert_eq!(Some(41), decode_done(encode_done(Some(41))));
    }

    #[test]
    fn promise_without_accepted_value_decodes_as_none() {
        let proto = ProtoPrepareResult::from(PrepareReply {
            outcome: PrepareOutcome::Promised { accepted: None },
            done: None,
        });
        let reply = PrepareReply::try_from(proto).unwrap();
        assert_eq!(PrepareOutcome::Promised { accepted: None }, reply.outcome);
    }

    #[test]
    fn promise_with_empty_accepted_value_is_preserved() {
        let accepted = AcceptedProposal {
            ballot: Ballot::new(3, 1),
            value: Bytes::new(),
        };
        let proto = ProtoPrepareResult::from(PrepareReply {
            outcome: PrepareOutcome::Promised {
                accepted: Some(accepted.clone()),
            },
            done: Some(7),
        });
        let reply = PrepareReply::try_from(proto).unwrap();
        assert_eq!(
            PrepareOutcome::Promised {
                accepted: Some(accepted)
            },
            reply.outcome
        );
        assert_eq!(Some(7), reply.done);
    }

    #[test]
    fn request_without_ballot_is_rejected() {
        let proto = ProtoPrepareReq {
            sender: 1,
            seq: 2,
            ballot: None,
            forget_below: 0,
        };
        assert!(matches!(
            PrepareArgs::try_from(proto),
            Err(ProtoConvertError::MissingField("ballot"))
        ));

        let proto = ProtoAcceptReq {
            sender: 1,
            seq: 2,
            ballot: Some(ProtoBallot { round: 0, proposer: 1 }),
            value: vec![],
            forget_below: 0,
        };
        assert!(matches!(
            AcceptArgs::try_from(proto),
            Err(ProtoConvertError::ZeroBallot("ballot"))
        ));
    }

    #[test]
    fn request_with_exhausted_ballot_is_rejected() {
        let proto = ProtoPrepareReq {
            sender: 1,
            seq: 2,
            ballot: Some(ProtoBallot {
                round: u64::MAX,
                proposer: 1,
            }),
            forget_below: 0,
        };
        assert!(matches!(
            PrepareArgs::try_from(proto),
            Err(ProtoConvertError::ExhaustedBallot("ballot"))
        ));
    }

    #[test]
    fn promise_with_accepted_value_decodes() {
        let proto = ProtoPrepareResult {
            forget_below: 0,
            result: Some(proto_prepare_result::Result::Promise(ProtoPromise {
                accepted_ballot: Some(ProtoBallot { round: 4, proposer: 2 }),
                accepted_value: b"v".to_vec(),
            })),
        };
        let reply = PrepareReply::try_from(proto).unwrap();
        assert_eq!(
            PrepareOutcome::Promised {
                accepted: Some(AcceptedProposal {
                    ballot: Ballot::new(4, 2),
                    value: Bytes::from("v"),
                })
            },
            reply.outcome
        );
    }

    #[test]
    fn reply_without_result_is_malformed() {
        let proto = ProtoAcceptResult {
            forget_below: 0,
            result: None,
        };
        assert!(AcceptReply::try_from(proto).is_err());
    }
}
