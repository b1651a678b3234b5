//! This mod is meant to hold most of the code for the library's client-facing API.
mod options;
mod paxos_peer;
mod types;
mod wiring;

pub use options::PaxosOptions;
pub use paxos_peer::PaxosPeer;
pub use types::PaxosMemberInfo;
pub use wiring::create_paxos_peer_with_transport;
pub use wiring::try_create_paxos_peer;
pub use wiring::PaxosPeerConfig;
pub use wiring::PaxosPeerCreationError;
