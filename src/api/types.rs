use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// PaxosMemberInfo is where one member of the group serves Paxos RPCs. Every member must be given
/// the same list, in the same order: a peer's index in the list is its identity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaxosMemberInfo {
    pub ip_addr: Ipv4Addr,
    pub rpc_port: u16,
}

impl From<&PaxosMemberInfo> for SocketAddr {
    fn from(member_info: &PaxosMemberInfo) -> Self {
        SocketAddr::V4(SocketAddrV4::new(member_info.ip_addr, member_info.rpc_port))
    }
}
