mod server;
mod shutdown;

pub(crate) use server::RpcServer;
pub(crate) use server::PEER_DEAD_MESSAGE;
pub(crate) use shutdown::RpcServerShutdownSignal;
