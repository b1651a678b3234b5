/// Round 0 means "no ballot".
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoBallot {
    #[prost(uint64, tag = "1")]
    pub round: u64,
    #[prost(uint64, tag = "2")]
    pub proposer: u64,
}
// Every message piggybacks the sender's done horizon as `forget_below`:
// 0 means nothing is done, otherwise it is `done + 1`.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPrepareReq {
    #[prost(uint64, tag = "1")]
    pub sender: u64,
    #[prost(uint64, tag = "2")]
    pub seq: u64,
    #[prost(message, optional, tag = "3")]
    pub ballot: ::core::option::Option<ProtoBallot>,
    #[prost(uint64, tag = "4")]
    pub forget_below: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPrepareResult {
    #[prost(uint64, tag = "1")]
    pub forget_below: u64,
    #[prost(oneof = "proto_prepare_result::Result", tags = "2, 3, 4")]
    pub result: ::core::option::Option<proto_prepare_result::Result>,
}
/// Nested message and enum types in `ProtoPrepareResult`.
pub mod proto_prepare_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "2")]
        Promise(super::ProtoPromise),
        #[prost(message, tag = "3")]
        Rejected(super::ProtoRejection),
        #[prost(message, tag = "4")]
        Forgotten(super::ProtoForgotten),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPromise {
    /// Absent (round 0) if this acceptor never accepted a value for the seq.
    #[prost(message, optional, tag = "1")]
    pub accepted_ballot: ::core::option::Option<ProtoBallot>,
    #[prost(bytes = "vec", tag = "2")]
    pub accepted_value: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRejection {
    #[prost(message, optional, tag = "1")]
    pub promised: ::core::option::Option<ProtoBallot>,
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoForgotten {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoAcceptReq {
    #[prost(uint64, tag = "1")]
    pub sender: u64,
    #[prost(uint64, tag = "2")]
    pub seq: u64,
    #[prost(message, optional, tag = "3")]
    pub ballot: ::core::option::Option<ProtoBallot>,
    #[prost(bytes = "vec", tag = "4")]
    pub value: ::prost::alloc::vec::Vec<u8>,
    #[prost(uint64, tag = "5")]
    pub forget_below: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoAcceptResult {
    #[prost(uint64, tag = "1")]
    pub forget_below: u64,
    #[prost(oneof = "proto_accept_result::Result", tags = "2, 3, 4")]
    pub result: ::core::option::Option<proto_accept_result::Result>,
}
/// Nested message and enum types in `ProtoAcceptResult`.
pub mod proto_accept_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "2")]
        Accepted(super::ProtoAccepted),
        #[prost(message, tag = "3")]
        Rejected(super::ProtoRejection),
        #[prost(message, tag = "4")]
        Forgotten(super::ProtoForgotten),
    }
}
/// Empty
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoAccepted {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDecidedReq {
    #[prost(uint64, tag = "1")]
    pub sender: u64,
    #[prost(uint64, tag = "2")]
    pub seq: u64,
    #[prost(bytes = "vec", tag = "3")]
    pub value: ::prost::alloc::vec::Vec<u8>,
    #[prost(uint64, tag = "4")]
    pub forget_below: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDecidedResult {
    #[prost(uint64, tag = "1")]
    pub forget_below: u64,
}
#[doc = r" Generated client implementations."]
pub mod grpc_paxos_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    pub struct GrpcPaxosClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GrpcPaxosClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GrpcPaxosClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        pub async fn prepare(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoPrepareReq>,
        ) -> Result<tonic::Response<super::ProtoPrepareResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/paxos.GrpcPaxos/Prepare");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn accept(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoAcceptReq>,
        ) -> Result<tonic::Response<super::ProtoAcceptResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/paxos.GrpcPaxos/Accept");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn decided(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoDecidedReq>,
        ) -> Result<tonic::Response<super::ProtoDecidedResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/paxos.GrpcPaxos/Decided");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
    impl<T: Clone> Clone for GrpcPaxosClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for GrpcPaxosClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "GrpcPaxosClient {{ ... }}")
        }
    }
}
#[doc = r" Generated server implementations."]
pub mod grpc_paxos_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcPaxosServer."]
    #[async_trait]
    pub trait GrpcPaxos: Send + Sync + 'static {
        async fn prepare(
            &self,
            request: tonic::Request<super::ProtoPrepareReq>,
        ) -> Result<tonic::Response<super::ProtoPrepareResult>, tonic::Status>;
        async fn accept(
            &self,
            request: tonic::Request<super::ProtoAcceptReq>,
        ) -> Result<tonic::Response<super::ProtoAcceptResult>, tonic::Status>;
        async fn decided(
            &self,
            request: tonic::Request<super::ProtoDecidedReq>,
        ) -> Result<tonic::Response<super::ProtoDecidedResult>, tonic::Status>;
    }
    #[derive(Debug)]
    pub struct GrpcPaxosServer<T: GrpcPaxos> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: GrpcPaxos> GrpcPaxosServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for GrpcPaxosServer<T>
    where
        T: GrpcPaxos,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/paxos.GrpcPaxos/Prepare" => {
                    #[allow(non_camel_case_types)]
                    struct PrepareSvc<T: GrpcPaxos>(pub Arc<T>);
                    impl<T: GrpcPaxos> tonic::server::UnaryService<super::ProtoPrepareReq> for PrepareSvc<T> {
                        type Response = super::ProtoPrepareResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoPrepareReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).prepare(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = PrepareSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/paxos.GrpcPaxos/Accept" => {
                    #[allow(non_camel_case_types)]
                    struct AcceptSvc<T: GrpcPaxos>(pub Arc<T>);
                    impl<T: GrpcPaxos> tonic::server::UnaryService<super::ProtoAcceptReq> for AcceptSvc<T> {
                        type Response = super::ProtoAcceptResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoAcceptReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).accept(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = AcceptSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/paxos.GrpcPaxos/Decided" => {
                    #[allow(non_camel_case_types)]
                    struct DecidedSvc<T: GrpcPaxos>(pub Arc<T>);
                    impl<T: GrpcPaxos> tonic::server::UnaryService<super::ProtoDecidedReq> for DecidedSvc<T> {
                        type Response = super::ProtoDecidedResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoDecidedReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).decided(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = DecidedSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: GrpcPaxos> Clone for GrpcPaxosServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: GrpcPaxos> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: GrpcPaxos> tonic::transport::NamedService for GrpcPaxosServer<T> {
        const NAME: &'static str = "paxos.GrpcPaxos";
    }
}
