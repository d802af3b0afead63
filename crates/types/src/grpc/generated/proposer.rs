#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposeBlockRequest {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub payload: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(uint64, tag = "2")]
    pub block_number: u64,
    #[prost(string, tag = "3")]
    pub prev_block_hash: ::prost::alloc::string::String,
    #[prost(uint64, tag = "4")]
    pub block_reward: u64,
    #[prost(uint64, tag = "5")]
    pub gas_limit: u64,
    #[prost(uint64, tag = "6")]
    pub gas_used: u64,
    #[prost(string, tag = "7")]
    pub mev_relay: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposeBlockResponse {
    #[prost(string, tag = "1")]
    pub received_at: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub simulated_duration: ::core::option::Option<::prost_types::Duration>,
    #[prost(string, tag = "3")]
    pub response_sent_at: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisterValidatorRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "3")]
    pub namespace: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub commit_hash: ::prost::alloc::string::String,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisterValidatorResponse {}
/// Generated client implementations.
pub mod proposer_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;
    #[derive(Debug, Clone)]
    pub struct ProposerClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl ProposerClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> ProposerClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub async fn propose_block(
            &mut self,
            request: impl tonic::IntoRequest<super::ProposeBlockRequest>,
        ) -> std::result::Result<
            tonic::Response<super::ProposeBlockResponse>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/proposer.Proposer/ProposeBlock",
            );
            let req = request.into_request();
            self.inner.unary(req, path, codec).await
        }
        pub async fn register_validator(
            &mut self,
            request: impl tonic::IntoRequest<super::RegisterValidatorRequest>,
        ) -> std::result::Result<
            tonic::Response<super::RegisterValidatorResponse>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::new(
                        tonic::Code::Unknown,
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/proposer.Proposer/RegisterValidator",
            );
            let req = request.into_request();
            self.inner.unary(req, path, codec).await
        }
    }
}
/// Generated server implementations.
pub mod proposer_server {
    #![allow(unused_variables, dead_code, missing_docs, clippy::let_unit_value)]
    use tonic::codegen::*;
    /// Generated trait containing gRPC methods that should be implemented for use with ProposerServer.
    #[async_trait]
    pub trait Proposer: Send + Sync + 'static {
        async fn propose_block(
            &self,
            request: tonic::Request<super::ProposeBlockRequest>,
        ) -> std::result::Result<
            tonic::Response<super::ProposeBlockResponse>,
            tonic::Status,
        >;
        async fn register_validator(
            &self,
            request: tonic::Request<super::RegisterValidatorRequest>,
        ) -> std::result::Result<
            tonic::Response<super::RegisterValidatorResponse>,
            tonic::Status,
        >;
    }
    #[derive(Debug)]
    pub struct ProposerServer<T: Proposer> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>);
    impl<T: Proposer> ProposerServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }
        pub fn from_arc(inner: Arc<T>) -> Self {
            let inner = _Inner(inner);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> InterceptedService<Self, F>
        where
            F: tonic::service::Interceptor,
        {
            InterceptedService::new(Self::new(inner), interceptor)
        }
    }
    impl<T, B> tonic::codegen::Service<http::Request<B>> for ProposerServer<T>
    where
        T: Proposer,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/proposer.Proposer/ProposeBlock" => {
                    #[allow(non_camel_case_types)]
                    struct ProposeBlockSvc<T: Proposer>(pub Arc<T>);
                    impl<
                        T: Proposer,
                    > tonic::server::UnaryService<super::ProposeBlockRequest>
                    for ProposeBlockSvc<T> {
                        type Response = super::ProposeBlockResponse;
                        type Future = BoxFuture<
                            tonic::Response<Self::Response>,
                            tonic::Status,
                        >;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProposeBlockRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move {
                                <T as Proposer>::propose_block(&inner, request).await
                            };
                            Box::pin(fut)
                        }
                    }
                    let fut = async move {
                        let inner = inner.0;
                        let method = ProposeBlockSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/proposer.Proposer/RegisterValidator" => {
                    #[allow(non_camel_case_types)]
                    struct RegisterValidatorSvc<T: Proposer>(pub Arc<T>);
                    impl<
                        T: Proposer,
                    > tonic::server::UnaryService<super::RegisterValidatorRequest>
                    for RegisterValidatorSvc<T> {
                        type Response = super::RegisterValidatorResponse;
                        type Future = BoxFuture<
                            tonic::Response<Self::Response>,
                            tonic::Status,
                        >;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::RegisterValidatorRequest>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move {
                                <T as Proposer>::register_validator(&inner, request).await
                            };
                            Box::pin(fut)
                        }
                    }
                    let fut = async move {
                        let inner = inner.0;
                        let method = RegisterValidatorSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => {
                    Box::pin(async move {
                        Ok(
                            http::Response::builder()
                                .status(200)
                                .header("grpc-status", "12")
                                .header("content-type", "application/grpc")
                                .body(empty_body())
                                .unwrap(),
                        )
                    })
                }
            }
        }
    }
    impl<T: Proposer> Clone for ProposerServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: Proposer> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(Arc::clone(&self.0))
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: Proposer> tonic::server::NamedService for ProposerServer<T> {
        const NAME: &'static str = "proposer.Proposer";
    }
}
