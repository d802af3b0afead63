pub mod builder;
pub mod error;
pub mod grpc;
pub mod rpc;

pub use builder::BuilderApi;
pub use error::{ApiError, BidError, ProposeBlockError};
pub use grpc::{GrpcServer, ProposerService};
pub use rpc::{
    BidApiClient, BidApiServer, RelayAdminApiClient, RelayAdminApiServer, RpcApi, RpcServer,
};
