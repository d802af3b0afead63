use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

use crate::grpc::RegisterValidatorRequest;

/// Payload of `eth_registerValidator`, announcing where relays should send proposed blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationArgs {
    /// callback uri the relay should propose blocks to
    pub data: Bytes,
    /// signature of keccak256(data)
    pub signature: Bytes,
    pub namespace: String,
    pub commit_hash: String,
    pub gas_ceil: u64,
}

impl RegistrationArgs {
    /// gRPC form of the registration. The gas ceiling is not part of the gRPC message.
    pub fn to_proto(&self) -> RegisterValidatorRequest {
        RegisterValidatorRequest {
            data: self.data.to_vec(),
            signature: self.signature.to_vec(),
            namespace: self.namespace.clone(),
            commit_hash: self.commit_hash.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_json() {
        let args = RegistrationArgs {
            data: Bytes::from_static(b"http://validator:8545"),
            signature: Bytes::from_static(&[0xde, 0xad]),
            namespace: "eth".to_string(),
            commit_hash: "abc".to_string(),
            gas_ceil: 140_000_000,
        };

        let value = serde_json::to_value(&args).unwrap();
        assert_eq!(value["signature"], "0xdead");
        assert_eq!(value["namespace"], "eth");
        assert_eq!(value["commitHash"], "abc");
        assert_eq!(value["gasCeil"], 140_000_000);

        let proto = args.to_proto();
        assert_eq!(proto.data, b"http://validator:8545".to_vec());
        assert_eq!(proto.commit_hash, "abc");
    }
}
