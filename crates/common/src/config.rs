use std::{fs::File, net::SocketAddr, path::PathBuf, time::Duration};

use alloy_primitives::Bytes;
use clap::Parser;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::chain_info::ChainInfo;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PbsConfig {
    #[serde(default)]
    pub chain: NetworkConfig,
    pub proposer: ProposerConfig,
    #[serde(default)]
    pub grpc: GrpcConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl PbsConfig {
    pub fn load() -> eyre::Result<Self> {
        let start_config = StartConfig::parse();
        Self::from_file(start_config.config)
    }

    pub fn from_file(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let file = File::open(path.into())?;
        let config: PbsConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }
}

/// Everything the proposer needs to announce itself to relays and judge proposed blocks.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProposerConfig {
    /// Legacy JSON-RPC relays to register the validator with each epoch
    #[serde(default)]
    pub relays: Vec<String>,
    /// gRPC relays to register the validator with each epoch
    #[serde(default)]
    pub relays_grpc: Vec<String>,
    /// Uri on which proposed blocks are received over JSON-RPC
    #[serde(default)]
    pub proposed_block_uri: String,
    /// Uri on which proposed blocks are received over gRPC
    #[serde(default)]
    pub proposed_block_grpc_uri: String,
    /// Namespace of the proposed block method
    #[serde(default)]
    pub proposed_block_namespace: String,
    /// Signed value of keccak256(proposed_block_uri)
    #[serde(default)]
    pub register_validator_signature: Bytes,
    /// Target gas ceiling for built blocks
    pub gas_ceil: u64,
    /// Time reserved to finalize a block at the end of the proposing window
    #[serde(default = "default_delay_left_over_ms")]
    pub delay_left_over_ms: u64,
    #[serde(default)]
    pub builder_enabled: bool,
}

impl Default for ProposerConfig {
    fn default() -> Self {
        Self {
            relays: Vec::new(),
            relays_grpc: Vec::new(),
            proposed_block_uri: String::new(),
            proposed_block_grpc_uri: String::new(),
            proposed_block_namespace: String::new(),
            register_validator_signature: Bytes::new(),
            gas_ceil: 0,
            delay_left_over_ms: default_delay_left_over_ms(),
            builder_enabled: false,
        }
    }
}

impl ProposerConfig {
    pub fn delay_left_over(&self) -> Duration {
        Duration::from_millis(self.delay_left_over_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GrpcConfig {
    pub listen_addr: SocketAddr,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub secret: String,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5005)),
            node_id: String::new(),
            secret: String::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcConfig {
    pub listen_addr: SocketAddr,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { listen_addr: SocketAddr::from(([0, 0, 0, 0], 8555)) }
    }
}

/// Execution node the proposer follows for chain heads and delegates simulation to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecutionConfig {
    pub url: Url,
    #[serde(default = "default_head_poll_interval_ms")]
    pub head_poll_interval_ms: u64,
    #[serde(default = "default_sim_namespace")]
    pub sim_namespace: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:8545").expect("valid url"),
            head_poll_interval_ms: default_head_poll_interval_ms(),
            sim_namespace: default_sim_namespace(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub enum NetworkConfig {
    #[default]
    Bsc,
    Chapel,
    Custom {
        period: u64,
        epoch: u64,
        #[serde(default = "default_gas_limit_bound_divisor")]
        gas_limit_bound_divisor: u64,
    },
}

impl NetworkConfig {
    pub fn to_chain_info(&self) -> ChainInfo {
        match self {
            NetworkConfig::Bsc => ChainInfo::for_bsc(),
            NetworkConfig::Chapel => ChainInfo::for_chapel(),
            NetworkConfig::Custom { period, epoch, gas_limit_bound_divisor } => ChainInfo {
                name: "custom".to_string(),
                period_secs: *period,
                epoch_length: *epoch,
                gas_limit_bound_divisor: *gas_limit_bound_divisor,
            },
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub enum LoggingConfig {
    #[default]
    Console,
    File {
        dir_path: PathBuf,
        file_name: String,
    },
}

impl LoggingConfig {
    pub fn dir_path(&self) -> Option<PathBuf> {
        match self {
            LoggingConfig::Console => None,
            LoggingConfig::File { dir_path, .. } => Some(dir_path.clone()),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
#[clap(name = "pbs-node")]
pub struct StartConfig {
    #[clap(long, default_value = "config.yml")]
    pub config: String,
}

fn default_delay_left_over_ms() -> u64 {
    50
}

fn default_head_poll_interval_ms() -> u64 {
    200
}

fn default_sim_namespace() -> String {
    "eth".to_string()
}

fn default_gas_limit_bound_divisor() -> u64 {
    256
}
