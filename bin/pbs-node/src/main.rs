use std::{sync::Arc, time::Duration};

use pbs_api::{BuilderApi, GrpcServer, ProposerService, RpcApi, RpcServer};
use pbs_common::{
    commit_hash,
    metrics::start_metrics_server,
    task,
    utils::{init_panic_hook, init_tracing_log},
    PbsConfig,
};
use pbs_execution::{bid_channel, ChainHeadPoller, ExecutionClient, RpcSimulator};
use pbs_proposer::{
    proposed_block_channel, ChainHead, ProposalConfig, ProposalPipeline, RelayRegistry,
    ValidatorRegistrar,
};
use pbs_types::{AcceptedBid, BlockHeader, GasLimits, ProposedBlock};
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
use tokio::{signal::unix::SignalKind, sync::mpsc};
use tracing::{error, info, warn};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const BID_QUEUE_CAPACITY: usize = 1_000;

#[tokio::main]
async fn main() {
    let config = match PbsConfig::load() {
        Ok(config) => config,
        Err(err) => panic!("failed to load config: {err}"),
    };

    let _guard = init_tracing_log(&config.logging);
    init_panic_hook(config.logging.dir_path().map(|dir| dir.join("crash.log")));
    start_metrics_server(&config);

    let chain_info = config.chain.to_chain_info();
    info!(
        chain = %chain_info.name,
        commit = commit_hash(),
        relays = config.proposer.relays.len(),
        relays_grpc = config.proposer.relays_grpc.len(),
        "starting pbs node"
    );

    match run(config).await {
        Ok(_) => info!("pbs node exited"),
        Err(err) => {
            error!(%err, "pbs node exited with error");
            panic!("pbs node exited with error: {err}");
        }
    }
}

async fn run(config: PbsConfig) -> eyre::Result<()> {
    let chain_info = config.chain.to_chain_info();
    let execution = ExecutionClient::new(config.execution.url.clone())?;

    let chain = Arc::new(ChainHead::new(BlockHeader::default()));
    let gas_limits = Arc::new(GasLimits::default());
    let poller = ChainHeadPoller::new(
        execution.clone(),
        chain.clone(),
        gas_limits.clone(),
        config.proposer.gas_ceil,
        chain_info.gas_limit_bound_divisor,
        Duration::from_millis(config.execution.head_poll_interval_ms),
    );
    if let Err(err) = poller.poll().await {
        warn!(%err, "failed to fetch initial chain head");
    }
    let heads = chain.subscribe();
    task::spawn(file!(), line!(), poller.run());

    let registry = Arc::new(RelayRegistry::from_config(&config.proposer).await);
    let registrar = Arc::new(ValidatorRegistrar::new(
        registry,
        config.proposer.clone(),
        chain_info.clone(),
        commit_hash().to_string(),
    ));
    task::spawn(file!(), line!(), registrar.clone().run(heads));

    let (proposed_tx, proposed_rx) = proposed_block_channel();
    let pipeline = Arc::new(ProposalPipeline::new(
        chain.clone(),
        RpcSimulator::new(execution, &config.execution.sim_namespace),
        gas_limits,
        ProposalConfig::new(&chain_info, &config.proposer),
        proposed_tx,
    ));
    task::spawn(file!(), line!(), drain_proposed_blocks(proposed_rx));

    let grpc_server = GrpcServer::new(config.grpc.clone());
    grpc_server.start(ProposerService::new(pipeline)).await?;

    let (bid_sink, bid_rx) = bid_channel(config.proposer.builder_enabled, BID_QUEUE_CAPACITY);
    task::spawn(file!(), line!(), drain_bids(bid_rx));

    let rpc_server = RpcServer::new(config.rpc.clone());
    rpc_server.start(RpcApi::new(BuilderApi::new(chain, bid_sink), registrar)).await?;

    // wait for SIGTERM or SIGINT
    let mut sigint = tokio::signal::unix::signal(SignalKind::interrupt())?;
    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }

    grpc_server.stop();
    rpc_server.stop();

    Ok(())
}

/// Block building happens outside this node, accepted proposals are only recorded.
async fn drain_proposed_blocks(mut rx: mpsc::Receiver<ProposedBlock>) {
    while let Some(block) = rx.recv().await {
        info!(
            block_number = block.args.block_number,
            mev_relay = %block.args.mev_relay,
            gas_used = block.simulated_work.gas_used,
            profit = %block.simulated_work.profit,
            sim_duration = ?block.sim_duration,
            "proposed block ready for sealing"
        );
    }
}

async fn drain_bids(mut rx: mpsc::Receiver<AcceptedBid>) {
    while let Some(bid) = rx.recv().await {
        info!(
            builder = %bid.builder,
            block_number = bid.block_number,
            tx_count = bid.txs.len(),
            gas_value = bid.gas_value,
            "bid ready for sealing"
        );
    }
}
