use std::{net::SocketAddr, time::Duration};

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use eyre::bail;
use lazy_static::lazy_static;
use prometheus::{
    register_gauge_vec_with_registry, register_histogram_vec_with_registry,
    register_histogram_with_registry, register_int_counter_vec_with_registry, Encoder, GaugeVec,
    Histogram, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::PbsConfig;

const DEFAULT_METRICS_PORT: u16 = 9500;

pub fn start_metrics_server(config: &PbsConfig) {
    let port = config.metrics_port.unwrap_or(DEFAULT_METRICS_PORT);
    crate::task::spawn(file!(), line!(), async move {
        if let Err(err) = MetricsProvider::new(port).run().await {
            error!(%err, "metrics server exited");
        }
    });

    let opts = Opts::new("info", "Node info")
        .const_label("version", env!("CARGO_PKG_VERSION"))
        .const_label("commit", env!("GIT_HASH"))
        .const_label("branch", env!("GIT_BRANCH"))
        .const_label("chain", config.chain.to_chain_info().name);

    match IntGauge::with_opts(opts) {
        Ok(info) => {
            info.set(1);
            if let Err(err) = PBS_METRICS_REGISTRY.register(Box::new(info)) {
                error!(%err, "failed to register info metric");
            }
        }
        Err(err) => error!(%err, "failed to create info metric"),
    }
}

pub struct MetricsProvider {
    port: u16,
}

impl MetricsProvider {
    pub fn new(port: u16) -> Self {
        MetricsProvider { port }
    }

    pub async fn run(self) -> eyre::Result<()> {
        info!("starting metrics server on port {}", self.port);

        let router = axum::Router::new()
            .route("/metrics", get(handle_metrics))
            .route("/status", get(|| async { StatusCode::OK }));
        let address = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(&address).await?;

        axum::serve(listener, router).await?;

        bail!("metrics server stopped")
    }
}

async fn handle_metrics() -> Response {
    match prepare_metrics() {
        Ok(response) => response,
        Err(err) => {
            error!(?err, "failed to prepare metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn prepare_metrics() -> Result<Response, MetricsError> {
    let metrics = PBS_METRICS_REGISTRY.gather();
    let encoder = TextEncoder::new();
    let s = encoder.encode_to_string(&metrics)?;

    Response::builder()
        .status(200)
        .header(CONTENT_TYPE, encoder.format_type())
        .body(Body::from(s))
        .map_err(MetricsError::FailedBody)
}

#[derive(Debug, thiserror::Error)]
enum MetricsError {
    #[error("failed encoding metrics {0}")]
    FailedEncoding(#[from] prometheus::Error),

    #[error("failed encoding body {0}")]
    FailedBody(#[from] axum::http::Error),
}

lazy_static! {
    pub static ref PBS_METRICS_REGISTRY: Registry =
        Registry::new_custom(Some("pbs".to_string()), None).unwrap();

    //////////////// RELAYS ////////////////

    /// Registration attempts by transport and outcome
    static ref REGISTRATION_STATUS: IntCounterVec = register_int_counter_vec_with_registry!(
        "registration_status_total",
        "Count of validator registrations sent to relays",
        &["transport", "is_success"],
        &PBS_METRICS_REGISTRY
    )
    .unwrap();

    static ref RELAY_COUNT: GaugeVec = register_gauge_vec_with_registry!(
        "relay_count",
        "Relays currently registered",
        &["transport"],
        &PBS_METRICS_REGISTRY
    )
    .unwrap();

    //////////////// PROPOSALS ////////////////

    static ref PROPOSAL_OUTCOME: IntCounterVec = register_int_counter_vec_with_registry!(
        "proposal_outcome_total",
        "Count of proposed blocks by outcome",
        &["outcome"],
        &PBS_METRICS_REGISTRY
    )
    .unwrap();

    /// Duration of proposed block simulations in seconds
    static ref SIMULATION_LATENCY: Histogram = register_histogram_with_registry!(
        "proposal_sim_latency_secs",
        "Latency of proposed block simulations",
        vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        &PBS_METRICS_REGISTRY
    )
    .unwrap();

    static ref INGRESS_LATENCY: HistogramVec = register_histogram_vec_with_registry!(
        "ingress_latency_secs",
        "Latency of ingress requests",
        &["endpoint"],
        vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        &PBS_METRICS_REGISTRY
    )
    .unwrap();

    //////////////// BIDS ////////////////

    static ref BID_OUTCOME: IntCounterVec = register_int_counter_vec_with_registry!(
        "bid_outcome_total",
        "Count of builder bids by outcome",
        &["outcome"],
        &PBS_METRICS_REGISTRY
    )
    .unwrap();

    pub static ref TASK_COUNT: GaugeVec = register_gauge_vec_with_registry!(
        "task_count",
        "Number of running tasks",
        &["label"],
        &PBS_METRICS_REGISTRY
    )
    .unwrap();
}

pub struct RelayMetrics;

impl RelayMetrics {
    pub fn registration(transport: &str, is_success: bool) {
        REGISTRATION_STATUS.with_label_values(&[transport, is_success.to_string().as_str()]).inc();
    }

    pub fn relay_count(transport: &str, count: usize) {
        RELAY_COUNT.with_label_values(&[transport]).set(count as f64);
    }
}

pub struct ProposalMetrics;

impl ProposalMetrics {
    pub fn outcome(outcome: &str) {
        PROPOSAL_OUTCOME.with_label_values(&[outcome]).inc();
    }

    pub fn sim_latency(duration: Duration) {
        SIMULATION_LATENCY.observe(duration.as_secs_f64());
    }

    pub fn ingress_latency(endpoint: &str, duration: Duration) {
        INGRESS_LATENCY.with_label_values(&[endpoint]).observe(duration.as_secs_f64());
    }
}

pub struct BidMetrics;

impl BidMetrics {
    pub fn outcome(outcome: &str) {
        BID_OUTCOME.with_label_values(&[outcome]).inc();
    }
}
