use std::sync::Arc;

use jsonrpsee::{
    core::RpcResult,
    proc_macros::rpc,
    server::{Server, ServerHandle},
    types::{error::CALL_EXECUTION_FAILED_CODE, ErrorObject},
};
use parking_lot::Mutex;
use serde_json::Value;
use url::Url;

#[rpc(server, namespace = "eth")]
pub trait MockNodeApi {
    #[method(name = "getBlockByNumber")]
    fn block_by_number(&self, tag: String, full: bool) -> RpcResult<Option<Value>>;

    #[method(name = "simulateProposedBlock")]
    fn simulate_proposed_block(&self, request: Value) -> RpcResult<Option<Value>>;
}

#[derive(Default)]
struct NodeState {
    head: Option<Value>,
    simulation: Option<Result<Value, String>>,
    block_requests: Vec<(String, bool)>,
    sim_requests: Vec<Value>,
}

/// In-process execution node. Serves no head and skips every simulation until told otherwise.
#[derive(Clone, Default)]
pub struct MockNode {
    state: Arc<Mutex<NodeState>>,
}

impl MockNode {
    pub fn set_head(&self, head: Value) {
        self.state.lock().head = Some(head);
    }

    /// `Err` answers with a call error carrying the message.
    pub fn set_simulation(&self, result: Result<Value, String>) {
        self.state.lock().simulation = Some(result);
    }

    pub fn block_requests(&self) -> Vec<(String, bool)> {
        self.state.lock().block_requests.clone()
    }

    pub fn sim_requests(&self) -> Vec<Value> {
        self.state.lock().sim_requests.clone()
    }
}

impl MockNodeApiServer for MockNode {
    fn block_by_number(&self, tag: String, full: bool) -> RpcResult<Option<Value>> {
        let mut state = self.state.lock();
        state.block_requests.push((tag, full));
        Ok(state.head.clone())
    }

    fn simulate_proposed_block(&self, request: Value) -> RpcResult<Option<Value>> {
        let mut state = self.state.lock();
        state.sim_requests.push(request);
        match state.simulation.clone() {
            None => Ok(None),
            Some(Ok(work)) => Ok(Some(work)),
            Some(Err(message)) => {
                Err(ErrorObject::owned(CALL_EXECUTION_FAILED_CODE, message, None::<()>))
            }
        }
    }
}

/// Serves `node` on an ephemeral port. The node stops once the handle is dropped.
pub async fn start_node(node: MockNode) -> (Url, ServerHandle) {
    let server = Server::builder().build("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = server.start(node.into_rpc());
    (Url::parse(&format!("http://{addr}")).unwrap(), handle)
}
