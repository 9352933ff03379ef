pub mod request;
pub mod response;

pub use request::{JsonRpcRequest, ResourceReadParams, RpcId, ToolCallParams};
pub use response::{
    JsonRpcError, JsonRpcNotification, JsonRpcResponse, ResourceReadResult, ResourcesListResult,
    ToolCallResult, ToolsListResult, PROTOCOL_VERSION, SERVER_NAME,
};
