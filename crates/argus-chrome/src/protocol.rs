//! Wire types for the Chrome DevTools Protocol.
//!
//! Commands are correlated to responses by `id`; events arrive unsolicited.
//! With flattened target attachment, page-scoped traffic carries a
//! `sessionId` alongside the envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct Command {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(default)]
    pub result: Value,
    pub error: Option<ResponseError>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

/// Any message the browser can send us.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Incoming {
    Response(Response),
    Event(Event),
}

pub mod target {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize)]
    pub struct CreateTarget {
        pub url: String,
    }

    impl CreateTarget {
        pub const METHOD: &'static str = "Target.createTarget";
    }

    #[derive(Debug, Deserialize)]
    pub struct CreateTargetResponse {
        #[serde(rename = "targetId")]
        pub target_id: String,
    }

    #[derive(Debug, Serialize)]
    pub struct AttachToTarget {
        #[serde(rename = "targetId")]
        pub target_id: String,
        pub flatten: bool,
    }

    impl AttachToTarget {
        pub const METHOD: &'static str = "Target.attachToTarget";
    }

    #[derive(Debug, Deserialize)]
    pub struct AttachToTargetResponse {
        #[serde(rename = "sessionId")]
        pub session_id: String,
    }

    #[derive(Debug, Serialize)]
    pub struct CloseTarget {
        #[serde(rename = "targetId")]
        pub target_id: String,
    }

    impl CloseTarget {
        pub const METHOD: &'static str = "Target.closeTarget";
    }
}

pub mod page {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize)]
    pub struct Navigate {
        pub url: String,
    }

    impl Navigate {
        pub const METHOD: &'static str = "Page.navigate";
    }

    #[derive(Debug, Deserialize)]
    pub struct NavigateResponse {
        #[serde(rename = "frameId")]
        pub frame_id: String,
        #[serde(rename = "loaderId")]
        pub loader_id: Option<String>,
        /// Present when navigation failed outright (e.g. net::ERR_CONNECTION_REFUSED).
        #[serde(rename = "errorText")]
        pub error_text: Option<String>,
    }

    #[derive(Debug, Serialize)]
    pub struct CaptureScreenshot {
        pub format: String,
    }

    impl CaptureScreenshot {
        pub const METHOD: &'static str = "Page.captureScreenshot";
    }

    #[derive(Debug, Deserialize)]
    pub struct CaptureScreenshotResponse {
        /// Base64-encoded image payload.
        pub data: String,
    }
}

pub mod runtime {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Evaluate {
        pub expression: String,
        pub return_by_value: bool,
    }

    impl Evaluate {
        pub const METHOD: &'static str = "Runtime.evaluate";
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CallFunctionOn {
        pub object_id: String,
        pub function_declaration: String,
        pub return_by_value: bool,
    }

    impl CallFunctionOn {
        pub const METHOD: &'static str = "Runtime.callFunctionOn";
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RemoteObject {
        pub object_id: Option<String>,
        #[serde(default)]
        pub value: Value,
        pub subtype: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EvaluateResponse {
        pub result: RemoteObject,
        pub exception_details: Option<Value>,
    }
}

pub mod input {
    use serde::Serialize;

    pub const DISPATCH_KEY_EVENT: &str = "Input.dispatchKeyEvent";
    pub const DISPATCH_MOUSE_EVENT: &str = "Input.dispatchMouseEvent";

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DispatchKeyEvent {
        #[serde(rename = "type")]
        pub kind: &'static str,
        pub key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub text: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub windows_virtual_key_code: Option<u32>,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DispatchMouseEvent {
        #[serde(rename = "type")]
        pub kind: &'static str,
        pub x: f64,
        pub y: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub button: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub click_count: Option<u32>,
    }
}

pub mod network {
    pub const REQUEST_WILL_BE_SENT: &str = "Network.requestWillBeSent";
    pub const LOADING_FINISHED: &str = "Network.loadingFinished";
    pub const LOADING_FAILED: &str = "Network.loadingFailed";
}
