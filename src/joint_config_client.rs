//! Client fetching a robot's joint-name ordering from a remote parameter service.
//!
//! Speaks the rosbridge JSON protocol against `rosapi/get_param`. The
//! parameter holds a JSON-encoded list of joint names, which simulation
//! setup can feed to [`Model::ordered_joints`](crate::model::Model::ordered_joints).
//! Moving the JSON messages over the wire is the [`ServiceTransport`]'s job.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::error::ParamError;

/// Request/response exchange with a rosbridge server.
pub trait ServiceTransport {
    /// Sends one `call_service` message and returns the matching `service_response`.
    fn call(&mut self, request: &Value) -> Result<Value, ParamError>;
}

/// Connection parameters of the client.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct JointStateConfigParameter {
    pub service_name: String,
    pub service_type: String,
    /// Parameter key holding the joint names, e.g. `/arm/joint_names`.
    pub joint_param_topic: String,
}

impl Default for JointStateConfigParameter {
    fn default() -> Self {
        Self {
            service_name: "rosapi/get_param".into(),
            service_type: "rosapi/GetParam".into(),
            joint_param_topic: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    #[serde(default)]
    result: Option<bool>,
    #[serde(default)]
    values: Option<GetParamValues>,
}

#[derive(Debug, Deserialize)]
struct GetParamValues {
    value: String,
}

static NEXT_CALL_ID: AtomicU64 = AtomicU64::new(0);

/// Fetches the joint-name list named by [`JointStateConfigParameter::joint_param_topic`].
pub struct JointStateConfigClient<T> {
    parameters: JointStateConfigParameter,
    transport: T,
}

impl<T: ServiceTransport> JointStateConfigClient<T> {
    pub fn new(parameters: JointStateConfigParameter, transport: T) -> Self {
        Self {
            parameters,
            transport,
        }
    }

    pub fn parameters(&self) -> &JointStateConfigParameter {
        &self.parameters
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds the rosbridge `call_service` message for the configured key.
    pub fn request(&self) -> Value {
        let id = NEXT_CALL_ID.fetch_add(1, Ordering::Relaxed);
        json!({
            "op": "call_service",
            "id": format!("call_service:{}:{id}", self.parameters.service_name),
            "service": format!("/{}", self.parameters.service_name.trim_start_matches('/')),
            "type": self.parameters.service_type,
            "args": {
                "name": self.parameters.joint_param_topic,
                "default": "",
            },
        })
    }

    /// Calls the service and decodes the ordered joint names.
    pub fn fetch_joint_names(&mut self) -> Result<Vec<String>, ParamError> {
        let request = self.request();
        debug!(
            service = %self.parameters.service_name,
            key = %self.parameters.joint_param_topic,
            "requesting joint names"
        );
        let reply = self.transport.call(&request)?;
        self.decode(reply)
    }

    /// Fills `out` with the fetched joint names.
    ///
    /// On any failure the error is logged and `out` is left empty.
    pub fn get_joint_names(&mut self, out: &mut Vec<String>) {
        out.clear();
        match self.fetch_joint_names() {
            Ok(names) => *out = names,
            Err(err) => error!(
                key = %self.parameters.joint_param_topic,
                "failed to fetch joint names: {err}"
            ),
        }
    }

    fn decode(&self, reply: Value) -> Result<Vec<String>, ParamError> {
        let response: ServiceResponse = serde_json::from_value(reply)
            .map_err(|err| ParamError::MalformedResponse(err.to_string()))?;
        if response.result == Some(false) {
            return Err(ParamError::ServiceFailed {
                service: self.parameters.service_name.clone(),
            });
        }
        let values = response
            .values
            .ok_or_else(|| ParamError::MalformedResponse("missing values".into()))?;
        serde_json::from_str(&values.value).map_err(|source| ParamError::InvalidValue {
            key: self.parameters.joint_param_topic.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted {
        reply: Result<Value, String>,
        seen: Vec<Value>,
    }

    impl ServiceTransport for Scripted {
        fn call(&mut self, request: &Value) -> Result<Value, ParamError> {
            self.seen.push(request.clone());
            self.reply.clone().map_err(ParamError::Transport)
        }
    }

    fn client(reply: Result<Value, String>) -> JointStateConfigClient<Scripted> {
        JointStateConfigClient::new(
            JointStateConfigParameter {
                joint_param_topic: "/arm/joint_names".into(),
                ..Default::default()
            },
            Scripted {
                reply,
                seen: Vec::new(),
            },
        )
    }

    #[test]
    fn request_targets_get_param() {
        let mut client = client(Ok(json!({
            "op": "service_response",
            "result": true,
            "values": { "value": "[\"shoulder\", \"elbow\", \"wrist\"]" }
        })));

        let names = client.fetch_joint_names().unwrap();
        assert_eq!(names, ["shoulder", "elbow", "wrist"]);

        let request = &client.transport().seen[0];
        assert_eq!(request["op"], "call_service");
        assert_eq!(request["service"], "/rosapi/get_param");
        assert_eq!(request["type"], "rosapi/GetParam");
        assert_eq!(request["args"]["name"], "/arm/joint_names");
    }

    #[test]
    fn failure_leaves_output_empty() {
        let mut out = vec!["stale".to_string()];
        client(Err("connection refused".into())).get_joint_names(&mut out);
        assert!(out.is_empty());

        let mut out = Vec::new();
        client(Ok(json!({ "result": false }))).get_joint_names(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn non_list_value_is_rejected() {
        let mut client = client(Ok(json!({
            "result": true,
            "values": { "value": "42" }
        })));
        assert!(matches!(
            client.fetch_joint_names(),
            Err(ParamError::InvalidValue { .. })
        ));
    }
}
