//! Common test utilities for building workflow documents.
use serde_json::{Value, json};

/// A `tool_call` node with the given parameters and output variable.
#[allow(dead_code)]
pub fn tool_call(tool_name: &str, parameters: Value, output_variable: Option<&str>) -> Value {
    let mut node = json!({
        "type": "tool_call",
        "toolName": tool_name,
        "parameters": parameters,
    });
    if let Some(var) = output_variable {
        node["outputVariable"] = json!(var);
    }
    node
}

#[allow(dead_code)]
pub fn user_input(prompt: &str, output_variable: &str) -> Value {
    json!({
        "type": "user_input",
        "prompt": prompt,
        "inputType": "text",
        "outputVariable": output_variable,
    })
}

#[allow(dead_code)]
pub fn sequence(steps: Vec<Value>) -> Value {
    json!({ "type": "sequence", "steps": steps })
}

#[allow(dead_code)]
pub fn parallel(branches: Vec<Value>) -> Value {
    json!({ "type": "parallel", "branches": branches })
}

/// Wraps a root node into a `{name, description, root}` document.
#[allow(dead_code)]
pub fn workflow(name: &str, root: Value) -> Value {
    json!({
        "name": name,
        "description": format!("Test workflow '{}'", name),
        "root": root,
    })
}

/// Reference workflow of the weather scenario:
/// ask for a location, fetch the weather, notify on both branches.
#[allow(dead_code)]
pub fn weather_reference() -> Value {
    workflow("weather", weather_root(true))
}

/// The weather scenario with the `ifFalse` branch omitted.
#[allow(dead_code)]
pub fn weather_generated() -> Value {
    workflow("weather", weather_root(false))
}

fn weather_root(with_if_false: bool) -> Value {
    let notify = || {
        tool_call(
            "sendNotification",
            json!({ "message": "Weather update for ${loc}: ${weather.summary}" }),
            None,
        )
    };
    let mut branch = json!({
        "type": "branch",
        "condition": {
            "type": "comparison",
            "left": "${weather.precipitation}",
            "operator": ">",
            "right": 0
        },
        "ifTrue": notify(),
    });
    if with_if_false {
        branch["ifFalse"] = notify();
    }

    sequence(vec![
        user_input("Which city?", "loc"),
        tool_call(
            "getWeather",
            json!({ "location": "${loc}" }),
            Some("weather"),
        ),
        branch,
    ])
}

/// A chain of containers `depth` levels deep ending in one `tool_call`.
///
/// The container at `changed_depth`, if any, is a `parallel` instead of a
/// `sequence`.
#[allow(dead_code)]
pub fn container_chain(depth: usize, changed_depth: Option<usize>) -> Value {
    let mut node = tool_call("leaf", json!({}), None);
    for level in (0..depth).rev() {
        node = if changed_depth == Some(level) {
            parallel(vec![node])
        } else {
            sequence(vec![node])
        };
    }
    workflow("chain", node)
}

/// A workflow covering every node kind.
#[allow(dead_code)]
pub fn kitchen_sink() -> Value {
    workflow(
        "kitchen_sink",
        sequence(vec![
            user_input("Which order?", "orderId"),
            json!({
                "type": "wait_for_event",
                "eventSource": "shipping",
                "eventType": "dispatched",
                "entityId": "${orderId}",
                "timeout": 3600,
                "outputVariable": "dispatch",
                "onTimeout": tool_call("escalate", json!({ "order": "${orderId}" }), None),
            }),
            parallel(vec![
                tool_call("emailCustomer", json!({ "order": "${orderId}" }), None),
                tool_call("updateLedger", json!({ "order": "${orderId}", "amount": 10 }), None),
            ]),
            json!({
                "type": "loop",
                "condition": {
                    "type": "logical",
                    "operator": "and",
                    "conditions": [
                        { "type": "comparison", "left": "${dispatch.status}", "operator": "!=", "right": "delivered" },
                        { "type": "comparison", "left": "${dispatch.attempts}", "operator": "<", "right": 5 }
                    ]
                },
                "body": tool_call("pollCarrier", json!({ "id": "${dispatch.trackingId}" }), Some("dispatch")),
            }),
        ]),
    )
}
