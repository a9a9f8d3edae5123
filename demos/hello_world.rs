// A thin sketch of the out-of-scope caller this engine was pulled out of:
// a controller that builds a domain record, and a handler that maps it onto
// a wire-format response before it would be handed to an RPC server. Neither
// layer has any engineering content of its own — see SPEC_FULL.md §1 — this
// binary exists only to show the engine wired into the shape of its
// intended caller, not to be a real service entry point.
//
// Run with: cargo run --example hello-world-demo

use chrono::Utc;
use structural_copy::{deep_copy, reflect_record, ProtoTimestampHandle};
use tracing::info;

reflect_record! {
    #[derive(Debug, Clone)]
    pub struct GreetingRecord {
        pub id: i32,
        #[alias = "msg"]
        pub message: String,
        pub created_at: chrono::DateTime<chrono::Utc>,
    }
}

reflect_record! {
    #[derive(Debug, Clone, Default)]
    pub struct GreetingResponse {
        pub id: i64,
        #[alias = "message"]
        pub msg: String,
        pub created_at: ProtoTimestampHandle,
    }
}

/// Stands in for `backstageTemplateController.HelloWorld` in the original
/// source: builds the domain record, does nothing else.
fn hello_world_controller() -> GreetingRecord {
    GreetingRecord {
        id: 1,
        message: "hello world".to_string(),
        created_at: Utc::now(),
    }
}

/// Stands in for `backstageTemplateHandler.HelloWorld`: delegates to the
/// controller, then maps the domain record onto the wire response the RPC
/// layer would serialize.
fn hello_world_handler() -> Result<GreetingResponse, structural_copy::CopyError> {
    let record = hello_world_controller();
    let mut response = GreetingResponse::default();
    deep_copy(&record, &mut response)?;
    Ok(response)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match hello_world_handler() {
        Ok(response) => info!(?response, "hello world"),
        Err(err) => eprintln!("failed to say hello: {err}"),
    }
}
