//! Demo MCP client for the Agora catalog server.
//!
//! Start the server first, then run the demo:
//!
//! ```sh
//! cargo run -- --server-type sse
//! cargo run --example client
//! ```

use rmcp::model::{
    CallToolRequestParam, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
};
use rmcp::transport::SseTransport;
use rmcp::ServiceExt;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let server_url = "http://127.0.0.1:8080/sse";

    let transport = SseTransport::start(server_url).await?;
    let client_info = ClientInfo {
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "agora demo client".to_string(),
            version: "0.1.0".to_string(),
        },
    };
    let client = client_info.serve(transport).await?;

    let tools = client.list_tools(Default::default()).await?;
    println!("Server exposes {} tools:", tools.tools.len());
    for tool in &tools.tools {
        println!("  {}", tool.name);
    }

    println!("\nSearching the catalog for 'boton'...");
    let result = client
        .call_tool(CallToolRequestParam {
            name: "search_components".into(),
            arguments: serde_json::json!({ "query": "boton" }).as_object().cloned(),
        })
        .await?;
    print_preview(&result);

    println!("\nFetching HTML examples for the primary button...");
    let result = client
        .call_tool(CallToolRequestParam {
            name: "get_component_code_html".into(),
            arguments: serde_json::json!({ "component": "botón", "variant": "primario" })
                .as_object()
                .cloned(),
        })
        .await?;
    print_preview(&result);

    client.cancel().await?;
    Ok(())
}

fn print_preview(result: &CallToolResult) {
    for content in &result.content {
        if let Some(text) = content.as_text() {
            let preview: String = text.text.chars().take(400).collect();
            println!("{}", preview);
            if text.text.chars().count() > 400 {
                println!("...");
            }
        }
    }
}
