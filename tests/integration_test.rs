//! End-to-end tests that start the SSE server in-process and drive it through
//! a real MCP client, with the documentation site stood in by mockito.

use agora_mcp::mcp::CatalogService;
use mockito::Server;
use rmcp::model::{CallToolRequestParam, ClientCapabilities, ClientInfo, Implementation};
use rmcp::transport::{sse_server::SseServer, SseTransport};
use rmcp::ServiceExt;
use std::time::Duration;

const INDEX: &str = "\
## Componentes de formulario
- [Botón](/componente-button-codigo.html.md)
- [Botón (Angular)](/componente-button-codigo-angular.html.md)
- [Botón (propiedades)](/componente-button-propiedades.html.md)
## Navegación
- [Menú](/componente-menu-codigo.html.md)
- [Guía de accesibilidad](/guia-accesibilidad.html.md)
";

const BUTTON_PAGE: &str = r#"# Botón

### Primario

```html
<button class="agora-btn agora-btn--primary">Enviar</button>
```

### Deshabilitado

```html
<button class="agora-btn" disabled>Enviar</button>
```
"#;

const ACCESSIBILITY_PAGE: &str = "\
# Accesibilidad

Los componentes del sistema cumplen WCAG 2.1 AA.
";

fn text_of(result: &rmcp::model::CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.clone()))
        .collect()
}

#[tokio::test]
async fn serves_component_queries_over_sse() {
    let mut upstream = Server::new_async().await;
    let _index = upstream
        .mock("GET", "/llms.txt")
        .with_status(200)
        .with_body(INDEX)
        .create_async()
        .await;
    let _page = upstream
        .mock("GET", "/componente-button-codigo.html.md")
        .with_status(200)
        .with_body(BUTTON_PAGE)
        .create_async()
        .await;

    let service = CatalogService::new(&upstream.url(), Duration::from_secs(3600));
    let sse = SseServer::serve("127.0.0.1:8094".parse().unwrap())
        .await
        .unwrap();
    let port = sse.config.bind.port();
    let ct = sse.with_service(move || service.clone());

    let transport = SseTransport::start(&format!("http://127.0.0.1:{}/sse", port))
        .await
        .unwrap();
    let client_info = ClientInfo {
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "integration test client".to_string(),
            version: "0.0.1".to_string(),
        },
    };
    let client = client_info.serve(transport).await.unwrap();

    let tools = client.list_tools(Default::default()).await.unwrap();
    let names: Vec<&str> = tools.tools.iter().map(|t| t.name.as_ref()).collect();
    for expected in [
        "get_component_code_html",
        "get_component_code_nunjucks",
        "get_component_code_angular",
        "get_component_props",
        "search_components",
        "get_guideline",
        "list_categories",
        "refresh_cache",
    ] {
        assert!(names.contains(&expected), "missing tool {expected}");
    }

    let search = client
        .call_tool(CallToolRequestParam {
            name: "search_components".into(),
            arguments: serde_json::json!({ "query": "boton" }).as_object().cloned(),
        })
        .await
        .unwrap();
    let search_text = text_of(&search);
    assert!(search_text.contains("botón"));
    assert!(search_text.contains("\"match_kind\": \"alias\""));

    let code = client
        .call_tool(CallToolRequestParam {
            name: "get_component_code_html".into(),
            arguments: serde_json::json!({ "component": "boton", "variant": "primario" })
                .as_object()
                .cloned(),
        })
        .await
        .unwrap();
    let code_text = text_of(&code);
    assert!(code_text.contains("```html"));
    assert!(code_text.contains("agora-btn--primary"));
    assert!(!code_text.contains("disabled"));

    ct.cancel();
}

#[tokio::test]
async fn serves_guidelines_errors_and_refresh_over_sse() {
    let mut upstream = Server::new_async().await;
    let _index = upstream
        .mock("GET", "/llms.txt")
        .with_status(200)
        .with_body(INDEX)
        .create_async()
        .await;
    let _guide = upstream
        .mock("GET", "/guia-accesibilidad.html.md")
        .with_status(200)
        .with_body(ACCESSIBILITY_PAGE)
        .create_async()
        .await;

    let service = CatalogService::new(&upstream.url(), Duration::from_secs(3600));
    let sse = SseServer::serve("127.0.0.1:8095".parse().unwrap())
        .await
        .unwrap();
    let port = sse.config.bind.port();
    let ct = sse.with_service(move || service.clone());

    let transport = SseTransport::start(&format!("http://127.0.0.1:{}/sse", port))
        .await
        .unwrap();
    let client_info = ClientInfo {
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "integration test client".to_string(),
            version: "0.0.1".to_string(),
        },
    };
    let client = client_info.serve(transport).await.unwrap();

    let guide = client
        .call_tool(CallToolRequestParam {
            name: "get_guideline".into(),
            arguments: serde_json::json!({ "section": "accesibilidad" })
                .as_object()
                .cloned(),
        })
        .await
        .unwrap();
    assert!(text_of(&guide).contains("WCAG 2.1 AA"));

    let categories = client
        .call_tool(CallToolRequestParam {
            name: "list_categories".into(),
            arguments: None,
        })
        .await
        .unwrap();
    let categories_text = text_of(&categories);
    assert!(categories_text.contains("Componentes de formulario"));
    assert!(categories_text.contains("Navegación"));

    let missing = client
        .call_tool(CallToolRequestParam {
            name: "get_component_props".into(),
            arguments: serde_json::json!({ "component": "botella" })
                .as_object()
                .cloned(),
        })
        .await
        .unwrap();
    assert_eq!(missing.is_error, Some(true));
    assert!(text_of(&missing).contains("was not found"));

    let refresh = client
        .call_tool(CallToolRequestParam {
            name: "refresh_cache".into(),
            arguments: None,
        })
        .await
        .unwrap();
    let refresh_text = text_of(&refresh);
    assert!(refresh_text.contains("\"status\": \"ok\""));
    assert!(refresh_text.contains("4 components"));

    ct.cancel();
}
