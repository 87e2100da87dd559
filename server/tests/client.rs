//! Full lifecycle test of `TodoClient` against a live server.
//!
//! # Design
//! Starts the server on a random port with an in-memory database, then
//! exercises every client operation over real HTTP using ureq.

use todo_core::{ApiError, CreateTodo, HttpMethod, HttpResponse, TodoClient};
use todo_server::Config;

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses come back as data for the client to interpret.
fn execute(req: todo_core::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers,
        body,
    }
}

fn start_server(config: Config) -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, &config).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn client_lifecycle() {
    let config = Config::default();
    let addr = start_server(config.clone());
    let client = TodoClient::new(&format!("http://{addr}"), &config.api_prefix);

    // Empty list to start.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list");

    // Create two todos; they land at positions 0 and 1.
    let req = client.build_create_todo(&CreateTodo::new("React")).unwrap();
    let first = client.parse_create_todo(execute(req)).unwrap();
    assert_eq!((first.id, first.position), (1, 0));
    let req = client.build_create_todo(&CreateTodo::new("Redux")).unwrap();
    let second = client.parse_create_todo(execute(req)).unwrap();
    assert_eq!((second.id, second.position), (2, 1));

    // Blank text is rejected.
    let req = client.build_create_todo(&CreateTodo::new(" ")).unwrap();
    let err = client.parse_create_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    // Reorder far past the end clamps to the last slot.
    let req = client.build_reorder_todo(first.id, 23).unwrap();
    let todos = client.parse_reorder_todo(execute(req)).unwrap();
    let ids: Vec<i64> = todos.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 1]);

    // Toggle one item.
    let toggled = client.parse_toggle_todo(execute(client.build_toggle_todo(second.id))).unwrap();
    assert!(toggled.completed);
    assert_eq!(toggled.position, 0);

    // Complete everything.
    let todos = client.parse_complete_all(execute(client.build_complete_all())).unwrap();
    assert!(todos.iter().all(|t| t.completed));

    // Delete closes the gap.
    client.parse_delete_todo(execute(client.build_delete_todo(second.id))).unwrap();
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!((todos[0].id, todos[0].position), (1, 0));

    // Unknown ids surface as NotFound.
    let err = client.parse_toggle_todo(execute(client.build_toggle_todo(99))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let req = client.build_reorder_todo(99, 0).unwrap();
    let err = client.parse_reorder_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Every response carries a request id.
    let response = execute(client.build_list_todos());
    assert!(response.header("x-request-id").is_some());
}
