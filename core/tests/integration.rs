//! `RestClient` against the live mock server over real HTTP.
//!
//! # Design
//! Each test starts the mock server on a random port in a background tokio
//! runtime and drives the client through `UreqTransport`, so request
//! assembly, header overlay and body buffering are checked on the wire.

use std::collections::HashMap;
use std::net::SocketAddr;

use rest_core::{Agent, BufferPool, Payload, RestClient, RestError, DEFAULT_CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

fn start_server() -> SocketAddr {
    let _ = env_logger::builder().is_test(true).try_init();

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
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct Created {
    id: i64,
}

#[test]
fn create_item_round_trip() {
    let addr = start_server();
    let agent = Agent::default();

    let mut client = RestClient::new(
        &agent,
        format!("http://{addr}/items"),
        "POST",
        Payload::json(json!({ "name": "x" })),
        headers(&[("X-Trace", "1")]),
    );
    let mut created = Created::default();
    client.execute().parse_response_body(&mut created);
    assert!(client.is_ok(), "unexpected error: {:?}", client.error());
    assert_eq!(client.response_status(), 200);
    assert_eq!(created.id, 7);

    // The server reflects what it received.
    let mut item = mock_server::Item {
        id: 0,
        name: String::new(),
        trace: None,
        content_type: None,
    };
    client.parse_response_body(&mut item);
    assert!(client.is_ok());
    assert_eq!(item.name, "x");
    assert_eq!(item.trace.as_deref(), Some("1"));
    assert_eq!(item.content_type.as_deref(), Some(DEFAULT_CONTENT_TYPE));
}

#[test]
fn raw_payload_and_content_type_override_reach_the_server() {
    let addr = start_server();
    let agent = Agent::default();
    let raw = "raw text, sent as-is {";

    let mut client = agent.request::<()>(
        format!("http://{addr}/echo"),
        "POST",
        Payload::raw(raw),
        headers(&[("Content-Type", "text/plain")]),
    );
    client.execute();

    assert!(client.is_ok(), "unexpected error: {:?}", client.error());
    assert_eq!(client.response_body(), raw.as_bytes());
    assert_eq!(client.response_header("x-echo-content-type"), Some("text/plain"));
    assert_eq!(client.response_header("x-echo-method"), Some("POST"));
}

#[test]
fn empty_payload_is_sent_as_null() {
    let addr = start_server();
    let agent = Agent::default();

    let mut client = agent.request::<()>(format!("http://{addr}/echo"), "PUT", Payload::Empty, HashMap::new());
    client.execute();

    assert_eq!(client.response_body(), b"null");
    assert_eq!(client.response_header("x-echo-content-type"), Some(DEFAULT_CONTENT_TYPE));
}

#[test]
fn empty_payload_is_sent_on_bodyless_methods() {
    let addr = start_server();
    let agent = Agent::default();

    for method in ["GET", "DELETE", "OPTIONS"] {
        let mut client = agent.request::<()>(format!("http://{addr}/echo"), method, Payload::Empty, HashMap::new());
        client.execute();

        assert!(client.is_ok(), "{method}: unexpected error: {:?}", client.error());
        assert_eq!(client.response_body(), b"null", "{method}");
        assert_eq!(client.response_header("x-echo-method"), Some(method));
    }
}

#[test]
fn error_status_is_returned_as_data() {
    #[derive(Debug, Default, Deserialize)]
    struct Status {
        status: u16,
    }

    let addr = start_server();
    let agent = Agent::default();

    let mut client = agent.request::<()>(
        format!("http://{addr}/status/503"),
        "GET",
        Payload::raw(""),
        HashMap::new(),
    );
    let mut body = Status::default();
    client.execute().parse_response_body(&mut body);

    assert!(client.is_ok(), "unexpected error: {:?}", client.error());
    assert_eq!(client.response_status(), 503);
    assert_eq!(body.status, 503);
}

#[test]
fn sequential_bodies_do_not_mix() {
    let addr = start_server();
    let agent = Agent::with_pool(rest_core::UreqTransport::default(), BufferPool::with_capacity(64, 1));

    let mut long = agent.request::<()>(format!("http://{addr}/bytes/20000"), "GET", Payload::raw(""), HashMap::new());
    long.execute();
    assert_eq!(long.response_body().len(), 20_000);

    let mut short = agent.request::<()>(format!("http://{addr}/echo"), "POST", Payload::raw("short"), HashMap::new());
    short.execute();
    assert_eq!(short.response_body(), b"short");
    assert_eq!(agent.pool().idle(), 1);
}

#[test]
fn connection_refused_is_a_transport_error() {
    let _ = env_logger::builder().is_test(true).try_init();
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let agent = Agent::default();

    let mut client = agent.request::<()>(format!("http://{addr}/items"), "GET", Payload::raw(""), HashMap::new());
    let mut created = Created::default();
    client.execute().parse_response_body(&mut created);

    assert!(matches!(client.error(), Some(RestError::Transport(_))));
    assert_eq!(client.response_status(), 0);
    assert!(client.response_body().is_empty());
    assert_eq!(created.id, 0);
}

#[test]
fn concurrent_clients_share_one_agent() {
    let addr = start_server();
    let agent = Agent::default();

    let mut ids: Vec<i64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let agent = &agent;
                scope.spawn(move || {
                    let mut created = Created::default();
                    let mut client = agent.request(
                        format!("http://{addr}/items"),
                        "POST",
                        Payload::json(json!({ "name": format!("item-{n}") })),
                        HashMap::new(),
                    );
                    client.execute().parse_response_body(&mut created);
                    assert!(client.is_ok(), "unexpected error: {:?}", client.error());
                    created.id
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ids.sort();
    assert_eq!(ids, [7, 8, 9, 10]);
}
