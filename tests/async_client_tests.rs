//! Async Client Tests
//!
//! The cooperative variant must honor the same wire contract as the
//! blocking one; the mock server cannot tell them apart.

mod common;

use common::{config_for, received, spawn_server, Frame};
use tickstore_client::{AsyncClient, Poll, TickError, Update};

const RECORD: &[u8] =
    br#"{"ts":1.0,"seq":1,"is_trade":true,"is_bid":false,"price":100.5,"size":2.0}"#;

fn update(ts: u64, seq: u32) -> Update {
    Update {
        ts,
        seq,
        is_trade: true,
        is_bid: false,
        price: 100.5,
        size: 2.0,
    }
}

#[tokio::test]
async fn test_ping_round_trip() {
    let (addr, rx) = spawn_server(vec![Frame::ok(b"PONG")]);
    let mut client = AsyncClient::with_config(config_for(addr))
        .await
        .expect("connect");

    assert_eq!(client.ping().await.expect("ping"), "PONG");
    assert_eq!(received(&rx), vec!["PING"]);
}

#[tokio::test]
async fn test_trickled_response_is_reassembled() {
    let (addr, _rx) = spawn_server(vec![Frame::trickled(b"PONG")]);
    let mut client = AsyncClient::with_config(config_for(addr))
        .await
        .expect("connect");

    assert_eq!(client.ping().await.expect("ping"), "PONG");
}

#[tokio::test]
async fn test_get_rejection_returns_no_value() {
    let (addr, rx) = spawn_server(vec![Frame::err(b"no such db")]);
    let mut client = AsyncClient::with_config(config_for(addr))
        .await
        .expect("connect");

    assert!(client.get(5).await.expect("get").is_none());
    assert_eq!(received(&rx), vec!["GET 5 AS JSON"]);
}

#[tokio::test]
async fn test_bulk_add_sends_fixed_sequence() {
    let frames = vec![
        Frame::ok(b""),
        Frame::ok(b""),
        Frame::ok(b""),
        Frame::ok(b""),
    ];
    let (addr, rx) = spawn_server(frames);
    let mut client = AsyncClient::with_config(config_for(addr))
        .await
        .expect("connect");

    client
        .bulk_add(&[update(1, 1), update(2, 2)])
        .await
        .expect("bulk add");

    assert_eq!(
        received(&rx),
        vec![
            "BULKADD",
            "1, 1, t ,f, 100.5, 2.0;",
            "2, 2, t ,f, 100.5, 2.0;",
            "DDAKLUB",
        ]
    );
}

#[tokio::test]
async fn test_subscribe_poll_and_next_record() {
    let frames = vec![
        Frame::ok(b""),       // SUBSCRIBE
        Frame::ok(b"NONE"),   // poll
        Frame::ok(b"NONE\n"), // poll
        Frame::ok(RECORD),    // poll
        Frame::ok(b""),       // UNSUBSCRIBE
    ];
    let (addr, _rx) = spawn_server(frames);
    let mut client = AsyncClient::with_config(config_for(addr))
        .await
        .expect("connect");

    client.subscribe("default").await.expect("subscribe");
    assert!(client.is_subscribed());

    // next_record skips the two sentinels and yields the one record
    let record = client.next_record().await.expect("record");
    assert_eq!(record.ts, 1000);
    assert_eq!(record.seq, 1);

    client.unsubscribe().await.expect("unsubscribe");
    assert!(!client.is_subscribed());
}

#[tokio::test]
async fn test_poll_without_subscribe_is_usage_error() {
    let (addr, _rx) = spawn_server(vec![]);
    let mut client = AsyncClient::with_config(config_for(addr))
        .await
        .expect("connect");

    match client.poll().await {
        Err(TickError::NotSubscribed) => {}
        other => panic!("expected usage error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_poll_sentinel_maps_to_empty() {
    let frames = vec![Frame::ok(b""), Frame::ok(b"NONE")];
    let (addr, _rx) = spawn_server(frames);
    let mut client = AsyncClient::with_config(config_for(addr))
        .await
        .expect("connect");

    client.subscribe("default").await.expect("subscribe");
    assert_eq!(client.poll().await.expect("poll"), Poll::Empty);
}
