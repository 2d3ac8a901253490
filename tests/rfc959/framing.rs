//! Reply framing: `DDD SP text CRLF`, multi-line blocks, dispatch basics

use super::support;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

/// The greeting on the raw wire matches `^\d{3}[- ].*\r\n`
#[tokio::test]
async fn test_greeting_framing_on_the_wire() {
    let server = support::spawn_server("framing-greeting").await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let mut raw = Vec::new();
    while !raw.ends_with(b"\r\n") {
        let mut byte = [0u8; 1];
        assert_ne!(stream.read(&mut byte).await.unwrap(), 0, "greeting cut short");
        raw.push(byte[0]);
    }

    assert!(raw.len() > 5);
    assert!(raw[0].is_ascii_digit() && raw[1].is_ascii_digit() && raw[2].is_ascii_digit());
    assert!(raw[3] == b' ' || raw[3] == b'-');
    assert_eq!(&raw[0..3], b"220");
}

/// HELP comes back as one multi-line 214 reply, terminator included
#[tokio::test]
async fn test_help_is_a_single_multiline_reply() {
    let server = support::spawn_server("framing-help").await;
    let mut control = support::connect(&server).await;

    let reply = support::expect(&mut control, "HELP", 214).await;
    assert!(reply.text.contains('\n'), "expected a multi-line reply");
    assert!(reply.text.contains("USER"));
    assert!(reply.text.contains("RETR"));
    assert!(reply.text.ends_with("214 "), "terminator line missing: {:?}", reply.text);

    // The control channel is still in sync afterwards
    support::expect(&mut control, "HELP", 214).await;
}

/// Unknown verbs answer 502; an empty line answers 500
#[tokio::test]
async fn test_unknown_and_empty_commands() {
    let server = support::spawn_server("framing-unknown").await;
    let mut control = support::connect(&server).await;

    support::expect(&mut control, "NOOP", 502).await;
    support::expect(&mut control, "STOR afile", 502).await;
    support::expect(&mut control, "", 500).await;
}

/// Command tokenization collapses runs of spaces
#[tokio::test]
async fn test_space_runs_collapse() {
    let server = support::spawn_server("framing-spaces").await;
    let mut control = support::connect(&server).await;

    support::expect(&mut control, "USER    alice", 331).await;
    support::expect(&mut control, "PASS   secret", 230).await;
}
