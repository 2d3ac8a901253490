//! Data transfers: PASV/PORT negotiation, LIST, RETR, and the staged
//! data-socket lifecycle

use super::support;
use ftp_rs::{FtpClient, FtpError, netaddr};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

/// Connect the real client, force plain passive mode, and log in
async fn passive_client(server: &support::TestServer) -> FtpClient {
    let mut client = FtpClient::connect("127.0.0.1", server.addr.port(), None)
        .await
        .unwrap();
    if !client.is_passive() {
        client.toggle_passive().unwrap();
    }
    if client.is_extended() {
        client.toggle_extended().unwrap();
    }
    match client.send_user("alice").await.unwrap() {
        ftp_rs::LoginStep::NeedPassword => client.send_pass("secret").await.unwrap(),
        ftp_rs::LoginStep::LoggedIn => {}
    }
    client
}

/// Passive RETR of a 5-byte file lands byte-for-byte, and `get` writes the
/// local copy
#[tokio::test]
async fn test_passive_retr_small_file() {
    let server = support::spawn_server("xfer-retr").await;
    std::fs::write(server.root.join("hello.txt"), b"hello").unwrap();
    let mut client = passive_client(&server).await;

    let payload = client.retr("hello.txt").await.unwrap();
    assert_eq!(payload, b"hello");

    let local = server.root.join("local-copy.txt");
    let written = client.retr_to_file("hello.txt", &local).await.unwrap();
    assert_eq!(written, 5);
    assert_eq!(std::fs::read(&local).unwrap(), b"hello");
}

/// RETR of an empty file succeeds with a zero-byte payload
#[tokio::test]
async fn test_passive_retr_empty_file() {
    let server = support::spawn_server("xfer-empty").await;
    std::fs::write(server.root.join("empty.dat"), b"").unwrap();
    let mut client = passive_client(&server).await;

    let payload = client.retr("empty.dat").await.unwrap();
    assert!(payload.is_empty());

    // The control channel is still in sync for the next operation
    std::fs::write(server.root.join("next.txt"), b"next").unwrap();
    assert_eq!(client.retr("next.txt").await.unwrap(), b"next");
}

/// RETR of a missing file is refused with 550 and the session survives
#[tokio::test]
async fn test_passive_retr_missing_file() {
    let server = support::spawn_server("xfer-missing").await;
    std::fs::write(server.root.join("real.txt"), b"real").unwrap();
    let mut client = passive_client(&server).await;

    let err = client.retr("no-such-file.txt").await.unwrap_err();
    assert!(matches!(err, FtpError::NonFatal { code: 550, .. }), "got {err:?}");

    assert_eq!(client.retr("real.txt").await.unwrap(), b"real");
}

/// Passive LIST of a directory is line-by-line equal to an OS directory
/// enumeration, in enumeration order
#[tokio::test]
async fn test_passive_list_matches_directory() {
    let server = support::spawn_server("xfer-list").await;
    let dir = server.root.join("files");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("a.txt"), b"a").unwrap();
    std::fs::write(dir.join("b.txt"), b"bb").unwrap();
    std::fs::create_dir_all(dir.join("subdir")).unwrap();
    let mut client = passive_client(&server).await;

    let payload = client.list(Some("files")).await.unwrap();
    let listed: Vec<String> = String::from_utf8(payload)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();

    let expected: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();

    assert_eq!(listed, expected);
}

/// LIST of a single regular file yields exactly one line
#[tokio::test]
async fn test_list_single_file_target() {
    let server = support::spawn_server("xfer-listfile").await;
    std::fs::write(server.root.join("hello.txt"), b"hello").unwrap();
    let mut client = passive_client(&server).await;

    let payload = client.list(Some("hello.txt")).await.unwrap();
    assert_eq!(payload, b"hello.txt\n");
}

/// Active-mode LIST: the client-side listener hears the server connect in,
/// and the payload is framed by 200/125/226 in order
#[tokio::test]
async fn test_active_list_via_port_command() {
    let server = support::spawn_server("xfer-active").await;
    let dir = server.root.join("files");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("one.txt"), b"1").unwrap();

    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    // Listen first, announce second, data verb last
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let tuple = netaddr::encode_host_port("127.0.0.1".parse().unwrap(), port);
    support::expect(&mut control, &format!("PORT {tuple}"), 200).await;

    support::expect(&mut control, "LIST files", 125).await;
    let (mut data, _) = listener.accept().await.unwrap();
    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    assert_eq!(payload, b"one.txt\n");

    let reply = control.read_reply().await.unwrap();
    assert_eq!(reply.code, 226);
}

/// EPRT announces the same endpoint in extended form
#[tokio::test]
async fn test_active_retr_via_eprt_command() {
    let server = support::spawn_server("xfer-eprt").await;
    std::fs::write(server.root.join("data.bin"), b"payload").unwrap();

    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    support::expect(&mut control, &format!("EPRT |1|127.0.0.1|{port}|"), 200).await;

    support::expect(&mut control, "RETR data.bin", 125).await;
    let (mut data, _) = listener.accept().await.unwrap();
    let mut payload = Vec::new();
    data.read_to_end(&mut payload).await.unwrap();
    assert_eq!(payload, b"payload");

    let reply = control.read_reply().await.unwrap();
    assert_eq!(reply.code, 226);
}

/// A data verb with no staged data socket answers 425; a consumed or
/// failed transfer clears the staged socket
#[tokio::test]
async fn test_staged_data_socket_lifecycle() {
    let server = support::spawn_server("xfer-staging").await;
    std::fs::write(server.root.join("hello.txt"), b"hello").unwrap();

    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    // Nothing staged yet
    support::expect(&mut control, "LIST", 425).await;
    support::expect(&mut control, "RETR hello.txt", 425).await;

    // Stage a socket, then fail the transfer: the staging is consumed
    let reply = support::expect(&mut control, "PASV", 227).await;
    let (addr, port) = netaddr::parse_pasv_reply(&reply.text).unwrap();
    let _data = tokio::net::TcpStream::connect((addr, port)).await.unwrap();
    support::expect(&mut control, "RETR no-such-file.txt", 550).await;

    support::expect(&mut control, "RETR hello.txt", 425).await;
}

/// EPSV is not implemented on this server
#[tokio::test]
async fn test_epsv_not_implemented() {
    let server = support::spawn_server("xfer-epsv").await;
    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    support::expect(&mut control, "EPSV", 502).await;
}

/// PORT with a malformed tuple is a syntax error
#[tokio::test]
async fn test_port_malformed_tuple() {
    let server = support::spawn_server("xfer-badport").await;
    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    support::expect(&mut control, "PORT 1,2,3", 501).await;
    support::expect(&mut control, "PORT not,a,tuple,at,all,nope", 501).await;
    support::expect(&mut control, "PORT", 501).await;
}
