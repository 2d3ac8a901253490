//! Shared harness: spawn a real server in a scratch directory and drive it
//! over loopback control connections.

use ftp_rs::{ControlChannel, FtpServer, Reply};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::{TcpListener, TcpStream};

/// Accounts every test server knows about
pub const ACCOUNTS: &str = "2\r\nalice\r\nsecret\r\nbob\r\nhunter2\r\n";

/// A running server plus the scratch directory its sessions are rooted in
pub struct TestServer {
    pub addr: SocketAddr,
    pub root: PathBuf,
}

/// Create a scratch directory, write a config and accounts file into it,
/// and serve on an ephemeral loopback port rooted there
pub async fn spawn_server(tag: &str) -> TestServer {
    spawn_server_rooted(tag, None).await
}

/// Like [`spawn_server`], with the session root overridden
pub async fn spawn_server_rooted(tag: &str, root_override: Option<PathBuf>) -> TestServer {
    let scratch = std::env::temp_dir().join(format!("ftp-rs-e2e-{}-{}", std::process::id(), tag));
    std::fs::create_dir_all(&scratch).unwrap();

    let accounts_path = scratch.join("accounts.txt");
    std::fs::write(&accounts_path, ACCOUNTS).unwrap();

    let config_path = scratch.join("ftpd.conf");
    std::fs::write(
        &config_path,
        format!(
            "logdirectory={}\nnumlogfiles=5\nnextlognum=000\nusernamefile={}\nport_mode=YES\npasv_mode=YES\n",
            scratch.join("logs").display(),
            accounts_path.display(),
        ),
    )
    .unwrap();

    let root = root_override.unwrap_or_else(|| scratch.clone());
    let server = FtpServer::initialize(&config_path)
        .await
        .unwrap()
        .with_root(root.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.serve_on(listener));

    TestServer {
        addr,
        root: scratch,
    }
}

/// Open a control connection and consume the 220 greeting
pub async fn connect(server: &TestServer) -> ControlChannel {
    let stream = TcpStream::connect(server.addr).await.unwrap();
    let mut control = ControlChannel::new(stream);
    let greeting = control.read_reply().await.unwrap();
    assert_eq!(greeting.code, 220);
    control
}

/// Send one command line and read one reply
pub async fn exchange(control: &mut ControlChannel, line: &str) -> Reply {
    control.send_command(&format!("{line}\r\n")).await.unwrap();
    control.read_reply().await.unwrap()
}

/// Send one command and require a specific reply code
pub async fn expect(control: &mut ControlChannel, line: &str, code: u16) -> Reply {
    let reply = exchange(control, line).await;
    assert_eq!(reply.code, code, "{line:?} answered {} {}", reply.code, reply.text);
    reply
}

/// Run the USER/PASS handshake as alice
pub async fn login(control: &mut ControlChannel) {
    expect(control, "USER alice", 331).await;
    expect(control, "PASS secret", 230).await;
}
