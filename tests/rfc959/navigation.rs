//! Working-directory commands: CWD, CDUP, PWD

use super::support;
use std::path::PathBuf;

#[tokio::test]
async fn test_pwd_reports_quoted_canonical_root() {
    let server = support::spawn_server("nav-pwd").await;
    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    let reply = support::expect(&mut control, "PWD", 257).await;
    let canonical = std::fs::canonicalize(&server.root).unwrap();
    assert_eq!(reply.text, format!("\"{}\"", canonical.display()));
}

#[tokio::test]
async fn test_cwd_moves_and_pwd_follows() {
    let server = support::spawn_server("nav-cwd").await;
    std::fs::create_dir_all(server.root.join("sub/inner")).unwrap();
    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    support::expect(&mut control, "CWD sub", 250).await;
    let reply = support::expect(&mut control, "PWD", 257).await;
    assert!(reply.text.ends_with("sub\""), "unexpected cwd: {}", reply.text);

    // Relative resolution continues from the new directory
    support::expect(&mut control, "CWD inner", 250).await;
    let reply = support::expect(&mut control, "PWD", 257).await;
    assert!(reply.text.ends_with("inner\""));

    // And CDUP walks back up
    support::expect(&mut control, "CDUP", 200).await;
    let reply = support::expect(&mut control, "PWD", 257).await;
    assert!(reply.text.ends_with("sub\""));
}

#[tokio::test]
async fn test_cwd_rejects_missing_and_non_directories() {
    let server = support::spawn_server("nav-missing").await;
    std::fs::write(server.root.join("plain.txt"), b"x").unwrap();
    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    support::expect(&mut control, "CWD no-such-dir", 550).await;
    support::expect(&mut control, "CWD plain.txt", 550).await;
    support::expect(&mut control, "CWD", 501).await;

    // The working directory is unchanged after the failures
    let reply = support::expect(&mut control, "PWD", 257).await;
    let canonical = std::fs::canonicalize(&server.root).unwrap();
    assert_eq!(reply.text, format!("\"{}\"", canonical.display()));
}

/// A `..` path that walks out through a missing component cannot
/// canonicalise and is rejected
#[tokio::test]
async fn test_cwd_dot_dot_escape_rejected() {
    let server = support::spawn_server("nav-escape").await;
    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    support::expect(&mut control, "CWD missing/../../somewhere", 550).await;
}

/// CDUP at the filesystem root has nowhere to go
#[tokio::test]
async fn test_cdup_rejected_at_filesystem_root() {
    let server = support::spawn_server_rooted("nav-root", Some(PathBuf::from("/"))).await;
    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    let reply = support::expect(&mut control, "PWD", 257).await;
    assert_eq!(reply.text, "\"/\"");
    support::expect(&mut control, "CDUP", 550).await;
}

/// CWD accepts absolute paths regardless of the current directory
#[tokio::test]
async fn test_cwd_absolute_path() {
    let server = support::spawn_server("nav-absolute").await;
    std::fs::create_dir_all(server.root.join("target")).unwrap();
    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    let absolute = server.root.join("target");
    support::expect(&mut control, &format!("CWD {}", absolute.display()), 250).await;
    let reply = support::expect(&mut control, "PWD", 257).await;
    assert!(reply.text.ends_with("target\""));
}
