//! Session isolation: concurrent control connections never share state

use super::support;

/// Two authenticated sessions interleave CWD/PWD and each sees only its
/// own working directory
#[tokio::test]
async fn test_interleaved_sessions_keep_independent_cwds() {
    let server = support::spawn_server("conc-cwd").await;
    std::fs::create_dir_all(server.root.join("one")).unwrap();
    std::fs::create_dir_all(server.root.join("two")).unwrap();

    let mut first = support::connect(&server).await;
    let mut second = support::connect(&server).await;
    support::login(&mut first).await;
    support::login(&mut second).await;

    support::expect(&mut first, "CWD one", 250).await;
    support::expect(&mut second, "CWD two", 250).await;

    let reply = support::expect(&mut first, "PWD", 257).await;
    assert!(reply.text.ends_with("one\""), "first session saw {}", reply.text);
    let reply = support::expect(&mut second, "PWD", 257).await;
    assert!(reply.text.ends_with("two\""), "second session saw {}", reply.text);

    // Moving one session does not move the other
    support::expect(&mut first, "CDUP", 200).await;
    let reply = support::expect(&mut second, "PWD", 257).await;
    assert!(reply.text.ends_with("two\""));
}

/// Authentication state is per-session too
#[tokio::test]
async fn test_sessions_authenticate_independently() {
    let server = support::spawn_server("conc-auth").await;

    let mut first = support::connect(&server).await;
    let mut second = support::connect(&server).await;

    support::login(&mut first).await;
    // The second session is still unauthenticated
    support::expect(&mut second, "PWD", 530).await;

    // Different accounts may be active at once
    support::expect(&mut second, "USER bob", 331).await;
    support::expect(&mut second, "PASS hunter2", 230).await;
    support::expect(&mut second, "PWD", 257).await;
}

/// One slow session does not block another: a session sitting idle holds
/// no lock another session needs
#[tokio::test]
async fn test_idle_session_does_not_block_others() {
    let server = support::spawn_server("conc-idle").await;

    // This session connects and then goes quiet
    let _idle = support::connect(&server).await;

    let mut active = support::connect(&server).await;
    support::login(&mut active).await;
    support::expect(&mut active, "PWD", 257).await;
    support::expect(&mut active, "QUIT", 221).await;
}
