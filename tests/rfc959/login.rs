//! Authentication sequence: USER, PASS, and the state machine around them

use super::support;

#[tokio::test]
async fn test_user_pass_handshake() {
    let server = support::spawn_server("login-ok").await;
    let mut control = support::connect(&server).await;

    support::expect(&mut control, "USER alice", 331).await;
    support::expect(&mut control, "PASS secret", 230).await;
}

/// A bad password answers 530, the session stays usable, commands that
/// need a login keep answering 530, and a corrected PASS still succeeds
#[tokio::test]
async fn test_bad_password_leaves_session_at_530() {
    let server = support::spawn_server("login-badpass").await;
    let mut control = support::connect(&server).await;

    support::expect(&mut control, "USER alice", 331).await;
    support::expect(&mut control, "PASS wrong", 530).await;
    support::expect(&mut control, "PWD", 530).await;
    support::expect(&mut control, "CWD /tmp", 530).await;

    support::expect(&mut control, "PASS secret", 230).await;
    support::expect(&mut control, "PWD", 257).await;
}

#[tokio::test]
async fn test_pass_before_user_is_bad_sequence() {
    let server = support::spawn_server("login-sequence").await;
    let mut control = support::connect(&server).await;

    support::expect(&mut control, "PASS secret", 503).await;
}

#[tokio::test]
async fn test_unknown_user_rejected() {
    let server = support::spawn_server("login-unknown").await;
    let mut control = support::connect(&server).await;

    support::expect(&mut control, "USER mallory", 530).await;
}

#[tokio::test]
async fn test_missing_arguments_are_syntax_errors() {
    let server = support::spawn_server("login-args").await;
    let mut control = support::connect(&server).await;

    support::expect(&mut control, "USER", 501).await;
    support::expect(&mut control, "USER alice", 331).await;
    support::expect(&mut control, "PASS", 501).await;
}

/// Commands that require a login answer 530 before anything else: a PORT
/// issued before USER gets 530, not a syntax error
#[tokio::test]
async fn test_login_gate_precedes_argument_checks() {
    let server = support::spawn_server("login-gate").await;
    let mut control = support::connect(&server).await;

    support::expect(&mut control, "PORT 127,0,0,1,195,80", 530).await;
    support::expect(&mut control, "LIST", 530).await;
    support::expect(&mut control, "RETR hello.txt", 530).await;
    support::expect(&mut control, "PASV", 530).await;
    support::expect(&mut control, "CDUP", 530).await;
}

#[tokio::test]
async fn test_relogin_attempts_after_authentication() {
    let server = support::spawn_server("login-again").await;
    let mut control = support::connect(&server).await;
    support::login(&mut control).await;

    // A second USER is refused with the legacy already-logged-in code
    support::expect(&mut control, "USER bob", 330).await;
    // A second PASS is merely superfluous
    support::expect(&mut control, "PASS hunter2", 202).await;
}

#[tokio::test]
async fn test_quit_answers_221() {
    let server = support::spawn_server("login-quit").await;
    let mut control = support::connect(&server).await;

    support::expect(&mut control, "QUIT", 221).await;
}
