// tests/integration/list_test.rs

//! End-to-end tests for directory listings

use super::fixtures::*;
use super::test_helpers::*;
use ftserve::client::Transfer;

#[tokio::test]
async fn test_list_wraps_every_entry_in_brackets() {
    let server = TestServer::with_files(&standard_files()).await;
    std::fs::create_dir(server.root_path().join("archive")).unwrap();

    let transfer = server.list().await.unwrap();
    assert_eq!(
        transfer,
        Transfer::Listing("[archive] [empty.dat] [notes.txt] [notes.txt.bak] ".to_string())
    );
}

#[tokio::test]
async fn test_list_of_empty_directory_is_empty() {
    let server = TestServer::new().await;
    assert_eq!(server.list().await.unwrap(), Transfer::Listing(String::new()));
}

#[tokio::test]
async fn test_list_wire_exchange() {
    let server = TestServer::with_files(&[(TEXT_FILE, TEXT_CONTENTS)]).await;
    let data_port = free_port();

    let mut control = server.connect().await;
    send_command(&mut control, b"-l", u32::from(data_port)).await;
    let mut data = connect_data(data_port).await;

    let ready = read_frame(&mut control).await.unwrap();
    assert_eq!(&ready[..], b"DATA");

    let listing = read_frame(&mut data).await.unwrap();
    assert_eq!(&listing[..], b"[notes.txt] ");

    // Both connections are closed once the payload is out.
    assert!(read_frame(&mut data).await.is_err());
    assert!(read_frame(&mut control).await.is_err());
}

#[tokio::test]
async fn test_list_updates_session_stats() {
    let server = TestServer::with_files(&[(TEXT_FILE, TEXT_CONTENTS)]).await;
    server.list().await.unwrap();

    let state = server.state.clone();
    assert!(wait_until(|| state.stats.get_completed_sessions() == 1).await);
    assert!(wait_until(|| state.stats.get_active_sessions() == 0).await);
    assert_eq!(state.stats.get_total_sessions(), 1);
    assert_eq!(state.stats.get_failed_sessions(), 0);
    assert_eq!(state.stats.get_bytes_sent(), "[notes.txt] ".len() as u64);
}

#[tokio::test]
async fn test_list_reflects_directory_changes_between_sessions() {
    let server = TestServer::new().await;
    assert_eq!(server.list().await.unwrap(), Transfer::Listing(String::new()));

    std::fs::write(server.root_path().join("late.txt"), b"arrived").unwrap();
    assert_eq!(
        server.list().await.unwrap(),
        Transfer::Listing("[late.txt] ".to_string())
    );
}
