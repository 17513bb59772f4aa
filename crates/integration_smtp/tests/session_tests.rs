//! SMTP dialogue tests against a scripted in-process server
//!
//! The server speaks plain SMTP on a loopback port and records every line
//! the client sends.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::sync::Arc;

use integration_smtp::{EmailComposition, SmtpClient, SmtpConfig, SmtpError, SmtpSecurity};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpListener,
    sync::Mutex,
    task::JoinHandle,
};

/// Reply codes the scripted server uses for each stage
#[derive(Clone, Copy)]
struct Script {
    auth: &'static str,
    rcpt: &'static str,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            auth: "235 2.7.0 Authentication successful",
            rcpt: "250 2.1.5 OK",
        }
    }
}

async fn spawn_server(script: Script) -> (u16, Arc<Mutex<Vec<String>>>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let transcript = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&transcript);

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();

        write.write_all(b"220 test.local ESMTP ready\r\n").await.unwrap();
        let mut in_data = false;

        while let Ok(Some(line)) = lines.next_line().await {
            log.lock().await.push(line.clone());

            if in_data {
                if line == "." {
                    in_data = false;
                    write.write_all(b"250 2.0.0 queued\r\n").await.unwrap();
                }
                continue;
            }

            let reply = match line.split(' ').next().unwrap_or_default() {
                "EHLO" => "250-test.local\r\n250-AUTH PLAIN\r\n250 8BITMIME".to_string(),
                "AUTH" => script.auth.to_string(),
                "MAIL" => "250 2.1.0 OK".to_string(),
                "RCPT" => script.rcpt.to_string(),
                "DATA" => {
                    in_data = true;
                    "354 Go ahead".to_string()
                },
                "QUIT" => {
                    write.write_all(b"221 bye\r\n").await.ok();
                    break;
                },
                _ => "500 unknown".to_string(),
            };
            write
                .write_all(format!("{reply}\r\n").as_bytes())
                .await
                .unwrap();
        }
    });

    (port, transcript, handle)
}

fn client_for(port: u16, username: &str) -> SmtpClient {
    let config = SmtpConfig::with_credentials(username, "app-password")
        .with_server("127.0.0.1", port, SmtpSecurity::None)
        .with_from("reports@example.com");
    SmtpClient::new(SmtpConfig {
        timeout_secs: Some(5),
        ..config
    })
}

#[tokio::test]
async fn delivers_message_with_auth_plain() {
    let (port, transcript, handle) = spawn_server(Script::default()).await;
    let client = client_for(port, "reports@example.com");
    let email = EmailComposition::new(
        "alice@example.com",
        "Hourly Weather Report",
        "Weather Report for Paris, FR:\nHumidity: 60%\n",
    );

    let message_id = client.send_email(&email).await.unwrap();
    handle.await.unwrap();

    assert!(message_id.starts_with('<'));
    assert!(message_id.ends_with("@example.com>"));

    let lines = transcript.lock().await;
    assert!(lines[0].starts_with("EHLO "));
    // base64("\0reports@example.com\0app-password")
    assert_eq!(
        lines[1],
        "AUTH PLAIN AHJlcG9ydHNAZXhhbXBsZS5jb20AYXBwLXBhc3N3b3Jk"
    );
    assert_eq!(lines[2], "MAIL FROM:<reports@example.com>");
    assert_eq!(lines[3], "RCPT TO:<alice@example.com>");
    assert_eq!(lines[4], "DATA");
    assert!(lines.contains(&"Subject: Hourly Weather Report".to_string()));
    assert!(lines.contains(&"Weather Report for Paris, FR:".to_string()));
    assert!(lines.contains(&"Humidity: 60%".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn skips_auth_without_username() {
    let (port, transcript, handle) = spawn_server(Script::default()).await;
    let client = client_for(port, "");
    let email = EmailComposition::new("alice@example.com", "s", "body");

    client.send_email(&email).await.unwrap();
    handle.await.unwrap();

    let lines = transcript.lock().await;
    assert!(!lines.iter().any(|l| l.starts_with("AUTH")));
    assert_eq!(lines[1], "MAIL FROM:<reports@example.com>");
}

#[tokio::test]
async fn rejected_credentials_fail_authentication() {
    let (port, _transcript, _handle) = spawn_server(Script {
        auth: "535 5.7.8 Username and Password not accepted",
        ..Script::default()
    })
    .await;
    let client = client_for(port, "reports@example.com");
    let email = EmailComposition::new("alice@example.com", "s", "body");

    let err = client.send_email(&email).await.unwrap_err();
    assert!(matches!(err, SmtpError::AuthenticationFailed));
}

#[tokio::test]
async fn rejected_recipient_is_invalid_address() {
    let (port, _transcript, _handle) = spawn_server(Script {
        rcpt: "550 5.1.1 No such user",
        ..Script::default()
    })
    .await;
    let client = client_for(port, "reports@example.com");
    let email = EmailComposition::new("ghost@example.com", "s", "body");

    let err = client.send_email(&email).await.unwrap_err();
    match err {
        SmtpError::InvalidAddress(msg) => assert!(msg.contains("No such user")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn body_lines_starting_with_dot_are_stuffed() {
    let (port, transcript, handle) = spawn_server(Script::default()).await;
    let client = client_for(port, "reports@example.com");
    let email = EmailComposition::new("alice@example.com", "s", "first\n.hidden\nlast");

    client.send_email(&email).await.unwrap();
    handle.await.unwrap();

    let lines = transcript.lock().await;
    assert!(lines.contains(&"..hidden".to_string()));
    assert!(lines.contains(&"last".to_string()));
}
