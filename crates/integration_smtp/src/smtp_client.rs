//! SMTP client implementation
//!
//! Provides async message submission using tokio and tokio-native-tls.
//! One connection is opened per message.

use std::time::Duration;

use base64::Engine;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tracing::{debug, error, instrument, trace};

use crate::{EmailComposition, SmtpConfig, SmtpError, SmtpSecurity, tls::build_tls_connector};

/// SMTP submission client
#[derive(Debug, Clone)]
pub struct SmtpClient {
    config: SmtpConfig,
}

impl SmtpClient {
    /// Creates a new SMTP client with the given configuration
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub const fn config(&self) -> &SmtpConfig {
        &self.config
    }

    /// Sends an email
    ///
    /// # Returns
    /// The generated `Message-ID`
    #[instrument(skip(self, email), fields(to = %email.to))]
    pub async fn send_email(&self, email: &EmailComposition) -> Result<String, SmtpError> {
        email.validate()?;
        self.config.validate()?;

        let message_id = format!(
            "<{}.{}@{}>",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4(),
            Self::extract_domain(self.config.sender())
        );
        let content = self.build_email_content(email, &message_id);

        match self.config.timeout_secs {
            Some(secs) => tokio::time::timeout(
                Duration::from_secs(secs),
                self.send_smtp(email.to.trim(), &content),
            )
            .await
            .map_err(|_| SmtpError::Timeout(secs))??,
            None => self.send_smtp(email.to.trim(), &content).await?,
        }

        debug!(message_id = %message_id, "Email sent successfully");
        Ok(message_id)
    }

    /// Builds the email content in RFC 5322 format
    ///
    /// Bare `\n` line endings in the body are normalised to CRLF.
    fn build_email_content(&self, email: &EmailComposition, message_id: &str) -> String {
        let date = chrono::Utc::now().format("%a, %d %b %Y %H:%M:%S +0000");

        let headers = format!(
            "From: {}\r\n\
             To: {}\r\n\
             Subject: {}\r\n\
             Date: {}\r\n\
             Message-ID: {}\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             Content-Transfer-Encoding: 8bit\r\n",
            self.config.sender(),
            email.to.trim(),
            email.subject,
            date,
            message_id
        );

        let body = email.body.replace("\r\n", "\n").replace('\n', "\r\n");
        format!("{headers}\r\n{body}")
    }

    /// Applies SMTP dot-stuffing to message content
    fn escape_dots(content: &str) -> String {
        let escaped = content.replace("\r\n.", "\r\n..");
        if escaped.starts_with('.') {
            format!(".{escaped}")
        } else {
            escaped
        }
    }

    /// Opens a connection according to the configured security mode and
    /// runs the submission dialogue
    async fn send_smtp(&self, to: &str, content: &str) -> Result<(), SmtpError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let stream = TcpStream::connect(&addr).await.map_err(|e| {
            error!(error = %e, addr = %addr, "Failed to connect to SMTP server");
            SmtpError::ConnectionFailed(format!("SMTP connection failed: {e}"))
        })?;

        match self.config.security {
            SmtpSecurity::Tls => {
                let tls = build_tls_connector(&self.config.tls)?;
                let tls_stream = tls.connect(&self.config.host, stream).await.map_err(|e| {
                    SmtpError::ConnectionFailed(format!("TLS handshake failed: {e}"))
                })?;
                let mut conn = BufReader::new(tls_stream);
                Self::expect_response(&mut conn, 220).await?;
                self.smtp_session(&mut conn, to, content).await
            },
            SmtpSecurity::StartTls => self.smtp_starttls_session(stream, to, content).await,
            SmtpSecurity::None => {
                let mut conn = BufReader::new(stream);
                Self::expect_response(&mut conn, 220).await?;
                self.smtp_session(&mut conn, to, content).await
            },
        }
    }

    /// Greets in plain text, upgrades with STARTTLS, then submits over TLS
    async fn smtp_starttls_session(
        &self,
        stream: TcpStream,
        to: &str,
        content: &str,
    ) -> Result<(), SmtpError> {
        let mut conn = BufReader::new(stream);

        Self::expect_response(&mut conn, 220).await?;
        Self::send_command(&mut conn, &format!("EHLO {}", Self::local_hostname())).await?;
        Self::expect_response(&mut conn, 250).await?;
        Self::send_command(&mut conn, "STARTTLS").await?;
        Self::expect_response(&mut conn, 220).await?;

        let tls = build_tls_connector(&self.config.tls)?;
        let tls_stream = tls
            .connect(&self.config.host, conn.into_inner())
            .await
            .map_err(|e| SmtpError::ConnectionFailed(format!("STARTTLS upgrade failed: {e}")))?;

        // The server sends no new greeting after the upgrade.
        let mut conn = BufReader::new(tls_stream);
        self.smtp_session(&mut conn, to, content).await
    }

    /// EHLO, optional AUTH PLAIN, envelope, DATA and QUIT
    async fn smtp_session<S>(
        &self,
        conn: &mut BufReader<S>,
        to: &str,
        content: &str,
    ) -> Result<(), SmtpError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        Self::send_command(conn, &format!("EHLO {}", Self::local_hostname())).await?;
        Self::expect_response(conn, 250).await?;

        if !self.config.username.is_empty() {
            let auth_string = format!("\0{}\0{}", self.config.username, self.config.password);
            let auth_b64 = base64::engine::general_purpose::STANDARD.encode(auth_string);

            Self::send_command(conn, &format!("AUTH PLAIN {auth_b64}")).await?;
            let (code, _) = Self::read_response(conn).await?;
            if code != 235 {
                return Err(SmtpError::AuthenticationFailed);
            }
        }

        Self::send_command(conn, &format!("MAIL FROM:<{}>", self.config.sender())).await?;
        Self::expect_response(conn, 250).await?;

        Self::send_command(conn, &format!("RCPT TO:<{to}>")).await?;
        let (code, text) = Self::read_response(conn).await?;
        if code != 250 && code != 251 {
            return Err(SmtpError::InvalidAddress(format!(
                "Recipient {to} rejected: {}",
                text.trim()
            )));
        }

        Self::send_command(conn, "DATA").await?;
        Self::expect_response(conn, 354).await?;

        let escaped_content = Self::escape_dots(content);
        conn.write_all(escaped_content.as_bytes())
            .await
            .map_err(|e| SmtpError::Protocol(format!("Failed to send content: {e}")))?;
        conn.write_all(b"\r\n.\r\n")
            .await
            .map_err(|e| SmtpError::Protocol(format!("Failed to end DATA: {e}")))?;
        conn.flush().await.ok();

        Self::expect_response(conn, 250).await?;

        // The server may close the connection without answering QUIT.
        Self::send_command(conn, "QUIT").await?;

        Ok(())
    }

    /// Sends an SMTP command
    async fn send_command<W>(writer: &mut W, command: &str) -> Result<(), SmtpError>
    where
        W: AsyncWrite + Unpin,
    {
        trace!(command = %command.split(' ').next().unwrap_or(command), "Sending SMTP command");
        writer
            .write_all(format!("{command}\r\n").as_bytes())
            .await
            .map_err(|e| SmtpError::Protocol(format!("Failed to send command: {e}")))?;
        writer.flush().await.ok();
        Ok(())
    }

    /// Reads a (possibly multi-line) SMTP reply
    async fn read_response<R>(reader: &mut BufReader<R>) -> Result<(u16, String), SmtpError>
    where
        R: AsyncRead + Unpin,
    {
        let mut response = String::new();
        loop {
            let mut line = String::new();
            let read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| SmtpError::Protocol(format!("Failed to read response: {e}")))?;
            if read == 0 {
                return Err(SmtpError::Protocol(
                    "Connection closed by server".to_string(),
                ));
            }

            trace!(line = %line.trim_end(), "SMTP response");
            response.push_str(&line);

            // The last line has a space (or nothing) after the code
            if line.len() < 4 || line.as_bytes()[3] != b'-' {
                break;
            }
        }

        let code = response
            .get(..3)
            .and_then(|c| c.parse::<u16>().ok())
            .ok_or_else(|| SmtpError::Protocol(format!("Malformed reply: {}", response.trim())))?;
        Ok((code, response))
    }

    /// Expects a specific reply code
    async fn expect_response<R>(reader: &mut BufReader<R>, expected: u16) -> Result<(), SmtpError>
    where
        R: AsyncRead + Unpin,
    {
        let (code, response) = Self::read_response(reader).await?;
        if code != expected {
            return Err(SmtpError::Protocol(format!(
                "Expected {expected}, got: {}",
                response.trim()
            )));
        }
        Ok(())
    }

    fn local_hostname() -> String {
        hostname::get().map_or_else(
            |_| "localhost".to_string(),
            |h| h.to_string_lossy().to_string(),
        )
    }

    /// Extracts domain from an email address
    fn extract_domain(email: &str) -> String {
        email
            .split('@')
            .nth(1)
            .filter(|d| !d.is_empty())
            .unwrap_or("weatherly.local")
            .to_string()
    }

    /// Checks if the SMTP server is reachable
    #[instrument(skip(self))]
    pub async fn check_connection(&self) -> bool {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        match TcpStream::connect(&addr).await {
            Ok(_) => {
                debug!("SMTP server is reachable");
                true
            },
            Err(e) => {
                debug!(error = %e, "SMTP server is not reachable");
                false
            },
        }
    }
}
