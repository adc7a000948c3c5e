use super::Prober;
use crate::model::{Endpoint, ProbeOutcome, TlsVersion};
use crate::util::{now_millis, single_line};
use async_trait::async_trait;
use openssl::error::ErrorStack;
use openssl::ssl::{self, ErrorCode, Ssl, SslConnector, SslMethod, SslVerifyMode, SslVersion};
use std::pin::Pin;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_openssl::SslStream;
use tracing::debug;

// Modern OpenSSL builds refuse to offer TLS 1.0/1.1 above security level 0.
const LEGACY_CIPHERS: &str = "ALL:@SECLEVEL=0";

#[derive(Clone, Copy, Debug, Default)]
pub struct OpensslProber;

#[async_trait]
impl Prober for OpensslProber {
    async fn probe(
        &self,
        endpoint: &Endpoint,
        version: TlsVersion,
        limit: Duration,
    ) -> ProbeOutcome {
        let start = now_millis();
        let outcome = match timeout(limit, handshake(endpoint, version)).await {
            Ok(Ok(mut stream)) => {
                // Best effort close_notify; the socket is dropped either way.
                let _ = timeout(limit, stream.shutdown()).await;
                ProbeOutcome::Supported
            }
            Ok(Err(err)) => err.into_outcome(),
            Err(_) => ProbeOutcome::ConnectionFailed(format!("handshake timed out after {limit:?}")),
        };
        debug!(
            endpoint = %endpoint,
            version = %version,
            outcome = %outcome,
            ms = now_millis() - start,
            "probe finished"
        );
        outcome
    }
}

enum HandshakeError {
    Setup(String),
    Connect(std::io::Error),
    Tls(ssl::Error),
}

impl HandshakeError {
    fn into_outcome(self) -> ProbeOutcome {
        match self {
            HandshakeError::Setup(err) => {
                ProbeOutcome::ConnectionFailed(format!("TLS setup failed: {}", single_line(&err)))
            }
            HandshakeError::Connect(err) => {
                ProbeOutcome::ConnectionFailed(single_line(&err.to_string()))
            }
            HandshakeError::Tls(err) => classify(err),
        }
    }
}

/// Protocol-level rejections are `NotSupported`; anything the transport did
/// (reset, EOF mid-handshake, I/O failure) leaves the question open.
fn classify(err: ssl::Error) -> ProbeOutcome {
    if err.code() == ErrorCode::SSL && !is_transport_eof(&err) {
        return ProbeOutcome::NotSupported;
    }
    ProbeOutcome::ConnectionFailed(single_line(&err.to_string()))
}

// OpenSSL 3 reports a peer that hangs up mid-handshake as an SSL-category
// error rather than a syscall one.
fn is_transport_eof(err: &ssl::Error) -> bool {
    err.ssl_error()
        .map(|stack| stack.errors().iter().any(|e| is_unexpected_eof(e.code() as u64)))
        .unwrap_or(false)
}

const ERR_SYSTEM_FLAG: u64 = 1 << 31;
const ERR_LIB_SSL: u64 = 20;
const SSL_R_UNEXPECTED_EOF_WHILE_READING: u64 = 294;

/// Decodes an OpenSSL 3 packed error code (8 bits library, 23 bits reason).
fn is_unexpected_eof(packed: u64) -> bool {
    if packed & ERR_SYSTEM_FLAG != 0 {
        return false;
    }
    let library = (packed >> 23) & 0xff;
    let reason = packed & 0x7f_ffff;
    library == ERR_LIB_SSL && reason == SSL_R_UNEXPECTED_EOF_WHILE_READING
}

async fn handshake(
    endpoint: &Endpoint,
    version: TlsVersion,
) -> Result<SslStream<TcpStream>, HandshakeError> {
    let ssl = client_ssl(&endpoint.host, version).map_err(HandshakeError::Setup)?;

    let tcp = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
        .await
        .map_err(HandshakeError::Connect)?;
    let mut stream =
        SslStream::new(ssl, tcp).map_err(|err| HandshakeError::Setup(err.to_string()))?;
    Pin::new(&mut stream)
        .connect()
        .await
        .map_err(HandshakeError::Tls)?;
    Ok(stream)
}

/// SNI is only set for DNS names; `into_ssl` skips it for IP literals.
fn client_ssl(host: &str, version: TlsVersion) -> Result<Ssl, String> {
    connector(version)?
        .configure()
        .and_then(|cfg| cfg.verify_hostname(false).into_ssl(host))
        .map_err(|err| err.to_string())
}

fn connector(version: TlsVersion) -> Result<&'static SslConnector, String> {
    static TLS10: OnceLock<Result<SslConnector, String>> = OnceLock::new();
    static TLS11: OnceLock<Result<SslConnector, String>> = OnceLock::new();
    static TLS12: OnceLock<Result<SslConnector, String>> = OnceLock::new();
    static TLS13: OnceLock<Result<SslConnector, String>> = OnceLock::new();

    let cell = match version {
        TlsVersion::Tls10 => &TLS10,
        TlsVersion::Tls11 => &TLS11,
        TlsVersion::Tls12 => &TLS12,
        TlsVersion::Tls13 => &TLS13,
    };

    cell.get_or_init(|| build_connector(version).map_err(|err| err.to_string()))
        .as_ref()
        .map_err(Clone::clone)
}

fn build_connector(version: TlsVersion) -> Result<SslConnector, ErrorStack> {
    let mut builder = SslConnector::builder(SslMethod::tls_client())?;
    // Only protocol negotiation matters here, so accept any certificate.
    builder.set_verify(SslVerifyMode::NONE);

    let pinned = Some(ssl_version(version));
    builder.set_min_proto_version(pinned)?;
    builder.set_max_proto_version(pinned)?;

    if matches!(version, TlsVersion::Tls10 | TlsVersion::Tls11) {
        if let Err(err) = builder.set_cipher_list(LEGACY_CIPHERS) {
            debug!(version = %version, error = %err, "legacy cipher list rejected");
        }
    }

    Ok(builder.build())
}

fn ssl_version(version: TlsVersion) -> SslVersion {
    match version {
        TlsVersion::Tls10 => SslVersion::TLS1,
        TlsVersion::Tls11 => SslVersion::TLS1_1,
        TlsVersion::Tls12 => SslVersion::TLS1_2,
        TlsVersion::Tls13 => SslVersion::TLS1_3,
    }
}
