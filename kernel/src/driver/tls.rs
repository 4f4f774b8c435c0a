// TLS context for driver connections.
//
// The driver opens every connection from this one context and never
// sets a hostname itself, so host verification is pinned here: the
// expected name is `server_name`, or the only contact host when
// `server_name` is absent.

use std::net::IpAddr;

use openssl::error::ErrorStack;
use openssl::ssl::{SslContext, SslFiletype, SslMethod, SslVerifyMode};

use crate::config::resolver::{flag, FLAG_TLS_SERVER_NAME};
use crate::config::TlsConfig;
use crate::error::SchemaError;

pub fn ssl_context(tls: &TlsConfig, hosts: &[String]) -> Result<SslContext, SchemaError> {
    if tls.cert_file.is_some() != tls.key_file.is_some() {
        return Err(SchemaError::Connection(
            "tls: client certificate and key must be given together".into(),
        ));
    }

    let mut builder = SslContext::builder(SslMethod::tls()).map_err(tls_err("init"))?;

    if let Some(ca_file) = &tls.ca_file {
        builder.set_ca_file(ca_file).map_err(tls_err(ca_file))?;
    }
    if let (Some(cert_file), Some(key_file)) = (&tls.cert_file, &tls.key_file) {
        builder
            .set_certificate_chain_file(cert_file)
            .map_err(tls_err(cert_file))?;
        builder
            .set_private_key_file(key_file, SslFiletype::PEM)
            .map_err(tls_err(key_file))?;
    }

    if tls.enable_host_verification {
        let host = expected_host(tls, hosts)?;
        let param = builder.verify_param_mut();
        match host.parse::<IpAddr>() {
            Ok(ip) => param.set_ip(ip).map_err(tls_err(host))?,
            Err(_) => param.set_host(host).map_err(tls_err(host))?,
        }
        builder.set_verify(SslVerifyMode::PEER);
    } else {
        builder.set_verify(SslVerifyMode::NONE);
    }

    Ok(builder.build())
}

/// Name the server certificate must carry.
///
/// One context serves all contact points, so without an explicit server
/// name verification is only possible against a single host.
fn expected_host<'a>(tls: &'a TlsConfig, hosts: &'a [String]) -> Result<&'a str, SchemaError> {
    if let Some(name) = tls.server_name.as_deref().filter(|n| !n.is_empty()) {
        return Ok(name);
    }
    match hosts {
        [host] => Ok(host.as_str()),
        _ => Err(SchemaError::config(format!(
            "tls host verification with {} hosts requires {}",
            hosts.len(),
            flag(FLAG_TLS_SERVER_NAME)
        ))),
    }
}

fn tls_err(context: &str) -> impl Fn(ErrorStack) -> SchemaError + '_ {
    move |e| SchemaError::Connection(format!("tls: {context}: {e}"))
}
