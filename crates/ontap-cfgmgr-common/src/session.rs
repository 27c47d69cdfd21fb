//! Remote ZAPI sessions.
//!
//! A [`RemoteSession`] carries one ZAPI request to the controller and hands
//! back the `results` element of a passed call. Failed calls come back as
//! typed [`CfgMgrError`]s so callers can tell "entry not found" apart from
//! real failures.
//!
//! # Example
//!
//! ```ignore
//! use ontap_cfgmgr_common::session::{ConnectionConfig, RemoteSession, ZapiHttpSession};
//! use ontap_cfgmgr_common::zapi::ZapiElement;
//!
//! let session = ZapiHttpSession::connect(&config)?;
//! let results = session.invoke(&ZapiElement::new("system-get-version")).await?;
//! println!("{}", results.child_content("version").unwrap_or_default());
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{CfgMgrError, CfgMgrResult};
use crate::zapi::{ZapiElement, EOBJECTNOTFOUND, NETAPP_ELEMENT, RESULTS_ELEMENT, ZAPI_NAMESPACE};

/// Servlet path of the ZAPI endpoint.
pub const ZAPI_SERVLET_PATH: &str = "/servlets/netapp.servlets.admin.XMLrequest_filer";

/// A channel to the management endpoint.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Invokes a ZAPI and returns the `results` element of a passed call.
    ///
    /// Fails with [`CfgMgrError::EntryNotFound`] when the controller reports
    /// the requested object as absent, [`CfgMgrError::RemoteApi`] for any
    /// other failed call and [`CfgMgrError::Transport`] when the controller
    /// cannot be reached.
    async fn invoke(&self, request: &ZapiElement) -> CfgMgrResult<ZapiElement>;
}

#[async_trait]
impl<S: RemoteSession + ?Sized> RemoteSession for Box<S> {
    async fn invoke(&self, request: &ZapiElement) -> CfgMgrResult<ZapiElement> {
        (**self).invoke(request).await
    }
}

/// Connection parameters for a ZAPI endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Cluster management hostname or address
    #[serde(default)]
    pub hostname: String,

    /// Login user
    #[serde(default)]
    pub username: String,

    /// Login password
    #[serde(default)]
    pub password: String,

    /// Use HTTPS instead of HTTP
    #[serde(default = "default_https")]
    pub https: bool,

    /// Verify the controller certificate
    #[serde(default = "default_validate_certs")]
    pub validate_certs: bool,

    /// Override the port implied by `https`
    #[serde(default)]
    pub http_port: Option<u16>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Tunnel calls to this vserver
    #[serde(default)]
    pub vserver: Option<String>,

    /// ONTAPI version announced in the envelope
    #[serde(default = "default_ontapi_version")]
    pub ontapi_version: String,
}

fn default_https() -> bool {
    true
}

fn default_validate_certs() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_ontapi_version() -> String {
    "1.110".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            username: String::new(),
            password: String::new(),
            https: default_https(),
            validate_certs: default_validate_certs(),
            http_port: None,
            timeout_secs: default_timeout_secs(),
            vserver: None,
            ontapi_version: default_ontapi_version(),
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("https", &self.https)
            .field("validate_certs", &self.validate_certs)
            .field("http_port", &self.http_port)
            .field("timeout_secs", &self.timeout_secs)
            .field("vserver", &self.vserver)
            .field("ontapi_version", &self.ontapi_version)
            .finish()
    }
}

impl ConnectionConfig {
    /// Checks that the credentials needed to open a session are present.
    pub fn validate(&self) -> CfgMgrResult<()> {
        for (field, value) in [
            ("hostname", &self.hostname),
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(CfgMgrError::invalid_config(field, "is required"));
            }
        }
        if self.timeout_secs == 0 {
            return Err(CfgMgrError::invalid_config(
                "timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Returns the full URL of the ZAPI servlet.
    pub fn endpoint_url(&self) -> String {
        let (scheme, default_port) = if self.https {
            ("https", 443)
        } else {
            ("http", 80)
        };
        let port = self.http_port.unwrap_or(default_port);
        format!(
            "{}://{}:{}{}",
            scheme, self.hostname, port, ZAPI_SERVLET_PATH
        )
    }
}

/// Wraps a request in the `<netapp>` envelope.
pub fn build_envelope(request: &ZapiElement, version: &str, vserver: Option<&str>) -> String {
    let mut envelope = ZapiElement::new(NETAPP_ELEMENT);
    envelope.set_attr("version", version);
    envelope.set_attr("xmlns", ZAPI_NAMESPACE);
    if let Some(vserver) = vserver {
        envelope.set_attr("vfiler", vserver);
    }
    envelope.add_child_elem(request.clone());

    format!(
        "<?xml version='1.0' encoding='utf-8'?>\n\
         <!DOCTYPE netapp SYSTEM 'file:/etc/netapp_gx.dtd'>\n{}",
        envelope.to_xml()
    )
}

/// Interprets a response body for the given API.
///
/// Returns the `results` element when the call passed.
pub fn interpret_response(api: &str, body: &str) -> CfgMgrResult<ZapiElement> {
    let root = ZapiElement::from_xml(body)?;
    if root.name() != NETAPP_ELEMENT {
        return Err(CfgMgrError::protocol(format!(
            "expected <{}> root, got <{}>",
            NETAPP_ELEMENT,
            root.name()
        )));
    }

    let results = root
        .child(RESULTS_ELEMENT)
        .ok_or_else(|| CfgMgrError::protocol("response has no <results> element"))?;

    match results.attr("status") {
        Some("passed") => Ok(results.clone()),
        Some("failed") => {
            let errno = results.attr("errno").unwrap_or_default();
            let reason = results.attr("reason").unwrap_or_default();
            if errno == EOBJECTNOTFOUND {
                Err(CfgMgrError::entry_not_found(api, reason))
            } else {
                Err(CfgMgrError::remote_api(api, errno, reason))
            }
        }
        other => Err(CfgMgrError::protocol(format!(
            "unexpected results status {:?}",
            other
        ))),
    }
}

/// ZAPI session over HTTP(S).
pub struct ZapiHttpSession {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
    version: String,
    vserver: Option<String>,
}

impl ZapiHttpSession {
    /// Builds a session from connection parameters.
    ///
    /// No request is sent; unreachable controllers surface on the first
    /// [`RemoteSession::invoke`].
    pub fn connect(config: &ConnectionConfig) -> CfgMgrResult<Self> {
        config.validate()?;

        if !config.validate_certs {
            warn!(hostname = %config.hostname, "Certificate validation disabled");
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.validate_certs)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CfgMgrError::transport(config.endpoint_url(), e.to_string()))?;

        Ok(Self {
            client,
            url: config.endpoint_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            version: config.ontapi_version.clone(),
            vserver: config.vserver.clone(),
        })
    }

    /// URL this session posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RemoteSession for ZapiHttpSession {
    #[instrument(skip(self, request), fields(api = %request.name()))]
    async fn invoke(&self, request: &ZapiElement) -> CfgMgrResult<ZapiElement> {
        let body = build_envelope(request, &self.version, self.vserver.as_deref());
        debug!(url = %self.url, "Invoking ZAPI");

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| CfgMgrError::transport(&self.url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CfgMgrError::remote_api(
                request.name(),
                status.as_str(),
                status.canonical_reason().unwrap_or("HTTP error"),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| CfgMgrError::transport(&self.url, e.to_string()))?;

        interpret_response(request.name(), &text)
    }
}
