use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, error, info};
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;

use crate::config::{GpioConfig, RemoteConfig};
use crate::error::GpioError;
use crate::gpio::{
    BackendKind, GpioBackend, NumberingMode, NumberingSlot, PinArg, PinConfig, PinInfo, PinState,
    SetupRequest,
};
use crate::protocol::{Envelope, ServiceInfo, StateRequest, Status, WirePinInfo};

/// Header carrying the shared key, checked by the peer when it has one configured.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Proxies every pin operation to a peer speaking the HTTP protocol in
/// [`protocol`](crate::protocol). One request per operation, no caching:
/// every read goes to the peer.
pub struct RemoteBackend {
    base_url: String,
    client: Client,
    numbering: NumberingSlot,
}

impl RemoteBackend {
    pub fn new(remote: &RemoteConfig, gpio: &GpioConfig) -> Result<Self, GpioError> {
        let url = Url::parse(&remote.base_url).map_err(|e| {
            GpioError::BackendUnavailable(format!("invalid base url {}: {e}", remote.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GpioError::BackendUnavailable(format!(
                "unsupported scheme {} in {}",
                url.scheme(),
                remote.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = &remote.api_key {
            let mut value = HeaderValue::from_str(key)
                .map_err(|e| GpioError::BackendUnavailable(format!("invalid api key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(remote.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| GpioError::BackendUnavailable(format!("http client: {e}")))?;

        info!("Using remote GPIO at {}", remote.base_url);
        Ok(Self {
            base_url: remote.base_url.trim_end_matches('/').to_string(),
            client,
            numbering: NumberingSlot::new(gpio),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Asks the peer to identify itself (`GET /`).
    pub async fn probe(&self) -> Result<ServiceInfo, GpioError> {
        let envelope: Envelope<ServiceInfo> = self.call(self.client.get(self.url("/"))).await?;
        let info = envelope
            .data
            .ok_or_else(|| GpioError::RemoteOperation("peer sent no service info".into()))?;
        debug!("remote peer is {} {}", info.name, info.version);
        Ok(info)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<(StatusCode, Option<Envelope<T>>), GpioError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok((status, serde_json::from_slice(&body).ok()))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, GpioError> {
        let (status, envelope) = self.exchange(request).await?;
        accept(status, envelope)
    }

    async fn fetch_pin(&self, pin: u32) -> Result<Option<PinInfo>, GpioError> {
        let request = self.client.get(self.url(&format!("/pins/{pin}")));
        let (status, envelope) = self.exchange::<WirePinInfo>(request).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let wire = accept(status, envelope)?
            .data
            .ok_or_else(|| GpioError::RemoteOperation(format!("no data for pin {pin}")))?;
        let info = PinInfo::try_from(wire)
            .map_err(|e| GpioError::RemoteOperation(format!("malformed pin {pin}: {e}")))?;
        Ok(Some(info))
    }
}

fn accept<T>(status: StatusCode, envelope: Option<Envelope<T>>) -> Result<Envelope<T>, GpioError> {
    match envelope {
        Some(envelope) if status.is_success() && envelope.status == Status::Success => Ok(envelope),
        Some(envelope) => Err(GpioError::RemoteOperation(format!(
            "HTTP {status}: {}",
            envelope.message.as_deref().unwrap_or("no message")
        ))),
        None => Err(GpioError::RemoteOperation(format!(
            "HTTP {status}: unexpected response body"
        ))),
    }
}

impl GpioBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn numbering(&self) -> NumberingMode {
        self.numbering.get()
    }

    fn set_numbering(&self, mode: NumberingMode) -> Result<(), GpioError> {
        self.numbering.set(mode)
    }

    async fn configure(&self, pin: u32, config: &PinConfig) -> Result<(), GpioError> {
        let body = SetupRequest::from(config);
        let request = self
            .client
            .post(self.url(&format!("/pins/{pin}/setup")))
            .json(&body);

        self.call::<WirePinInfo>(request)
            .await
            .inspect_err(|e| error!("Failed to set up pin {pin}: {e}"))?;
        debug!("remote pin {pin} set up as {}", config.mode);
        Ok(())
    }

    async fn write(&self, pin: u32, state: PinState) -> Result<(), GpioError> {
        let body = StateRequest {
            state: PinArg::from(state),
        };
        let request = self
            .client
            .post(self.url(&format!("/pins/{pin}/state")))
            .json(&body);

        self.call::<WirePinInfo>(request)
            .await
            .inspect_err(|e| error!("Failed to set pin {pin} to {state}: {e}"))?;
        debug!("remote pin {pin} set to {state}");
        Ok(())
    }

    /// Never fails: an unreachable peer or an unknown pin reads LOW.
    async fn read(&self, pin: u32) -> Result<PinState, GpioError> {
        match self.fetch_pin(pin).await {
            Ok(Some(info)) => Ok(info.state),
            Ok(None) => {
                error!("Failed to read pin {pin}: not configured on peer");
                Ok(PinState::Low)
            }
            Err(e) => {
                error!("Failed to read pin {pin}: {e}");
                Ok(PinState::Low)
            }
        }
    }

    async fn clear(&self, pin: Option<u32>) -> Result<(), GpioError> {
        let path = match pin {
            Some(pin) => format!("/pins/{pin}/cleanup"),
            None => "/cleanup".to_string(),
        };

        self.call::<serde_json::Value>(self.client.post(self.url(&path)))
            .await
            .inspect_err(|e| match pin {
                Some(pin) => error!("Failed to clean up pin {pin}: {e}"),
                None => error!("Failed to clean up all pins: {e}"),
            })?;
        Ok(())
    }

    async fn describe(&self, pin: u32) -> Result<Option<PinInfo>, GpioError> {
        self.fetch_pin(pin).await
    }

    async fn configured(&self) -> Result<FxHashMap<u32, PinState>, GpioError> {
        let envelope: Envelope<BTreeMap<u32, u8>> =
            self.call(self.client.get(self.url("/pins"))).await?;

        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(pin, value)| (pin, PinState::from(value != 0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(base_url: &str) -> RemoteConfig {
        RemoteConfig {
            enabled: true,
            base_url: base_url.to_string(),
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn rejects_unusable_base_urls() {
        let gpio = GpioConfig::default();
        assert!(matches!(
            RemoteBackend::new(&remote("not a url"), &gpio),
            Err(GpioError::BackendUnavailable(_))
        ));
        assert!(matches!(
            RemoteBackend::new(&remote("ftp://raspberrypi"), &gpio),
            Err(GpioError::BackendUnavailable(_))
        ));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let backend =
            RemoteBackend::new(&remote("http://raspberrypi:8000/api/"), &GpioConfig::default())
                .unwrap();
        assert_eq!(backend.base_url(), "http://raspberrypi:8000/api");
        assert_eq!(backend.url("/pins"), "http://raspberrypi:8000/api/pins");
    }
}
