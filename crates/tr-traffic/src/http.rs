//! HTTP flow-segment provider (feature `http`).
//!
//! Issues `GET <endpoint>?key=<api_key>&bbox=<minLat,minLon,maxLat,maxLon>&zoom=<zoom>`
//! and parses the body with [`parse_flow_segments`].

use std::time::Duration;

use reqwest::blocking::Client;

use tr_core::BoundingBox;

use crate::provider::TrafficProvider;
use crate::sample::parse_flow_segments;
use crate::{TrafficError, TrafficResult, TrafficSample};

/// Default flow-segment endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://api.tomtom.com/traffic/services/4/flowSegmentData/absolute/10/json";

pub struct HttpFlowProvider {
    client:   Client,
    endpoint: String,
    api_key:  String,
    zoom:     u8,
}

impl HttpFlowProvider {
    /// # Errors
    ///
    /// [`TrafficError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> TrafficResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrafficError::Unavailable(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            zoom: 12,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }
}

impl TrafficProvider for HttpFlowProvider {
    fn fetch_flow(&self, bbox: &BoundingBox) -> TrafficResult<Vec<TrafficSample>> {
        let zoom = self.zoom.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("bbox", bbox.to_query_string().as_str()),
                ("zoom", zoom.as_str()),
            ])
            .send()
            .map_err(|e| TrafficError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrafficError::Unavailable(format!("flow service answered {status}")));
        }
        let body = response.text().map_err(|e| TrafficError::Unavailable(e.to_string()))?;
        parse_flow_segments(&body)
    }
}
