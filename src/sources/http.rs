use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{Reading, ReadingSource};
use crate::config::{HeightUnit, HttpSourceConfig};
use crate::error::SourceError;

/// Fetches the water height from the tank sensor's HTTP endpoint
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    field: String,
    unit: HeightUnit,
}

impl HttpSource {
    pub fn new(config: &HttpSourceConfig) -> Result<Self, SourceError> {
        let connect = Duration::from_millis(config.connect_timeout_ms);
        let read = Duration::from_millis(config.read_timeout_ms);
        let client = reqwest::Client::builder()
            .connect_timeout(connect)
            .timeout(connect + read)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            field: config.field.clone(),
            unit: config.unit,
        })
    }
}

/// Extract the height from a response body.
///
/// Accepts a JSON object carrying `field`, or a bare number.
pub(crate) fn parse_height(body: &str, field: &str) -> Result<f64, SourceError> {
    let value: Value = serde_json::from_str(body.trim())
        .map_err(|e| SourceError::Malformed(format!("invalid JSON: {}", e)))?;

    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| SourceError::Malformed(format!("unrepresentable number {}", n))),
        Value::Object(map) => map
            .get(field)
            .and_then(Value::as_f64)
            .ok_or_else(|| SourceError::Malformed(format!("missing numeric field `{}`", field))),
        other => Err(SourceError::Malformed(format!("unexpected body: {}", other))),
    }
}

#[async_trait]
impl ReadingSource for HttpSource {
    async fn fetch(&mut self) -> Result<Reading, SourceError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        tracing::trace!(body = %body, "fetched data");

        let raw = parse_height(&body, &self.field)?;
        Ok(Reading::now(self.unit.to_meters(raw)))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::simulator::{self, TankSimulator};
    use axum::http::StatusCode;
    use axum::routing::get;
    use std::net::SocketAddr;

    async fn serve(router: axum::Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn source_for(url: String) -> HttpSource {
        HttpSource::new(&HttpSourceConfig {
            url,
            ..HttpSourceConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_parse_object_field() {
        let body = r#"{"distance_mm": 250.0, "water_level_mm": 950.0, "percent": 100.0}"#;
        assert_eq!(parse_height(body, "water_level_mm").unwrap(), 950.0);
        assert_eq!(parse_height(body, "distance_mm").unwrap(), 250.0);
    }

    #[test]
    fn test_parse_bare_number() {
        assert_eq!(parse_height("1.25\n", "water_level_mm").unwrap(), 1.25);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_height("not json", "water_level_mm"),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_height(r#"{"water_level_mm": "high"}"#, "water_level_mm"),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_height(r#"{"level": 1.0}"#, "water_level_mm"),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_height("[1.0]", "water_level_mm"),
            Err(SourceError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_from_simulator() {
        let sim = TankSimulator::new(&SimulatorConfig::default());
        let addr = serve(simulator::router(sim)).await;

        let mut source = source_for(format!("http://{}/height", addr));
        let reading = source.fetch().await.unwrap();

        // 1200 - (250 +/- 1) mm, reported in meters
        assert!(reading.height_m > 0.948 && reading.height_m < 0.952);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let router = axum::Router::new().route(
            "/height",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        );
        let addr = serve(router).await;

        let mut source = source_for(format!("http://{}/height", addr));
        assert!(matches!(
            source.fetch().await,
            Err(SourceError::Status(503))
        ));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let router = axum::Router::new().route("/height", get(|| async { "{\"oops\": true}" }));
        let addr = serve(router).await;

        let mut source = source_for(format!("http://{}/height", addr));
        assert!(matches!(
            source.fetch().await,
            Err(SourceError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_legacy_plain_body_in_meters() {
        let router = axum::Router::new().route("/waterlevel", get(|| async { "1.5" }));
        let addr = serve(router).await;

        let mut source = HttpSource::new(&HttpSourceConfig {
            url: format!("http://{}/waterlevel", addr),
            unit: HeightUnit::M,
            ..HttpSourceConfig::default()
        })
        .unwrap();
        assert_eq!(source.fetch().await.unwrap().height_m, 1.5);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut source = source_for(format!("http://{}/height", addr));
        assert!(matches!(source.fetch().await, Err(SourceError::Http(_))));
    }
}
