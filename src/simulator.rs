//! Simulated ultrasonic tank sensor.
//!
//! Serves the same `/height` endpoint the real sensor exposes, so the HTTP
//! source can be exercised without hardware. The sensor sits at the top of
//! the tank and measures the distance down to the water surface.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

use crate::config::SimulatorConfig;
use crate::error::{Result, ServiceError};

/// One sensor measurement, as served to clients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub distance_mm: f64,
    pub water_level_mm: f64,
    pub percent: f64,
}

#[derive(Debug, Deserialize)]
struct SetRequest {
    distance_mm: Option<serde_json::Value>,
}

impl SetRequest {
    /// Requested distance, given as a JSON number or a numeric string
    fn distance(&self) -> Option<f64> {
        match self.distance_mm.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Shared simulator state
#[derive(Clone)]
pub struct TankSimulator {
    distance_mm: Arc<Mutex<f64>>,
    tank_height_mm: f64,
    max_water_level_mm: f64,
}

impl TankSimulator {
    pub fn new(config: &SimulatorConfig) -> Self {
        let initial = config.initial_distance_mm.clamp(0.0, config.tank_height_mm);
        Self {
            distance_mm: Arc::new(Mutex::new(initial)),
            tank_height_mm: config.tank_height_mm,
            max_water_level_mm: config.max_water_level_mm,
        }
    }

    fn calculate(&self, distance_mm: f64) -> Measurement {
        let water_level_mm = self.tank_height_mm - distance_mm;
        let percent = (water_level_mm / self.max_water_level_mm * 100.0).min(100.0);
        Measurement {
            distance_mm,
            water_level_mm,
            percent,
        }
    }

    fn with_distance<F>(&self, f: F) -> Measurement
    where
        F: FnOnce(&mut f64),
    {
        let mut distance = self
            .distance_mm
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut distance);
        self.calculate(*distance)
    }

    /// Current measurement without disturbing the state
    pub fn measurement(&self) -> Measurement {
        self.with_distance(|_| {})
    }

    /// Take a measurement, drifting the distance by up to 1 mm
    pub fn measure(&self) -> Measurement {
        let tank = self.tank_height_mm;
        self.with_distance(|d| {
            let jitter: f64 = rand::thread_rng().gen_range(-1.0..=1.0);
            *d = (*d + jitter).clamp(0.0, tank);
        })
    }

    /// Set the distance; values outside the tank are ignored
    pub fn set_distance(&self, distance_mm: f64) -> Measurement {
        let tank = self.tank_height_mm;
        self.with_distance(|d| {
            if (0.0..=tank).contains(&distance_mm) {
                *d = distance_mm;
            } else {
                tracing::debug!(distance_mm, "ignoring distance outside the tank");
            }
        })
    }

    /// Jump to a random, mostly full, distance
    pub fn randomize(&self) -> Measurement {
        self.with_distance(|d| {
            let raw: f64 = rand::thread_rng().gen_range(200.0..=400.0);
            *d = (raw * 10.0).round() / 10.0;
        })
    }
}

/// Build the simulator's HTTP routes
pub fn router(simulator: TankSimulator) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/height", get(height_handler))
        .route("/set", post(set_handler))
        .route("/random", get(random_handler))
        .with_state(simulator)
}

async fn index_handler(State(sim): State<TankSimulator>) -> Html<String> {
    let m = sim.measurement();
    Html(format!(
        "<!DOCTYPE html><html><head><meta charset='utf-8'>\
         <meta http-equiv='refresh' content='30'><title>Water Tank Level</title></head>\
         <body><h2>Water Tank Level</h2>\
         <p><b>Level:</b> {:.1} mm ({:.1}%)</p>\
         <p><small>Distance: {:.1} mm</small></p></body></html>",
        m.water_level_mm, m.percent, m.distance_mm
    ))
}

async fn height_handler(State(sim): State<TankSimulator>) -> Json<Measurement> {
    let m = sim.measure();
    tracing::debug!(distance_mm = m.distance_mm, water_level_mm = m.water_level_mm, "GET /height");
    Json(m)
}

async fn set_handler(State(sim): State<TankSimulator>, body: Bytes) -> Json<Measurement> {
    match serde_json::from_slice::<SetRequest>(&body) {
        Ok(request) => match request.distance() {
            Some(distance) => Json(sim.set_distance(distance)),
            None => Json(sim.measurement()),
        },
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparsable /set body");
            Json(sim.measurement())
        }
    }
}

async fn random_handler(State(sim): State<TankSimulator>) -> Json<Measurement> {
    Json(sim.randomize())
}

/// Serve the simulator until `cancel` fires
pub async fn serve(config: &SimulatorConfig, cancel: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "simulator listening, sensor endpoint is /height");

    axum::serve(listener, router(TankSimulator::new(config)))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| ServiceError::SimulatorError(e.to_string()))?;

    tracing::info!("simulator stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn simulator() -> TankSimulator {
        TankSimulator::new(&SimulatorConfig::default())
    }

    async fn spawn(sim: TankSimulator) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(sim)).await.unwrap();
        });
        addr
    }

    #[test]
    fn test_calculate() {
        let m = simulator().measurement();
        assert_eq!(m.distance_mm, 250.0);
        assert_eq!(m.water_level_mm, 950.0);
        assert_eq!(m.percent, 100.0);

        let m = simulator().set_distance(725.0);
        assert_eq!(m.water_level_mm, 475.0);
        assert_eq!(m.percent, 50.0);
    }

    #[test]
    fn test_percent_capped() {
        let m = simulator().set_distance(0.0);
        assert_eq!(m.water_level_mm, 1200.0);
        assert_eq!(m.percent, 100.0);
    }

    #[test]
    fn test_measure_jitters_within_one_mm() {
        let sim = simulator();
        for _ in 0..20 {
            let before = sim.measurement().distance_mm;
            let after = sim.measure().distance_mm;
            assert!((after - before).abs() <= 1.0);
        }
    }

    #[test]
    fn test_measure_stays_inside_tank() {
        let sim = simulator();
        sim.set_distance(0.0);
        for _ in 0..50 {
            assert!(sim.measure().distance_mm >= 0.0);
        }
    }

    #[test]
    fn test_set_out_of_range_ignored() {
        let sim = simulator();
        assert_eq!(sim.set_distance(5000.0).distance_mm, 250.0);
        assert_eq!(sim.set_distance(-1.0).distance_mm, 250.0);
    }

    #[test]
    fn test_set_request_accepts_numeric_strings() {
        let parse = |body: &str| serde_json::from_str::<SetRequest>(body).unwrap().distance();
        assert_eq!(parse(r#"{"distance_mm": 600}"#), Some(600.0));
        assert_eq!(parse(r#"{"distance_mm": " 612.5 "}"#), Some(612.5));
        assert_eq!(parse(r#"{"distance_mm": "deep"}"#), None);
        assert_eq!(parse(r#"{"distance_mm": [1]}"#), None);
        assert_eq!(parse("{}"), None);
    }

    #[test]
    fn test_randomize_range() {
        let sim = simulator();
        for _ in 0..20 {
            let d = sim.randomize().distance_mm;
            assert!((200.0..=400.0).contains(&d));
            assert_eq!((d * 10.0).round(), d * 10.0);
        }
    }

    #[tokio::test]
    async fn test_http_routes() {
        let addr = spawn(simulator()).await;
        let client = reqwest::Client::new();

        let set: Measurement = client
            .post(format!("http://{}/set", addr))
            .body(r#"{"distance_mm": 600}"#)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(set.distance_mm, 600.0);
        assert_eq!(set.water_level_mm, 600.0);

        // Garbage bodies leave the state alone
        let ignored: Measurement = client
            .post(format!("http://{}/set", addr))
            .body("nonsense")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(ignored.distance_mm, 600.0);

        let from_string: Measurement = client
            .post(format!("http://{}/set", addr))
            .body(r#"{"distance_mm": "700"}"#)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(from_string.distance_mm, 700.0);

        let height: Measurement = client
            .get(format!("http://{}/height", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!((height.distance_mm - 700.0).abs() <= 1.0);

        let page = client
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("Water Tank Level"));
    }

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let config = SimulatorConfig {
            bind: "127.0.0.1:0".to_string(),
            ..SimulatorConfig::default()
        };
        let cancel = CancellationToken::new();
        let handle = tokio::spawn({
            let cancel = cancel.clone();
            async move { serve(&config, cancel).await }
        });

        cancel.cancel();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
