use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::http::build_http_client;
use crate::models::Coordinate;

/// Somewhere a current position can be asked for, once.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn locate(&self) -> Result<Coordinate>;
}

/// A position fixed in configuration.
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn locate(&self) -> Result<Coordinate> {
        Ok(self.0.clone())
    }
}

/// Approximate position from the public IP address.
pub struct IpLocation {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpLookup {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
}

impl IpLocation {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            client: build_http_client(std::time::Duration::from_secs(5))?,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl LocationSource for IpLocation {
    async fn locate(&self) -> Result<Coordinate> {
        let lookup: IpLookup = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if lookup.status != "success" {
            return Err(anyhow!(
                "IP lookup failed: {}",
                lookup.message.unwrap_or(lookup.status)
            ));
        }
        match (lookup.lat, lookup.lon) {
            (Some(lat), Some(lon)) => Ok(match lookup.city {
                Some(city) => Coordinate::named(lat, lon, city),
                None => Coordinate::new(lat, lon),
            }),
            _ => Err(anyhow!("IP lookup returned no coordinates")),
        }
    }
}

fn is_valid(c: &Coordinate) -> bool {
    c.latitude.is_finite()
        && c.longitude.is_finite()
        && (-90.0..=90.0).contains(&c.latitude)
        && (-180.0..=180.0).contains(&c.longitude)
}

/// Ask `source` once; any failure or nonsense answer falls back silently.
pub async fn resolve(source: &dyn LocationSource, fallback: &Coordinate) -> Coordinate {
    match source.locate().await {
        Ok(c) if is_valid(&c) => {
            info!("Location acquired: {}", c.label());
            c
        }
        Ok(c) => {
            warn!("Ignoring out-of-range location {:?}; using {}", c, fallback.label());
            fallback.clone()
        }
        Err(e) => {
            warn!("Location unavailable ({}); using {}", e, fallback.label());
            fallback.clone()
        }
    }
}

/// The source the configuration asks for.
pub fn source_from_config(config: &AppConfig) -> Box<dyn LocationSource> {
    let fixed = FixedLocation(config.location.coordinate());
    if !config.location.auto_detect {
        return Box::new(fixed);
    }
    match IpLocation::new(&config.geolocation.base_url) {
        Ok(ip) => Box::new(ip),
        Err(e) => {
            warn!("Location lookup disabled: {}", e);
            Box::new(fixed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_port_url, serve_once};

    struct Failing;

    #[async_trait]
    impl LocationSource for Failing {
        async fn locate(&self) -> Result<Coordinate> {
            Err(anyhow!("permission denied"))
        }
    }

    fn london() -> Coordinate {
        Coordinate::named(51.5074, -0.1278, "London")
    }

    #[tokio::test]
    async fn denial_falls_back_to_default() {
        assert_eq!(resolve(&Failing, &london()).await, london());
    }

    #[tokio::test]
    async fn out_of_range_answer_falls_back() {
        let bogus = FixedLocation(Coordinate::new(123.0, 0.0));
        assert_eq!(resolve(&bogus, &london()).await, london());
    }

    #[tokio::test]
    async fn fixed_location_is_returned_as_is() {
        let mecca = Coordinate::named(21.4225, 39.8262, "Makkah");
        let got = resolve(&FixedLocation(mecca.clone()), &london()).await;
        assert_eq!(got, mecca);
    }

    #[tokio::test]
    async fn ip_lookup_success() {
        let (base, _req) = serve_once(
            200,
            r#"{"status":"success","country":"Pakistan","city":"Islamabad","lat":33.6938,"lon":73.0651}"#,
        )
        .await;
        let source = IpLocation::new(&base).unwrap();
        let got = resolve(&source, &london()).await;
        assert_eq!(got, Coordinate::named(33.6938, 73.0651, "Islamabad"));
    }

    #[tokio::test]
    async fn ip_lookup_fail_status_falls_back() {
        let (base, _req) =
            serve_once(200, r#"{"status":"fail","message":"private range"}"#).await;
        let source = IpLocation::new(&base).unwrap();
        assert_eq!(resolve(&source, &london()).await, london());
    }

    #[tokio::test]
    async fn ip_lookup_unreachable_falls_back() {
        let source = IpLocation::new(&closed_port_url().await).unwrap();
        assert_eq!(resolve(&source, &london()).await, london());
    }

    #[tokio::test]
    async fn default_config_asks_the_network_first() {
        let (base, request) = serve_once(
            200,
            r#"{"status":"success","city":"Islamabad","lat":33.6938,"lon":73.0651}"#,
        )
        .await;
        let mut config = AppConfig::default();
        config.geolocation.base_url = base;

        let source = source_from_config(&config);
        let got = resolve(source.as_ref(), &config.location.coordinate()).await;
        assert_eq!(got, Coordinate::named(33.6938, 73.0651, "Islamabad"));
        assert!(request.await.unwrap().starts_with("GET "));
    }

    #[test]
    fn config_without_auto_detect_is_fixed() {
        let mut config = AppConfig::default();
        config.location.auto_detect = false;
        let source = source_from_config(&config);
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let got = rt.block_on(source.locate()).unwrap();
        assert_eq!(got, config.location.coordinate());
    }
}
