//! Configuration loading (environment variables, read once at startup).

use std::net::SocketAddr;

use thiserror::Error;

use stockledger_movements::Placeholders;
use stockledger_projections::PageSize;

pub const SOURCE_URL: &str = "STOCKLEDGER_SOURCE_URL";
pub const BIND_ADDR: &str = "STOCKLEDGER_BIND_ADDR";
pub const DEFAULT_PAGE_SIZE: &str = "STOCKLEDGER_DEFAULT_PAGE_SIZE";
pub const MAX_PAGE_SIZE: &str = "STOCKLEDGER_MAX_PAGE_SIZE";
pub const UNKNOWN_LOCATION: &str = "STOCKLEDGER_UNKNOWN_LOCATION";

const DEFAULT_SOURCE_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Settings the ledger service applies to every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    pub default_page_size: PageSize,
    /// Upper bound for a limited page size (1000 unless configured).
    pub max_page_size: u32,
    pub placeholders: Placeholders,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            default_page_size: PageSize::Limited(50),
            max_page_size: 1000,
            placeholders: Placeholders::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub source_url: String,
    pub bind_addr: SocketAddr,
    pub ledger: LedgerSettings,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let source_url = get(SOURCE_URL).unwrap_or_else(|| {
            tracing::warn!("{SOURCE_URL} not set; using {DEFAULT_SOURCE_URL}");
            DEFAULT_SOURCE_URL.to_string()
        });

        let bind_raw = get(BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|_| ApiConfigError::Invalid {
            key: BIND_ADDR,
            value: bind_raw.clone(),
        })?;

        let mut ledger = LedgerSettings::default();
        if let Some(raw) = get(DEFAULT_PAGE_SIZE) {
            ledger.default_page_size = PageSize::from_raw(parse_u32(DEFAULT_PAGE_SIZE, &raw)?);
        }
        if let Some(raw) = get(MAX_PAGE_SIZE) {
            let max = parse_u32(MAX_PAGE_SIZE, &raw)?;
            if max == 0 {
                return Err(ApiConfigError::Invalid {
                    key: MAX_PAGE_SIZE,
                    value: raw,
                });
            }
            ledger.max_page_size = max;
        }
        if let Some(name) = get(UNKNOWN_LOCATION) {
            ledger.placeholders.location = name;
        }
        ledger.default_page_size = ledger.default_page_size.capped(ledger.max_page_size);

        Ok(Self {
            source_url,
            bind_addr,
            ledger,
        })
    }
}

fn parse_u32(key: &'static str, raw: &str) -> Result<u32, ApiConfigError> {
    raw.parse().map_err(|_| ApiConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ApiConfig, ApiConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = from_pairs(&[]).unwrap();
        assert_eq!(cfg.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.ledger, LedgerSettings::default());
    }

    #[test]
    fn overrides_are_read() {
        let cfg = from_pairs(&[
            (SOURCE_URL, "http://erp.local/api"),
            (BIND_ADDR, "127.0.0.1:9000"),
            (DEFAULT_PAGE_SIZE, "0"),
            (MAX_PAGE_SIZE, "200"),
            (UNKNOWN_LOCATION, "(none)"),
        ])
        .unwrap();
        assert_eq!(cfg.source_url, "http://erp.local/api");
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.ledger.default_page_size, PageSize::Unlimited);
        assert_eq!(cfg.ledger.max_page_size, 200);
        assert_eq!(cfg.ledger.placeholders.location, "(none)");
    }

    #[test]
    fn default_page_size_is_capped_by_max() {
        let cfg = from_pairs(&[(DEFAULT_PAGE_SIZE, "500"), (MAX_PAGE_SIZE, "100")]).unwrap();
        assert_eq!(cfg.ledger.default_page_size, PageSize::Limited(100));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert_eq!(
            from_pairs(&[(MAX_PAGE_SIZE, "lots")]),
            Err(ApiConfigError::Invalid {
                key: MAX_PAGE_SIZE,
                value: "lots".to_string()
            })
        );
        assert!(from_pairs(&[(MAX_PAGE_SIZE, "0")]).is_err());
        assert!(from_pairs(&[(BIND_ADDR, "nowhere")]).is_err());
    }
}
