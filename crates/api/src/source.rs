//! External movement data source and the snapshot loader.
//!
//! The four collections (moves, locations, items, units) are fetched
//! concurrently and joined; nothing is derived until all four have settled.
//! A failed fetch contributes an empty collection instead of an error, and the
//! snapshot records which parts were missing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use stockledger_movements::{
    Item, Location, Lookups, MoveEvent, Placeholders, RawMoveRecord, Unit, decode_rows, normalize_all,
};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {status} from {path}")]
    Status { path: String, status: u16 },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// One of the four collections a snapshot is built from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePart {
    Moves,
    Locations,
    Items,
    Units,
}

impl SourcePart {
    pub fn path(&self) -> &'static str {
        match self {
            SourcePart::Moves => "moves",
            SourcePart::Locations => "locations",
            SourcePart::Items => "items",
            SourcePart::Units => "units",
        }
    }
}

/// Provider of raw movement records and lookup tables.
#[async_trait]
pub trait MoveSource: Send + Sync {
    async fn get_moves(&self) -> Result<Vec<RawMoveRecord>, SourceError>;
    async fn get_locations(&self) -> Result<Vec<Location>, SourceError>;
    async fn get_items(&self) -> Result<Vec<Item>, SourceError>;
    async fn get_units(&self) -> Result<Vec<Unit>, SourceError>;
}

#[async_trait]
impl<S> MoveSource for Arc<S>
where
    S: MoveSource + ?Sized,
{
    async fn get_moves(&self) -> Result<Vec<RawMoveRecord>, SourceError> {
        (**self).get_moves().await
    }

    async fn get_locations(&self) -> Result<Vec<Location>, SourceError> {
        (**self).get_locations().await
    }

    async fn get_items(&self) -> Result<Vec<Item>, SourceError> {
        (**self).get_items().await
    }

    async fn get_units(&self) -> Result<Vec<Unit>, SourceError> {
        (**self).get_units().await
    }
}

/// Normalized events plus lookups, ready for derivation.
#[derive(Debug, Clone, Default)]
pub struct MovementSnapshot {
    pub events: Vec<MoveEvent>,
    pub lookups: Lookups,
    /// Parts that failed to load and were replaced by empty collections.
    pub missing: Vec<SourcePart>,
}

impl MovementSnapshot {
    pub fn is_degraded(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Fetch all four collections concurrently and build a snapshot.
pub async fn load_snapshot<S>(source: &S, placeholders: Placeholders) -> MovementSnapshot
where
    S: MoveSource + ?Sized,
{
    let (moves, locations, items, units) = tokio::join!(
        source.get_moves(),
        source.get_locations(),
        source.get_items(),
        source.get_units(),
    );

    let mut missing = Vec::new();
    let moves = settle(SourcePart::Moves, moves, &mut missing);
    let locations = settle(SourcePart::Locations, locations, &mut missing);
    let items = settle(SourcePart::Items, items, &mut missing);
    let units = settle(SourcePart::Units, units, &mut missing);

    let events = normalize_all(&moves);
    tracing::info!(
        events = events.len(),
        locations = locations.len(),
        items = items.len(),
        units = units.len(),
        degraded = !missing.is_empty(),
        "movement snapshot loaded"
    );

    MovementSnapshot {
        events,
        lookups: Lookups::new(locations, items, units).with_placeholders(placeholders),
        missing,
    }
}

fn settle<T>(part: SourcePart, result: Result<Vec<T>, SourceError>, missing: &mut Vec<SourcePart>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(part = part.path(), error = %e, "source fetch failed; continuing with empty collection");
            missing.push(part);
            Vec::new()
        }
    }
}

/// REST collaborator: `GET {base}/moves|locations|items|units`, each a JSON array.
#[derive(Debug, Clone)]
pub struct RestMoveSource {
    client: reqwest::Client,
    base_url: String,
}

impl RestMoveSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `GET {base}/{part}` as a JSON array; row shapes are checked later, per row.
    async fn fetch_rows(&self, part: SourcePart) -> Result<Vec<JsonValue>, SourceError> {
        let url = format!("{}/{}", self.base_url, part.path());
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                path: url,
                status: status.as_u16(),
            });
        }

        res.json::<Vec<JsonValue>>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MoveSource for RestMoveSource {
    async fn get_moves(&self) -> Result<Vec<RawMoveRecord>, SourceError> {
        let rows = self.fetch_rows(SourcePart::Moves).await?;
        Ok(rows.into_iter().map(RawMoveRecord).collect())
    }

    async fn get_locations(&self) -> Result<Vec<Location>, SourceError> {
        Ok(decode_rows(&self.fetch_rows(SourcePart::Locations).await?))
    }

    async fn get_items(&self) -> Result<Vec<Item>, SourceError> {
        Ok(decode_rows(&self.fetch_rows(SourcePart::Items).await?))
    }

    async fn get_units(&self) -> Result<Vec<Unit>, SourceError> {
        Ok(decode_rows(&self.fetch_rows(SourcePart::Units).await?))
    }
}

/// In-memory source for tests/dev. Individual parts can be made to fail.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMoveSource {
    moves: Vec<RawMoveRecord>,
    locations: Vec<Location>,
    items: Vec<Item>,
    units: Vec<Unit>,
    failing: HashSet<SourcePart>,
}

impl InMemoryMoveSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_moves(mut self, moves: impl IntoIterator<Item = RawMoveRecord>) -> Self {
        self.moves = moves.into_iter().collect();
        self
    }

    pub fn with_locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations = locations.into_iter().collect();
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = Unit>) -> Self {
        self.units = units.into_iter().collect();
        self
    }

    pub fn failing(mut self, part: SourcePart) -> Self {
        self.failing.insert(part);
        self
    }

    fn serve<T: Clone>(&self, part: SourcePart, rows: &[T]) -> Result<Vec<T>, SourceError> {
        if self.failing.contains(&part) {
            return Err(SourceError::Unavailable(format!("{} offline", part.path())));
        }
        Ok(rows.to_vec())
    }
}

#[async_trait]
impl MoveSource for InMemoryMoveSource {
    async fn get_moves(&self) -> Result<Vec<RawMoveRecord>, SourceError> {
        self.serve(SourcePart::Moves, &self.moves)
    }

    async fn get_locations(&self) -> Result<Vec<Location>, SourceError> {
        self.serve(SourcePart::Locations, &self.locations)
    }

    async fn get_items(&self) -> Result<Vec<Item>, SourceError> {
        self.serve(SourcePart::Items, &self.items)
    }

    async fn get_units(&self) -> Result<Vec<Unit>, SourceError> {
        self.serve(SourcePart::Units, &self.units)
    }
}
