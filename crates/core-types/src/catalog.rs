use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tradable instrument as published by the content API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

/// A label attached to trades and charts (setup names, themes, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An uploaded image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// An annotated chart published in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ticker: Option<TickerRef>,
    #[serde(default)]
    pub image: Option<Media>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published_at: Option<NaiveDate>,
}

/// A ticker referenced either by id or as an embedded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TickerRef {
    Id(String),
    Embedded(Ticker),
}

impl TickerRef {
    pub fn id(&self) -> &str {
        match self {
            TickerRef::Id(id) => id,
            TickerRef::Embedded(ticker) => &ticker.id,
        }
    }

    /// The display symbol, only known when the ticker is embedded.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            TickerRef::Id(_) => None,
            TickerRef::Embedded(ticker) => Some(&ticker.symbol),
        }
    }

    /// The symbol when available, otherwise the id. Used as a grouping key.
    pub fn label(&self) -> &str {
        self.symbol().unwrap_or_else(|| self.id())
    }
}

impl From<Ticker> for TickerRef {
    fn from(ticker: Ticker) -> Self {
        TickerRef::Embedded(ticker)
    }
}
