use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AdId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdPlacement {
    Banner,
    Sidebar,
    Footer,
}

impl AdPlacement {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdPlacement::Banner => "banner",
            AdPlacement::Sidebar => "sidebar",
            AdPlacement::Footer => "footer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "banner" => Some(AdPlacement::Banner),
            "sidebar" => Some(AdPlacement::Sidebar),
            "footer" => Some(AdPlacement::Footer),
            _ => None,
        }
    }
}

impl std::fmt::Display for AdPlacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A paid advertisement slot on the site. Money for ads flows through
/// orders and the ledger; this row only drives what gets rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    pub advertiser: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub placement: AdPlacement,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ad {
    pub fn new(advertiser: String, image_url: String, placement: AdPlacement) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            advertiser,
            image_url,
            link_url: None,
            placement,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_link(mut self, link_url: impl Into<String>) -> Self {
        self.link_url = Some(link_url.into());
        self
    }
}

/// Fields an ad update may change.
#[derive(Debug, Clone, Default)]
pub struct AdPatch {
    pub advertiser: Option<String>,
    pub image_url: Option<String>,
    pub link_url: Option<Option<String>>,
    pub placement: Option<AdPlacement>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_roundtrip() {
        for placement in [AdPlacement::Banner, AdPlacement::Sidebar, AdPlacement::Footer] {
            assert_eq!(AdPlacement::from_str(placement.as_str()), Some(placement));
        }
    }

    #[test]
    fn test_new_ad_is_active() {
        let ad = Ad::new("Corner Bakery".into(), "/img/bakery.png".into(), AdPlacement::Banner);
        assert!(ad.active);
        assert!(ad.link_url.is_none());
    }
}
