use crate::{
    core::{
        constants::{POSITIONAL_ID_PREFIX, SELF_LOCATION_KEY},
        geo::LatLng,
    },
    location::LocationSample,
};
use serde::{Deserialize, Serialize};

/// What a marker stands for; selects its icon and live colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerVariant {
    Attraction,
    Guide,
    User,
    #[default]
    Poi,
}

impl MarkerVariant {
    /// Colour of the animated badge used for live markers.
    pub fn live_color(&self) -> &'static str {
        match self {
            MarkerVariant::Attraction => "#e53935",
            MarkerVariant::Guide => "#43a047",
            MarkerVariant::User => "#1e88e5",
            MarkerVariant::Poi => "#fb8c00",
        }
    }

    /// Static icon asset used for markers that are not live.
    pub fn static_icon(&self) -> &'static str {
        match self {
            MarkerVariant::Attraction => "icons/attraction.png",
            MarkerVariant::Guide => "icons/guide.png",
            MarkerVariant::User => "icons/user.png",
            MarkerVariant::Poi => "icons/poi.png",
        }
    }
}

impl std::fmt::Display for MarkerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerVariant::Attraction => write!(f, "attraction"),
            MarkerVariant::Guide => write!(f, "guide"),
            MarkerVariant::User => write!(f, "user"),
            MarkerVariant::Poi => write!(f, "poi"),
        }
    }
}

/// Visual treatment handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MarkerIcon {
    /// Two stacked layers: a pulsing halo under a solid dot, both in `color`.
    LiveBadge { color: &'static str },
    Static { asset: &'static str },
}

impl MarkerIcon {
    pub fn select(variant: MarkerVariant, is_live: bool) -> Self {
        if is_live {
            MarkerIcon::LiveBadge {
                color: variant.live_color(),
            }
        } else {
            MarkerIcon::Static {
                asset: variant.static_icon(),
            }
        }
    }

    pub fn layer_count(&self) -> usize {
        match self {
            MarkerIcon::LiveBadge { .. } => 2,
            MarkerIcon::Static { .. } => 1,
        }
    }
}

/// A point of interest supplied by the hosting view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Marker {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub position: LatLng,
    pub title: Option<String>,
    pub popup_content: Option<String>,
    pub variant: MarkerVariant,
    pub is_live: bool,
    pub directions_url: Option<String>,
}

impl Marker {
    pub fn new(id: impl Into<String>, position: LatLng) -> Self {
        Self {
            id: Some(id.into()),
            position,
            ..Self::default()
        }
    }

    /// Live user-variant marker for the device's own position.
    pub fn self_location(sample: &LocationSample) -> Self {
        Self {
            id: Some(SELF_LOCATION_KEY.to_string()),
            position: sample.position(),
            title: Some("You are here".to_string()),
            variant: MarkerVariant::User,
            is_live: true,
            ..Self::default()
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_popup(mut self, content: impl Into<String>) -> Self {
        self.popup_content = Some(content.into());
        self
    }

    pub fn with_variant(mut self, variant: MarkerVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn live(mut self, is_live: bool) -> Self {
        self.is_live = is_live;
        self
    }

    pub fn with_directions(mut self, url: impl Into<String>) -> Self {
        self.directions_url = Some(url.into());
        self
    }

    /// Registry key: explicit id, then user id, then `marker-<index>`.
    ///
    /// Derived keys never collide with the self-location key; an explicit id
    /// equal to it is how callers address the self-location slot.
    pub fn key(&self, index: usize) -> String {
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            return id.to_string();
        }
        match self.user_id.as_deref() {
            Some(user_id) if !user_id.is_empty() && user_id != SELF_LOCATION_KEY => {
                user_id.to_string()
            }
            _ => format!("{POSITIONAL_ID_PREFIX}{index}"),
        }
    }

    pub fn is_self_location(&self) -> bool {
        self.id.as_deref() == Some(SELF_LOCATION_KEY)
    }

    pub fn icon(&self) -> MarkerIcon {
        MarkerIcon::select(self.variant, self.is_live)
    }
}
