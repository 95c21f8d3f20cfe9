use crate::{
    core::geo::LatLng,
    panel::lifecycle::MarkerSpec,
    Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Attraction,
    Park,
    Shopping,
    Dining,
    #[serde(other)]
    Other,
}

impl PlaceCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            PlaceCategory::Attraction => "🏛️",
            PlaceCategory::Dining => "🍽️",
            PlaceCategory::Shopping => "🛍️",
            PlaceCategory::Park => "🌳",
            PlaceCategory::Other => "📍",
        }
    }
}

/// A point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub category: PlaceCategory,
    pub location: String,
    pub coordinates: LatLng,
    #[serde(default)]
    pub description: Option<String>,
}

impl Place {
    /// Popup markup: name in bold, then location, then the description in italics
    pub fn popup_html(&self) -> String {
        format!(
            "<b>{}</b><br>{}<br><i>{}</i>",
            self.name,
            self.location,
            self.description.as_deref().unwrap_or_default()
        )
    }

    pub fn to_marker(&self) -> MarkerSpec {
        MarkerSpec::new(self.coordinates, self.name.clone()).with_popup(self.popup_html())
    }
}

/// Where the panel's places come from
pub trait PlaceProvider {
    fn list_places(&self) -> Vec<Place>;

    fn find(&self, id: &str) -> Option<Place> {
        self.list_places().into_iter().find(|p| p.id == id)
    }
}

/// In-memory places
#[derive(Debug, Clone, Default)]
pub struct StaticPlaces {
    places: Vec<Place>,
}

impl StaticPlaces {
    pub fn new(places: Vec<Place>) -> Self {
        Self { places }
    }

    /// Reads a JSON array of places
    pub fn from_json_str(json: &str) -> Result<Self> {
        let places: Vec<Place> = serde_json::from_str(json)?;
        log::debug!("loaded {} places", places.len());
        Ok(Self { places })
    }

    /// Points of interest around central Colombo
    pub fn colombo() -> Self {
        let place = |id: &str, name: &str, category, lat, lng, description: &str| Place {
            id: id.to_string(),
            name: name.to_string(),
            category,
            location: "Colombo".to_string(),
            coordinates: LatLng::new(lat, lng),
            description: Some(description.to_string()),
        };
        Self::new(vec![
            place(
                "1",
                "Colombo National Museum",
                PlaceCategory::Attraction,
                6.9102,
                79.8652,
                "Historical artifacts and cultural exhibits",
            ),
            place(
                "2",
                "Viharamahadevi Park",
                PlaceCategory::Park,
                6.9146,
                79.8611,
                "Largest park in Colombo with walking paths",
            ),
            place(
                "3",
                "Dutch Hospital Shopping Precinct",
                PlaceCategory::Shopping,
                6.9344,
                79.8428,
                "Historic building with shops and restaurants",
            ),
            place(
                "4",
                "Cafe Kumbuk",
                PlaceCategory::Dining,
                6.9040,
                79.8619,
                "Popular cafe with vegetarian options",
            ),
            place(
                "5",
                "Galle Face Green",
                PlaceCategory::Attraction,
                6.9271,
                79.8425,
                "Oceanside urban park with food vendors",
            ),
        ])
    }
}

impl PlaceProvider for StaticPlaces {
    fn list_places(&self) -> Vec<Place> {
        self.places.clone()
    }
}

/// Category tab plus free-text search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFilter {
    /// `None` means all categories
    pub category: Option<PlaceCategory>,
    pub query: String,
}

impl PlaceFilter {
    pub fn category(mut self, category: PlaceCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Case-insensitive match on name, location and description
    pub fn matches(&self, place: &Place) -> bool {
        if self.category.is_some_and(|c| c != place.category) {
            return false;
        }
        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        place.name.to_lowercase().contains(&query)
            || place.location.to_lowercase().contains(&query)
            || place
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
    }

    pub fn apply(&self, places: &[Place]) -> Vec<Place> {
        places.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

/// One marker per place, then the user's own position last
pub fn markers_for(places: &[Place], user_location: Option<LatLng>) -> Vec<MarkerSpec> {
    let mut markers: Vec<MarkerSpec> = places.iter().map(Place::to_marker).collect();
    if let Some(position) = user_location {
        markers.push(MarkerSpec::user_location(position).with_popup("<b>You are here</b>"));
    }
    markers
}
