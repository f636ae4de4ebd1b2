//! Shelter records as served by the shelter backend, and their conversion
//! into map markers.

use crate::core::geo::LatLng;
use crate::layers::marker::Marker;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geographic point in the backend's field naming
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LocationPoint> for LatLng {
    fn from(point: LocationPoint) -> Self {
        LatLng::new(point.latitude, point.longitude)
    }
}

/// One shelter as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    pub shelter_id: i64,
    pub shelter_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    pub location: LocationPoint,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub available_beds: Option<u32>,
    /// Comma separated
    #[serde(default)]
    pub services: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Shelter {
    /// Services split on commas, trimmed, empties dropped
    pub fn service_list(&self) -> Vec<String> {
        self.services
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn to_marker(&self) -> Marker {
        Marker {
            id: self.shelter_id,
            position: self.location.into(),
            available_beds: self.available_beds.unwrap_or(0),
            name: self.shelter_name.clone(),
            address: self.address.clone(),
            hours: self.opening_hours.clone(),
            phone: self.contact_phone.clone(),
            services: self.service_list(),
            description: self.description.clone().or_else(|| self.details.clone()),
            capacity: self.capacity,
        }
    }
}

/// Paginated list response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterList {
    pub shelters: Vec<Shelter>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Either a paginated list or a bare array, as the nearby endpoint returns
#[derive(Deserialize)]
#[serde(untagged)]
enum ShelterDocument {
    List(ShelterList),
    Array(Vec<Shelter>),
}

/// Parses shelters from either backend response shape
pub fn shelters_from_json(json: &str) -> Result<Vec<Shelter>> {
    let document: ShelterDocument = serde_json::from_str(json)?;
    let shelters = match document {
        ShelterDocument::List(list) => list.shelters,
        ShelterDocument::Array(shelters) => shelters,
    };

    for shelter in &shelters {
        let position: LatLng = shelter.location.into();
        if !position.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "shelter {} at {}",
                shelter.shelter_id, position
            )));
        }
    }
    Ok(shelters)
}

/// Markers in document order
pub fn markers_from_json(json: &str) -> Result<Vec<Marker>> {
    Ok(shelters_from_json(json)?.iter().map(Shelter::to_marker).collect())
}

pub fn markers_from_file(path: impl AsRef<Path>) -> Result<Vec<Marker>> {
    let json = std::fs::read_to_string(path)?;
    markers_from_json(&json)
}

/// A handful of San Diego shelters for demos and the desktop viewer
pub fn sample_markers() -> Vec<Marker> {
    vec![
        Marker::new(1, "Father Joe's Villages", LatLng::new(32.7076, -117.1514), 24)
            .with_address("1501 Imperial Ave, San Diego, CA")
            .with_services(["meals", "showers", "medical"]),
        Marker::new(2, "Alpha Project Bridge Shelter", LatLng::new(32.7063, -117.1577), 6)
            .with_address("1710 Imperial Ave, San Diego, CA")
            .with_services(["beds", "case management"]),
        Marker::new(3, "Rachel's Women's Center", LatLng::new(32.7170, -117.1608), 0)
            .with_address("759 8th Ave, San Diego, CA")
            .with_services(["day center", "laundry"]),
        Marker::new(4, "Hillcrest Youth Drop-In", LatLng::new(32.7487, -117.1633), 11)
            .with_address("3909 Centre St, San Diego, CA")
            .with_services(["youth", "meals"]),
        Marker::new(5, "Veterans Village", LatLng::new(32.7351, -117.1372), 3)
            .with_address("4141 Pacific Hwy, San Diego, CA")
            .with_services(["veterans", "beds", "counseling"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::marker::AvailabilityTier;

    const LIST: &str = r#"{
        "shelters": [
            {
                "shelter_id": 42,
                "shelter_name": "Harbor House",
                "description": null,
                "address": "1 Harbor Dr",
                "contact_phone": "619-555-0100",
                "location": {"latitude": 32.71, "longitude": -117.17},
                "opening_hours": "24/7",
                "capacity": 40,
                "available_beds": 12,
                "services": "meals, showers,,  laundry ",
                "details": "Pets allowed",
                "created_by": 7,
                "created_at": "2024-01-05T10:00:00Z"
            },
            {
                "shelter_id": 43,
                "shelter_name": "Minimal",
                "location": {"latitude": 32.72, "longitude": -117.16}
            }
        ],
        "total": 2,
        "page": 1,
        "page_size": 10
    }"#;

    #[test]
    fn test_parse_list_response() {
        let markers = markers_from_json(LIST).unwrap();
        assert_eq!(markers.len(), 2);

        let harbor = &markers[0];
        assert_eq!(harbor.id, 42);
        assert_eq!(harbor.position, LatLng::new(32.71, -117.17));
        assert_eq!(harbor.services, vec!["meals", "showers", "laundry"]);
        assert_eq!(harbor.description.as_deref(), Some("Pets allowed"));
        assert_eq!(harbor.tier(), AvailabilityTier::High);

        let minimal = &markers[1];
        assert_eq!(minimal.available_beds, 0);
        assert!(minimal.services.is_empty());
        assert_eq!(minimal.tier(), AvailabilityTier::None);
    }

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[{"shelter_id": 1, "shelter_name": "A",
                        "location": {"latitude": 1.0, "longitude": 2.0},
                        "available_beds": 5}]"#;
        let markers = markers_from_json(json).unwrap();
        assert_eq!(markers[0].tier(), AvailabilityTier::Medium);
    }

    #[test]
    fn test_rejects_invalid_location() {
        let json = r#"[{"shelter_id": 1, "shelter_name": "A",
                        "location": {"latitude": 91.0, "longitude": 2.0}}]"#;
        assert!(matches!(
            markers_from_json(json),
            Err(MapError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_sample_markers_are_valid() {
        assert!(sample_markers().iter().all(|m| m.position.is_valid()));
    }
}
