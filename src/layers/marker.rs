use crate::core::constants::HIGH_AVAILABILITY_BEDS;
use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

pub type MarkerId = i64;

/// Bed availability bucket deciding a pin's color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvailabilityTier {
    /// More than 10 free beds
    High,
    /// 1 to 10
    Medium,
    None,
}

impl AvailabilityTier {
    pub fn from_beds(available_beds: u32) -> Self {
        if available_beds > HIGH_AVAILABILITY_BEDS {
            AvailabilityTier::High
        } else if available_beds > 0 {
            AvailabilityTier::Medium
        } else {
            AvailabilityTier::None
        }
    }
}

/// Read-only point of interest drawn as a pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub position: LatLng,
    pub available_beds: u32,
    pub name: String,
    pub address: Option<String>,
    pub hours: Option<String>,
    pub phone: Option<String>,
    pub services: Vec<String>,
    pub description: Option<String>,
    pub capacity: Option<u32>,
}

impl Marker {
    pub fn new(id: MarkerId, name: impl Into<String>, position: LatLng, available_beds: u32) -> Self {
        Self {
            id,
            position,
            available_beds,
            name: name.into(),
            address: None,
            hours: None,
            phone: None,
            services: Vec::new(),
            description: None,
            capacity: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services = services.into_iter().map(Into::into).collect();
        self
    }

    pub fn tier(&self) -> AvailabilityTier {
        AvailabilityTier::from_beds(self.available_beds)
    }
}

/// Markers within `radius_m` meters of `center`, nearest first
pub fn markers_nearby<'a>(markers: &'a [Marker], center: LatLng, radius_m: f64) -> Vec<&'a Marker> {
    let mut nearby: Vec<(f64, &Marker)> = markers
        .iter()
        .map(|m| (center.distance_to(&m.position), m))
        .filter(|(d, _)| *d <= radius_m)
        .collect();
    nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
    nearby.into_iter().map(|(_, m)| m).collect()
}

/// Markers with at least `min_beds` free beds, most beds first.
///
/// The sort is stable so ties keep list order.
pub fn markers_with_availability(markers: &[Marker], min_beds: u32) -> Vec<&Marker> {
    let mut available: Vec<&Marker> = markers
        .iter()
        .filter(|m| m.available_beds >= min_beds)
        .collect();
    available.sort_by(|a, b| b.available_beds.cmp(&a.available_beds));
    available
}
