pub mod shelters;

pub use shelters::{markers_from_file, markers_from_json, sample_markers, Shelter, ShelterList};
