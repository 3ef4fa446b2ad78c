//! Fixed simulated sites

use serde::Serialize;

use crate::types::Region;

/// A simulated customer site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Site {
    /// Stable site identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Region the site belongs to
    pub region: Region,
}

/// The three simulated sites, in generation order
pub const SITES: [Site; 3] = [
    Site { id: "HOSP-001", name: "Hospital", region: Region::NorthAmerica },
    Site { id: "REST-002", name: "Restaurant", region: Region::Emea },
    Site { id: "FOOD-003", name: "FoodPlant", region: Region::Apac },
];

/// Display names of the simulated sites, in generation order
pub fn site_names() -> [&'static str; 3] {
    SITES.map(|site| site.name)
}
