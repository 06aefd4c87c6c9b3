//! Step actions, grouped by the service they drive.

pub mod assertions;
pub mod gpd;
pub mod health;
pub mod reporting;
