//! route-stops
//!
//! Decodes route geometry and plans refuelling/recharging stops along it,
//! composing the final route leg by leg through the chosen stations.

pub mod error;
pub mod model;
pub mod traits;
pub mod polyline;
pub mod haversine;
pub mod waypoints;
pub mod stations;
pub mod composer;
pub mod planner;
pub mod here;
