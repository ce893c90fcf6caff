//! Request and Response models for the weather cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{AddFavoriteRequest, CitySearchQuery, ConvertQuery, CoordinatesQuery};
pub use responses::{
    ConvertResponse, CoordinatesResponse, FavoriteResponse, HealthResponse, MessageResponse,
    PurgeResponse, StatsResponse, ToolToggleResponse,
};
