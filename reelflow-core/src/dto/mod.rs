//! Data Transfer Objects for the backend's JSON APIs
//!
//! DTOs here are parsed leniently: the backend is the source of the
//! inconsistencies, so the client absorbs them in one place.

pub mod status;
