//! Shipment planning for boxed retail products.
//!
//! Picks transport boxes that can physically hold an order, places every unit
//! in 3D with stability checks and ranks carrier services for the result.

pub mod api;
pub mod blf;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod model;
pub mod packing;
pub mod planner;
pub mod ranker;
pub mod request;
pub mod stability;
pub mod summary;
pub mod types;
