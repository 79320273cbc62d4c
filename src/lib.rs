pub mod config;
pub mod context;
pub mod error;
pub mod features;
pub mod indicator;
pub mod inference;
pub mod model;
pub mod monitoring;
pub mod normalization;
pub mod projection;
pub mod provider;
pub mod service;
pub mod shadow;
