// Application layer - The analytics engine and its orchestration
pub mod aggregator;
pub mod analytics_service;
pub mod cleaner;
pub mod fce_segmenter;
pub mod insights;
pub mod vehicle_repository;
