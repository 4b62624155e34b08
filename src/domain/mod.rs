// Domain layer - Plain data produced and consumed by the analytics engine
pub mod daily;
pub mod error;
pub mod fce;
pub mod insight;
pub mod manufacturer;
pub mod report;
pub mod sample;
