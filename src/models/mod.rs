pub mod analytics;
pub mod extraction;
pub mod product;
