pub mod catalog;
pub mod intent_classifier;
pub mod matcher;
pub mod patterns;
pub mod pipeline;
pub mod showtime_parser;
pub mod showtime_tokens;
pub mod text_service;
pub mod title_extractor;

// Re-export public types
pub use catalog::CatalogClient;
pub use intent_classifier::IntentClassifier;
pub use pipeline::MoviePipeline;
pub use text_service::{Location, NormalizedResponse, TextServiceClient};
pub use title_extractor::TitleExtractor;
