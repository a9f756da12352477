pub mod batch;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod enrichment;
pub mod errors;
pub mod races;
pub mod recommend;
pub mod terrain;

pub use batch::{
    enrich_race, recommend_race, run_batch, BatchItem, BatchSummary, EnrichOptions, EnrichOutcome,
    RaceRecommendation,
};
pub use catalog::{CatalogLoadReport, SkippedEntry, TireCatalog};
pub use domain::race::{RaceDocument, RaceProfile, SurfaceCategory, WeatherRecord};
pub use domain::tire::{TireId, TireRecord, TreadType};
pub use enrichment::{TireRecommendations, ENRICHMENT_FIELD};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use races::RaceStore;
pub use recommend::{DeterministicRecommender, RecommendationBundle, Recommender};
pub use terrain::build_race_profile;
