pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod portal;

pub use auth::HttpAuthApi;
pub use client::HttpClient;
pub use error::{PortalHttpError, PortalHttpErrorKind};
pub use models::{
    Doctor, GovernmentSchemes, InsurancePlan, InsuranceRecommendations, Medicine,
    MedicineDetails, PrescriptionAnalysis,
};
pub use portal::PortalClient;
