pub mod site_service;

pub use site_service::{prepare_submission, SiteBundle, SiteService};
