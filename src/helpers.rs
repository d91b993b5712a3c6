pub mod errors;
pub mod filters;
pub mod validation;
