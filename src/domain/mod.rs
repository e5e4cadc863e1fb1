// Domain layer - Settings, quality policy and command construction

pub mod errors;
pub mod model;
pub mod rules;
