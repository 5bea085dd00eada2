// Resume wizard: raw field collection, step gating, normalization into the
// canonical model, and submission to the generation service.

pub mod fields;
pub mod handlers;
pub mod machine;
pub mod normalizer;
pub mod sessions;
pub mod validation;
