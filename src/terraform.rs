mod state;

pub use state::{ResourceTags, StateError, TerraformState};
