pub mod loader;
pub mod plot;
pub mod record;
