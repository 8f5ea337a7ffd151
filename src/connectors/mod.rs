pub mod notifier;
pub mod paper;
pub mod traits;
