pub mod entry;

pub use entry::{format_local_millis, EfficiencyBand, Entry};
