/// Read-only timeline snapshot: tracks, clips and clip sources.
pub mod model;
