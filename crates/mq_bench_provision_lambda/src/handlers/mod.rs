pub mod preflight;
pub mod provision;
