pub mod beat;
pub mod easing;
pub mod grid;
pub mod recency;
pub mod timebase;
pub mod trail;
pub mod walk;
