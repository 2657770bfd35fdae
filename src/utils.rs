//! Utility helpers shared by the `OpenCV` adapters.

pub mod safe_cast;
