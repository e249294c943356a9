pub mod chunking;
pub mod math_format;
