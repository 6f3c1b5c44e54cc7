/// Dataset resolution: CSV loading and the synthetic day generator.
pub mod dataset;
pub mod resampler;
/// Time keeping and raw sample series.
pub mod series;
