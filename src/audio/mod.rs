pub mod analysis;
pub mod decode;
pub mod features;
pub mod normalize;
pub mod pitch;
pub mod stft;
pub mod weighting;
