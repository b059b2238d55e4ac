pub mod analysis;
pub mod normalize;
