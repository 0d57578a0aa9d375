pub mod envelope;
pub mod filter;
pub mod generator;
pub mod melody;
pub mod mixer;
pub mod note;
pub mod output;
pub mod score;
pub mod song;
pub mod tuning;
pub mod wave;

// Command line front-end
pub mod play;
