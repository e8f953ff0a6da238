pub mod direct;
pub mod grayscale;
pub mod interleave;

pub use direct::DirectRgbStrategy;
pub use grayscale::GrayscaleStrategy;
pub use interleave::InterleaveJpegStrategy;
