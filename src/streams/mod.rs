pub mod arff;
pub mod generators;
pub mod stream;

pub use arff::ArffFileStream;
pub use generators::SeaGenerator;
pub use stream::Stream;
