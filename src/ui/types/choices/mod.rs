mod stream_choice;

pub use stream_choice::{ArffParameters, SeaParameters, StreamChoice, StreamKind};
