pub mod dictionary;
pub mod matrix;
pub mod model;
pub mod tables;

pub use dictionary::load_dictionary;
pub use matrix::load_dfm;
pub use model::{read_model, write_model};
pub use tables::{write_terms, write_theta, write_topics};
