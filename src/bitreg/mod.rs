mod hex;
mod register;
mod vocab;

pub use hex::{format_hex, parse_hex};
pub use register::BitRegister;
pub use vocab::{Vocabulary, write_names};
