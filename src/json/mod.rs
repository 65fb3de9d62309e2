//! Structure-preserving JSON support.

mod scanner;

pub use scanner::scan;
