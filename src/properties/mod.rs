//! Structure-preserving java-properties support.

mod scanner;

pub use scanner::scan;
