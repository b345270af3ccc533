mod csr;

pub use csr::*;
