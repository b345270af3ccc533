mod certificate;
pub use certificate::*;

mod role;
pub use role::*;

mod serial;
pub use serial::*;
