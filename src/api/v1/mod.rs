mod error;
mod handler;
mod router;

pub use error::recover_error;
pub use router::{routes, with_authentication, with_principal};
