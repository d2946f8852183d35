mod server;
pub use server::*;

mod sweeper;
pub use sweeper::*;
