mod service;
mod session_service_impl;
mod token_codec_impl;

pub use service::*;
pub use session_service_impl::*;
pub use token_codec_impl::*;
