mod rotation_service_impl;

pub use rotation_service_impl::*;
