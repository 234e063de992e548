mod clock_impl;
mod credential_store_impl;
mod revocation_registry_impl;
mod secret_source_impl;
mod session_store_impl;

pub mod util;

pub use clock_impl::*;
pub use credential_store_impl::*;
pub use revocation_registry_impl::*;
pub use secret_source_impl::*;
pub use session_store_impl::*;
