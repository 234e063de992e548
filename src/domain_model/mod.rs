mod credential;
mod revocation;
mod session;

pub use credential::*;
pub use revocation::*;
pub use session::*;
