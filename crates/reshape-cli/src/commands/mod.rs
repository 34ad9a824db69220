//! Command implementations.

pub mod check;
pub mod init;
pub mod synthesize;

pub use self::check::execute_check;
pub use self::init::execute_init;
pub use self::synthesize::execute_synthesize;
