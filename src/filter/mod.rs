//! Warning filter specs, matching and the scoped filter state
//!
//! A filter spec is a colon separated string of up to five fields:
//!
//! ```text
//! action:message:category:module:lineno
//! ```
//!
//! - `action` - one of `error`, `ignore`, `always`, `default`, `module`, `once`
//!   (any unambiguous prefix works, empty means `default`)
//! - `message` - regular expression matched case-insensitively against the
//!   start of the warning text
//! - `category` - warning category name, resolved through a [`CategoryRegistry`]
//! - `module` - regular expression matched against the start of the module
//! - `lineno` - line number, `0` or empty for every line
//!
//! # Examples
//!
//! ```text
//! ignore::DeprecationWarning
//! error:.*unsafe.*:UserWarning
//! once:::legacy.io:42
//! ```
//!
//! [`CategoryRegistry`]: crate::category::CategoryRegistry

pub mod error;
pub mod matcher;
pub mod parser;
pub mod state;

pub use error::FilterSpecError;
pub use parser::{Action, FilterRule, Pattern};
pub use state::{EscalatedWarning, FilterState, WarningScope};
