pub mod annotation;
pub mod blacklist;
pub mod confirm;
pub mod error;
pub mod io;
pub mod layout;
pub mod model;
pub mod norm;
pub mod sync;

pub use error::{Result, RosterError};
