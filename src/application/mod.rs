mod business;
mod cache;
mod content;
mod error;
mod ledger;
mod service;

pub use business::*;
pub use cache::*;
pub use content::*;
pub use error::*;
pub use ledger::*;
pub use service::*;
