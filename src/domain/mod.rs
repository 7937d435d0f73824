mod ad;
mod article;
mod identity;
mod ledger;
mod money;
mod notification;
mod order;
mod payment;
mod widgets;

pub use ad::*;
pub use article::*;
pub use identity::*;
pub use ledger::*;
pub use money::*;
pub use notification::*;
pub use order::*;
pub use payment::*;
pub use widgets::*;
