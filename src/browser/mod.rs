pub mod cdp;
pub mod session;

pub use cdp::CdpSession;
pub use session::{Element, PageSession, SelectBy, Selector};
