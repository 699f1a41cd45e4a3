pub mod clock;
pub mod collection;
pub mod session;
pub mod store;
pub mod validator;

pub use clock::{Clock, IdGenerator, SystemClock, UuidIds};
pub use collection::EntryCollection;
pub use session::DashboardSession;
pub use store::EntryStore;
pub use validator::{
    EntryValidator, ErrorKind, ValidationError, ValidationPolicy, ValidationReport,
};
