mod context;
mod handlers;
mod responses;

pub use context::AppContext;
pub use handlers::*;
pub use responses::*;
