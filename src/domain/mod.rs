mod classify;
mod diff;
mod format;
mod highlight;
mod timeline;
mod transcript;
mod types;

pub use classify::*;
pub use diff::*;
pub use format::*;
pub use highlight::*;
pub use timeline::*;
pub use transcript::*;
pub use types::*;
