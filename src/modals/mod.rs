pub mod arbiter;
pub mod request;

pub use arbiter::{ActiveDialog, DialogHandle, ModalArbiter};
pub use request::{DialogKind, DialogRequest, DialogValue, InfoLine, TextPrompt};
