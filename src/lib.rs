pub mod context;
pub mod controller;
pub mod editor;
pub mod prompt;
pub mod timeline;

pub use chronicle_common as common;
pub use controller::{AppContext, DeleteOutcome, EditorState, LoadSource, SaveError, StateController};
pub use editor::{RecordEditor, ValidationError};
