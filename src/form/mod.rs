//! The form engine: payload serialization, the drawer state machine,
//! and draft persistence with debounced autosave

pub mod draft;
pub mod drawer;
pub mod payload;

pub use draft::{
    AUTOSAVE_DEBOUNCE, DraftAutosaver, DraftKey, DraftStore, FsDraftStore, InMemoryDraftStore,
};
pub use drawer::{DrawerForm, SubmitIntent};
pub use payload::{FormMethod, FormPayload, METHOD_FIELD, PayloadPart};
