//! Bidirectional mapping between workflow configs and editable form state.

mod cache;
mod editor;
mod mapper;
mod path;
mod state;
mod validate;

pub use cache::MapCache;
pub use editor::{EditError, MapEditor};
pub use mapper::{coerce_value, config_to_form, form_to_config};
pub use path::{FieldPath, PathParseError, PathSegment};
pub use state::FormState;
pub use validate::{validate_field, validate_form, FieldError};
