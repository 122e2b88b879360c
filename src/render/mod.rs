//! Render dispatch
//!
//! Maps field types to input controls and builds the editable form and the
//! read-only preview from the same engine evaluation.

mod control;
mod form;
mod session;

pub use control::{describe_control, ControlConstraints, ControlDescriptor, WidgetKind};
pub use form::{
    render_active_form, render_form, RenderMode, RenderedControl, RenderedForm, RenderedSection,
};
pub use session::{Form, FormSession};
