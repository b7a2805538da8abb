//! Live preview engine for appcanvas.
//!
//! This crate turns a read-only app definition into an interactive device
//! simulation:
//!
//! - [`AppDefinition`]: screens, components and their event bindings
//! - [`Device`]: the built-in phone and tablet catalog
//! - [`PreviewSession`]: current screen, back/forward history, viewport and
//!   the interaction log
//! - [`dispatch`]: runs a component's bound actions for a UI event
//! - [`InteractionExport`]: the downloadable trace, and [`replay`] to run it
//!   again

pub mod app;
pub mod clock;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod session;

pub use app::{Action, AppDefinition, BoundEvent, Component, ComponentId, Point, Screen, ScreenId, Size};
pub use clock::{Clock, ManualClock, SystemClock};
pub use device::{Device, DeviceType, Orientation};
pub use dispatch::{DispatchReport, PreviewAction, PreviewActionKind, Presenter, UiEvent, dispatch};
pub use error::{ActionError, PreviewError};
pub use export::{InteractionExport, replay};
pub use session::{InteractionEvent, PreviewSession};
