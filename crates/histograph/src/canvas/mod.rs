//! Interactive canvas support
//!
//! The in-memory graph model, the layered layout engine, the adapter between
//! model and canvas shapes, and the controller keeping the two in sync.

pub mod adapter;
pub mod debounce;
pub mod layout;
pub mod model;
pub mod ordering;
pub mod sync;
pub mod validator;

pub use adapter::{CanvasEdge, CanvasNode};
pub use debounce::FitDebouncer;
pub use layout::{assign_ranks, LayeredLayout, LayoutConfig};
pub use model::{check_document, GraphModel};
pub use sync::{CanvasEvent, CanvasSurface, EdgeChange, NodeChange, SyncController};
pub use validator::{is_valid_connection, ConnectionValidator, NoSelfLoops};
