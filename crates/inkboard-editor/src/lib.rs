pub mod commands;
pub mod config;
pub mod engine;
pub mod input;
pub mod interceptor;
pub mod policy;
pub mod session;
pub mod shortcuts;
pub mod tools;
pub mod viewport;

pub use commands::{Command, History, ReplayMode};
pub use config::EditorConfig;
pub use engine::{SceneEngine, SceneObserver};
pub use interceptor::{Interceptor, PendingModification};
pub use policy::SelectionPolicy;
pub use session::EditorSession;
pub use tools::{ToolController, ToolMode};
