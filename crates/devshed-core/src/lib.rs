pub mod api;
pub mod config;
pub mod flow;
pub mod ids;
pub mod init;
pub mod models;
pub mod shape;

// Re-export the collaborator surface at the crate root for convenience.
pub use api::{
    ApiClient, ApiResponse, ProjectCreateRequest, ProjectUpdateRequest, TaskCreateRequest,
    TaskUpdateRequest,
};
pub use config::{
    Config, ConfigError, ConfigPatch, ConfigStore, ContextPersistence, Preferences, TaskView,
};
pub use flow::{SubmitGate, SubmitPermit};
pub use ids::{entity_key, normalize_id};
pub use init::{InitError, SetupForm};
pub use models::{Project, Task, TaskStatus};
pub use shape::{extract_collection, extract_entity, ShapeError, PROJECT_KEYS, TASK_KEYS};
