//! Declarative table registry with auto-generated CRUD endpoints.

pub mod db;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod reflect;
pub mod routes;
pub mod schema;
pub mod scope;
pub mod service;
pub mod sql;
pub mod state;

pub use db::{connect, DbConfig};
pub use error::{AppError, SchemaError};
pub use migration::{apply_migrations, create_table_sql};
pub use model::{derive_all, derive_model, ApiModel, PAGE_SIZE};
pub use reflect::{reflect, DbMetadata};
pub use routes::{common_routes, crud_router, register_all};
pub use schema::registry;
pub use scope::SessionScope;
pub use service::{CrudService, RequestValidator};
pub use state::AppState;
