pub mod crud;

pub use crud::RouterState;
