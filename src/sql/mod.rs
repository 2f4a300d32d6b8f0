pub mod builder;
pub mod params;

pub use builder::{
    insert, select_by_id, select_list, soft_delete, soft_delete_all, update, QueryBuf,
};
pub use params::PgBindValue;
