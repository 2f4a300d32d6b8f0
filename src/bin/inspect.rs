//! Ad-hoc inspection of live table and column metadata, for manual debugging:
//! reflects the connected database, prints each table with its row count and
//! column details, then prints the DDL the registry would generate.

use autocrud::migration::{comment_sql, create_table_sql, index_sql};
use autocrud::{connect, reflect, registry, DbConfig, SessionScope};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("autocrud=info".parse()?))
        .init();

    let config = DbConfig::default();
    let pool = connect(&config).await?;
    let metadata = reflect(&pool).await?;

    for table in &metadata.tables {
        let mut scope = SessionScope::begin(&pool).await?;
        let count: Result<(i64,), _> =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM \"{}\"", table.name))
                .fetch_one(scope.conn())
                .await;
        let count = match count {
            Ok((n,)) => {
                scope.commit().await?;
                n
            }
            Err(err) => {
                scope.rollback().await;
                return Err(err.into());
            }
        };

        println!("########## {} ({} rows)", table.name, count);
        for c in &table.columns {
            println!(
                "--------- {} {} nullable={} pk={} default={:?} comment={:?}",
                c.name, c.data_type, c.nullable, c.primary_key, c.server_default, c.comment
            );
        }
    }

    println!();
    println!("-- DDL generated from the declared registry --");
    for table in registry() {
        println!("{};", create_table_sql(&table));
        for sql in comment_sql(&table).iter().chain(index_sql(&table).iter()) {
            println!("{};", sql);
        }
    }
    Ok(())
}
