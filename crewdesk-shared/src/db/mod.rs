/// Database layer for Crewdesk
///
/// This module provides database connection pooling. Models live in the
/// `models` module at crate root level; the relational schema itself is
/// managed outside this repository, and each model documents the table
/// shape it expects in its `# Schema` block.
///
/// # Example
///
/// ```no_run
/// use crewdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod pool;
