use std::time::Duration;

use anyhow::Context;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Tiempo máximo de espera por una conexión del pool.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

pub fn create_conn(database_url: &str) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .connection_timeout(CONNECTION_TIMEOUT)
        .build(manager)
        .context("no se pudo crear el pool de conexiones")
}
