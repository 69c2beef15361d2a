use clap::Args;
use postgres::{Client, NoTls};

use schemapart_core::{Record, RowStore, StoreError};

/// Connection parameters. Each flag falls back to the libpq environment variable.
#[derive(Args, Clone, Debug)]
pub struct DbArgs {
    #[arg(long, env = "PGHOST", default_value = "localhost")]
    pub host: String,
    #[arg(long, env = "PGPORT", default_value_t = 5432)]
    pub port: u16,
    #[arg(long, env = "PGUSER", default_value = "postgres")]
    pub user: String,
    #[arg(long, env = "PGPASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,
    #[arg(long, env = "PGDATABASE", default_value = "postgres")]
    pub dbname: String,
}

/// `schemapart`-shaped table in PostgreSQL.
pub struct PgStore {
    client: Client,
    select: String,
    update: String,
}

/// Accept `name` or `schema.name`, each part a plain SQL identifier.
pub fn validate_table(table: &str) -> Result<(), StoreError> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|p| valid_part(p)) {
        return Err(StoreError::new("config", format!("invalid table name '{table}'")));
    }
    Ok(())
}

impl PgStore {
    pub fn connect(args: &DbArgs, table: &str) -> Result<Self, StoreError> {
        validate_table(table)?;
        tracing::info!(
            host = %args.host,
            port = args.port,
            user = %args.user,
            dbname = %args.dbname,
            "connecting"
        );

        let mut config = postgres::Config::new();
        config
            .host(&args.host)
            .port(args.port)
            .user(&args.user)
            .dbname(&args.dbname);
        if !args.password.is_empty() {
            config.password(&args.password);
        }
        let client = config
            .connect(NoTls)
            .map_err(|e| StoreError::new("connect", e))?;

        Ok(Self {
            client,
            select: format!("select id::int8, data, metadata from {table} order by id"),
            update: format!("update {table} set data = $2, metadata = $3 where id = $1::int8"),
        })
    }
}

impl RowStore for PgStore {
    fn load_all(&mut self) -> Result<Vec<Record>, StoreError> {
        let rows = self
            .client
            .query(self.select.as_str(), &[])
            .map_err(|e| StoreError::new("select", e))?;
        rows.iter()
            .map(|row| {
                Ok(Record {
                    id: row.try_get(0).map_err(|e| StoreError::new("select id", e))?,
                    content: row.try_get(1).map_err(|e| StoreError::new("select data", e))?,
                    metadata: row
                        .try_get(2)
                        .map_err(|e| StoreError::new("select metadata", e))?,
                })
            })
            .collect()
    }

    fn update(&mut self, id: i64, content: &[u8], metadata: &[u8]) -> Result<(), StoreError> {
        let updated = self
            .client
            .execute(self.update.as_str(), &[&id, &content, &metadata])
            .map_err(|e| StoreError::new("update", e))?;
        if updated != 1 {
            return Err(StoreError::new(
                "update",
                format!("record {id}: {updated} rows affected"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validate_table;

    #[test]
    fn test_table_names() {
        assert!(validate_table("schemapart").is_ok());
        assert!(validate_table("public.schemapart").is_ok());
        assert!(validate_table("_parts2").is_ok());
        assert!(validate_table("").is_err());
        assert!(validate_table("2parts").is_err());
        assert!(validate_table("a.b.c").is_err());
        assert!(validate_table("schemapart; drop table x").is_err());
    }
}
