use once_cell::sync::OnceCell;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Open the SQLite database and bootstrap the schema.
///
/// The pool is capped at a single connection so SQLite write transactions
/// serialize instead of failing with SQLITE_BUSY under concurrent checkouts.
pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/app.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    let mut options = ConnectOptions::new(db_url);
    options.max_connections(1);
    let conn = Database::connect(options).await?;

    // Needed for the ON DELETE SET NULL references below
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;".to_string(),
    ))
    .await?;

    create_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// Create a table unless it already exists (checked via sqlite_master)
async fn ensure_table(
    conn: &DatabaseConnection,
    table_name: &str,
    create_sql: &str,
) -> anyhow::Result<()> {
    let check = format!(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='{}';",
        table_name
    );
    let existing = conn
        .query_all(Statement::from_string(DatabaseBackend::Sqlite, check))
        .await?;

    if existing.is_empty() {
        tracing::info!("Creating {} table", table_name);
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_sql.to_string(),
        ))
        .await?;
    }
    Ok(())
}

async fn create_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    ensure_table(
        conn,
        "sys_users",
        r#"
        CREATE TABLE sys_users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            email TEXT,
            password_hash TEXT NOT NULL,
            full_name TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_login_at TEXT,
            created_by TEXT
        );
    "#,
    )
    .await?;

    ensure_table(
        conn,
        "sys_refresh_tokens",
        r#"
        CREATE TABLE sys_refresh_tokens (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            token_hash TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            revoked_at TEXT
        );
    "#,
    )
    .await?;

    ensure_table(
        conn,
        "sys_settings",
        r#"
        CREATE TABLE sys_settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            description TEXT,
            created_at TEXT,
            updated_at TEXT
        );
    "#,
    )
    .await?;

    ensure_table(
        conn,
        "a001_category",
        r#"
        CREATE TABLE a001_category (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    )
    .await?;

    ensure_table(
        conn,
        "a002_event",
        r#"
        CREATE TABLE a002_event (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            date_time TEXT NOT NULL,
            ticket_price REAL NOT NULL DEFAULT 0,
            available_tickets INTEGER NOT NULL DEFAULT 0 CHECK (available_tickets >= 0),
            category_id TEXT REFERENCES a001_category(id) ON DELETE SET NULL,
            organizer_id TEXT REFERENCES sys_users(id) ON DELETE SET NULL,
            image_url TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#,
    )
    .await?;

    ensure_table(
        conn,
        "a003_purchase",
        r#"
        CREATE TABLE a003_purchase (
            id TEXT PRIMARY KEY NOT NULL,
            guest_name TEXT NOT NULL,
            guest_email TEXT NOT NULL,
            purchase_date TEXT NOT NULL,
            total_cost REAL NOT NULL,
            user_id TEXT REFERENCES sys_users(id) ON DELETE SET NULL,
            rating INTEGER,
            created_at TEXT,
            updated_at TEXT
        );
    "#,
    )
    .await?;

    ensure_table(
        conn,
        "a003_purchase_line",
        r#"
        CREATE TABLE a003_purchase_line (
            id TEXT PRIMARY KEY NOT NULL,
            purchase_id TEXT NOT NULL REFERENCES a003_purchase(id),
            event_id TEXT NOT NULL REFERENCES a002_event(id),
            quantity INTEGER NOT NULL CHECK (quantity >= 1),
            total_price REAL NOT NULL,
            UNIQUE (purchase_id, event_id)
        );
    "#,
    )
    .await?;

    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "CREATE INDEX IF NOT EXISTS idx_a003_line_purchase ON a003_purchase_line(purchase_id);"
            .to_string(),
    ))
    .await?;
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "CREATE INDEX IF NOT EXISTS idx_a003_purchase_user ON a003_purchase(user_id);".to_string(),
    ))
    .await?;

    Ok(())
}

/// Initialize the shared test database exactly once per test process
#[cfg(test)]
pub async fn init_test_database() {
    static INIT: tokio::sync::OnceCell<()> = tokio::sync::OnceCell::const_new();
    INIT.get_or_init(|| async {
        let path = std::env::temp_dir().join(format!("ticketing-test-{}.db", uuid::Uuid::new_v4()));
        initialize_database(Some(path.to_str().expect("temp path is valid utf-8")))
            .await
            .expect("test database init");
    })
    .await;
}

/// Create a user row for tests that reference one through a foreign key.
/// Returns the generated user id.
#[cfg(test)]
pub async fn seed_test_user(role: contracts::system::auth::Role) -> String {
    use contracts::system::users::CreateUserDto;

    crate::system::users::service::create(
        CreateUserDto {
            username: format!("user-{}", uuid::Uuid::new_v4()),
            password: "test-password".to_string(),
            email: None,
            full_name: None,
            role,
        },
        None,
    )
    .await
    .expect("seed user")
}
