use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            is_student INTEGER NOT NULL DEFAULT 0,
            email_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS interests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category TEXT
        );

        CREATE TABLE IF NOT EXISTS user_interests (
            user_id INTEGER NOT NULL REFERENCES users(id),
            interest_id INTEGER NOT NULL REFERENCES interests(id),
            PRIMARY KEY (user_id, interest_id)
        );

        CREATE TABLE IF NOT EXISTS opportunities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'aguardando',
            deadline TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS opportunity_interests (
            opportunity_id INTEGER NOT NULL REFERENCES opportunities(id),
            interest_id INTEGER NOT NULL REFERENCES interests(id),
            PRIMARY KEY (opportunity_id, interest_id)
        );

        CREATE TABLE IF NOT EXISTS applications (
            user_id INTEGER NOT NULL REFERENCES users(id),
            opportunity_id INTEGER NOT NULL REFERENCES opportunities(id),
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, opportunity_id)
        );

        CREATE TABLE IF NOT EXISTS recommendations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            opportunity_id INTEGER NOT NULL,
            strategy TEXT NOT NULL,
            score REAL NOT NULL CHECK (score >= 0.0 AND score <= 1.0),
            explanation TEXT NOT NULL DEFAULT '',
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_rec_one_active
            ON recommendations(user_id, opportunity_id, strategy) WHERE active = 1;
        CREATE INDEX IF NOT EXISTS idx_rec_user ON recommendations(user_id);
        CREATE INDEX IF NOT EXISTS idx_rec_opportunity ON recommendations(opportunity_id);
        CREATE INDEX IF NOT EXISTS idx_rec_updated ON recommendations(updated_at);
        CREATE INDEX IF NOT EXISTS idx_opportunities_status ON opportunities(status);
        CREATE INDEX IF NOT EXISTS idx_applications_opportunity ON applications(opportunity_id);
        ",
    )
    .map_err(|e| format!("Migration failed: {e}"))
}
