use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::catalog::{CatalogStats, FirmwareRecord, NewFirmware, RequestRecord, RequestStatus};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for catalog database operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    ///
    /// This is intentionally explicit so callers can surface a clear message
    /// instead of silently clobbering or misinterpreting data.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// SQLite-backed firmware catalog.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible
/// for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Providing small, testable helpers for lookups and bookkeeping.
#[derive(Debug)]
pub struct CatalogDb {
    conn: Connection,
}

impl CatalogDb {
    /// Open (or create) a catalog database at the given path and ensure the
    /// schema exists.
    pub fn open(path: &Path) -> CatalogResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory catalog, mainly for tests and dry runs.
    pub fn open_in_memory() -> CatalogResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert a firmware record and return its row id.
    pub fn insert_firmware(&self, record: &NewFirmware) -> CatalogResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO firmwares (brand, series, ecu_brand, software_id, hardware_id, file_size, price)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.brand,
                record.series,
                record.ecu_brand,
                record.software_id,
                record.hardware_id,
                record.file_size,
                record.price
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List all firmware records (ordered by id).
    pub fn list_firmwares(&self) -> CatalogResult<Vec<FirmwareRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, brand, series, ecu_brand, software_id, hardware_id, file_size, price
            FROM firmwares
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], map_firmware)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Load one firmware record by id.
    pub fn get_firmware(&self, id: i64) -> CatalogResult<Option<FirmwareRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, brand, series, ecu_brand, software_id, hardware_id, file_size, price
            FROM firmwares
            WHERE id = ?1
            "#,
        )?;
        Ok(stmt.query_row(params![id], map_firmware).optional()?)
    }

    /// Case-insensitive substring lookup on `software_id`.
    ///
    /// Returns the first hit in id order, or `None`. This is the catalog
    /// capability the resolver is built on; candidate normalization
    /// (dash/underscore stripping) is the resolver's job, not the store's.
    pub fn find_by_software_id(&self, query: &str) -> CatalogResult<Option<FirmwareRecord>> {
        if query.is_empty() {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, brand, series, ecu_brand, software_id, hardware_id, file_size, price
            FROM firmwares
            WHERE software_id IS NOT NULL
              AND instr(LOWER(software_id), LOWER(?1)) > 0
            ORDER BY id
            LIMIT 1
            "#,
        )?;
        Ok(stmt.query_row(params![query], map_firmware).optional()?)
    }

    /// True if a record with exactly this `software_id` already exists
    /// (case-insensitive). Used by bulk import to skip duplicates.
    pub fn has_software_id(&self, software_id: &str) -> CatalogResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM firmwares WHERE LOWER(software_id) = LOWER(?1)",
            params![software_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Aggregate catalog statistics.
    pub fn stats(&self) -> CatalogResult<CatalogStats> {
        let total_firmwares: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM firmwares", [], |row| row.get(0))?;
        let total_brands: i64 = self
            .conn
            .query_row("SELECT COUNT(DISTINCT brand) FROM firmwares", [], |row| row.get(0))?;
        let total_ecu_types: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT ecu_brand) FROM firmwares WHERE ecu_brand IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(CatalogStats { total_firmwares, total_brands, total_ecu_types })
    }

    /// Record one identification attempt and return its row id.
    pub fn insert_request(&self, record: &RequestRecord) -> CatalogResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO requests (filename, file_hash, firmware_id, matched_candidate, confidence, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.filename,
                record.file_hash,
                record.firmware_id,
                record.matched_candidate,
                record.confidence,
                record.status.as_str(),
                record.created_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List recorded identification requests (ordered by id).
    pub fn list_requests(&self) -> CatalogResult<Vec<RequestRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT filename, file_hash, firmware_id, matched_candidate, confidence, status, created_at
            FROM requests
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(5)?;
            Ok(RequestRecord {
                filename: row.get(0)?,
                file_hash: row.get(1)?,
                firmware_id: row.get(2)?,
                matched_candidate: row.get(3)?,
                confidence: row.get(4)?,
                status: RequestStatus::from_str_lossy(&status),
                created_at: row.get(6)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn map_firmware(row: &rusqlite::Row<'_>) -> rusqlite::Result<FirmwareRecord> {
    Ok(FirmwareRecord {
        id: row.get(0)?,
        brand: row.get(1)?,
        series: row.get(2)?,
        ecu_brand: row.get(3)?,
        software_id: row.get(4)?,
        hardware_id: row.get(5)?,
        file_size: row.get(6)?,
        price: row.get(7)?,
    })
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (firmwares)
/// - 2: add requests table
fn apply_migrations(conn: &Connection) -> CatalogResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(CatalogError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        // Initial schema.
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS firmwares (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                brand       TEXT NOT NULL,
                series      TEXT,
                ecu_brand   TEXT,
                software_id TEXT,
                hardware_id TEXT,
                file_size   INTEGER,
                price       REAL
            );
            CREATE INDEX IF NOT EXISTS idx_firmwares_software_id ON firmwares(software_id);

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS requests (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                filename          TEXT,
                file_hash         TEXT,
                firmware_id       INTEGER,
                matched_candidate TEXT,
                confidence        REAL,
                status            TEXT NOT NULL,
                created_at        TEXT NOT NULL
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> CatalogResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
