//! In-memory store doubles shared by the pipeline integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashSet};

use migrator_repository::{
    InsertOutcome, SourceStore, SourceStoreError, TargetStore, TargetStoreError,
};
use migrator_shared::types::{CanonicalValue, RawValue, SourceRow, TextRow, TypedValue};

fn target_error(message: String) -> TargetStoreError {
    TargetStoreError::DatabaseError(sqlx::Error::Protocol(message))
}

fn source_error(message: String) -> SourceStoreError {
    SourceStoreError::DatabaseError(sqlx::Error::Protocol(message))
}

// Mock source store backed by row vectors
#[derive(Default)]
pub struct MemorySource {
    pub tables: BTreeMap<String, Vec<SourceRow>>,
    pub failing_tables: HashSet<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, table: &str, rows: Vec<Vec<(&str, RawValue)>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                SourceRow::new(
                    row.into_iter()
                        .map(|(column, value)| (column.to_string(), value))
                        .collect(),
                )
            })
            .collect();
        self.tables.insert(table.to_string(), rows);
        self
    }

    pub fn failing_on(mut self, table: &str) -> Self {
        self.failing_tables.insert(table.to_string());
        self
    }

    fn rows(&self, table: &str) -> Result<&Vec<SourceRow>, SourceStoreError> {
        if self.failing_tables.contains(table) {
            return Err(source_error(format!("disk I/O error reading {table}")));
        }
        self.tables
            .get(table)
            .ok_or_else(|| source_error(format!("no such table: {table}")))
    }
}

#[async_trait::async_trait]
impl SourceStore for MemorySource {
    async fn list_tables(&self) -> Result<BTreeSet<String>, SourceStoreError> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn fetch_all(&self, table: &str) -> Result<Vec<SourceRow>, SourceStoreError> {
        Ok(self.rows(table)?.clone())
    }

    async fn count(&self, table: &str) -> Result<i64, SourceStoreError> {
        Ok(self.rows(table)?.len() as i64)
    }

    async fn first_row(&self, table: &str) -> Result<Option<SourceRow>, SourceStoreError> {
        Ok(self.rows(table)?.first().cloned())
    }
}

pub struct ForeignKey {
    pub column: String,
    pub parent: String,
    pub parent_column: String,
}

pub struct MemoryTable {
    pub key: String,
    pub rows: Vec<TextRow>,
    pub foreign_keys: Vec<ForeignKey>,
}

// Mock target store that stores values in their textual form, enforces a
// primary key and, while integrity is enabled, foreign keys.
pub struct MemoryTarget {
    pub tables: BTreeMap<String, MemoryTable>,
    pub can_disable_integrity: bool,
    pub integrity_enabled: bool,
    pub enforcement_calls: Vec<bool>,
    pub truncated: Vec<String>,
    pub insert_log: Vec<String>,
    pub failing_truncates: HashSet<String>,
    pub sequences: Vec<String>,
    pub fail_sequence_reset: bool,
}

impl MemoryTarget {
    pub fn new(can_disable_integrity: bool) -> Self {
        Self {
            tables: BTreeMap::new(),
            can_disable_integrity,
            integrity_enabled: true,
            enforcement_calls: Vec::new(),
            truncated: Vec::new(),
            insert_log: Vec::new(),
            failing_truncates: HashSet::new(),
            sequences: Vec::new(),
            fail_sequence_reset: false,
        }
    }

    pub fn with_table(mut self, name: &str, key: &str) -> Self {
        self.tables.insert(
            name.to_string(),
            MemoryTable {
                key: key.to_string(),
                rows: Vec::new(),
                foreign_keys: Vec::new(),
            },
        );
        self
    }

    pub fn with_foreign_key(mut self, table: &str, column: &str, parent: &str, parent_column: &str) -> Self {
        if let Some(t) = self.tables.get_mut(table) {
            t.foreign_keys.push(ForeignKey {
                column: column.to_string(),
                parent: parent.to_string(),
                parent_column: parent_column.to_string(),
            });
        }
        self
    }

    pub fn with_row(mut self, table: &str, values: &[(&str, Option<&str>)]) -> Self {
        if let Some(t) = self.tables.get_mut(table) {
            t.rows.push(
                values
                    .iter()
                    .map(|(c, v)| (c.to_string(), v.map(str::to_string)))
                    .collect(),
            );
        }
        self
    }

    pub fn rows(&self, table: &str) -> &[TextRow] {
        self.tables.get(table).map(|t| t.rows.as_slice()).unwrap_or(&[])
    }

    fn table(&self, name: &str) -> Result<&MemoryTable, TargetStoreError> {
        self.tables
            .get(name)
            .ok_or_else(|| target_error(format!("relation \"{name}\" does not exist")))
    }

    fn parent_has(&self, fk: &ForeignKey, value: &str) -> bool {
        self.tables.get(&fk.parent).is_some_and(|parent| {
            parent
                .rows
                .iter()
                .any(|r| r.get(&fk.parent_column).and_then(|v| v.as_deref()) == Some(value))
        })
    }
}

/// The text PostgreSQL would print for a bound value.
pub fn pg_text(value: &TypedValue) -> Option<String> {
    value.value.as_ref().map(|v| match v {
        CanonicalValue::Text(s) => s.clone(),
        CanonicalValue::Integer(i) => i.to_string(),
        CanonicalValue::Real(r) => r.to_string(),
        CanonicalValue::Boolean(b) => b.to_string(),
        CanonicalValue::Timestamp(t) => t.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
    })
}

#[async_trait::async_trait]
impl TargetStore for MemoryTarget {
    async fn list_tables(&mut self) -> Result<BTreeSet<String>, TargetStoreError> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn set_integrity_enforcement(&mut self, enabled: bool) -> Result<bool, TargetStoreError> {
        self.enforcement_calls.push(enabled);
        if !self.can_disable_integrity {
            return Ok(false);
        }
        self.integrity_enabled = enabled;
        Ok(true)
    }

    async fn truncate_cascade(&mut self, table: &str) -> Result<(), TargetStoreError> {
        if self.failing_truncates.contains(table) {
            return Err(target_error(format!("permission denied for table {table}")));
        }
        self.table(table)?;
        self.truncated.push(table.to_string());

        let mut pending = vec![table.to_string()];
        while let Some(name) = pending.pop() {
            if let Some(t) = self.tables.get_mut(&name) {
                t.rows.clear();
            }
            for (child, t) in &self.tables {
                if t.foreign_keys.iter().any(|fk| fk.parent == name) && !t.rows.is_empty() {
                    pending.push(child.clone());
                }
            }
        }
        Ok(())
    }

    async fn insert_row(
        &mut self,
        table: &str,
        columns: &[String],
        values: &[TypedValue],
    ) -> Result<InsertOutcome, TargetStoreError> {
        if columns.len() != values.len() {
            return Err(TargetStoreError::ArityMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }

        let row: TextRow = columns.iter().cloned().zip(values.iter().map(pg_text)).collect();
        let target = self.table(table)?;

        if let Some(Some(key)) = row.get(&target.key) {
            let exists = target
                .rows
                .iter()
                .any(|r| r.get(&target.key).and_then(|v| v.as_deref()) == Some(key.as_str()));
            if exists {
                return Ok(InsertOutcome::Conflict);
            }
        }

        if self.integrity_enabled {
            for fk in &target.foreign_keys {
                if let Some(Some(value)) = row.get(&fk.column) {
                    if !self.parent_has(fk, value) {
                        return Err(target_error(format!(
                            "insert on table \"{table}\" violates foreign key on {}",
                            fk.column
                        )));
                    }
                }
            }
        }

        if let Some(t) = self.tables.get_mut(table) {
            t.rows.push(row);
        }
        self.insert_log.push(table.to_string());
        Ok(InsertOutcome::Inserted)
    }

    async fn reset_sequences(&mut self) -> Result<Vec<String>, TargetStoreError> {
        if self.fail_sequence_reset {
            return Err(target_error("must be owner of sequence".to_string()));
        }
        Ok(self.sequences.clone())
    }

    async fn count(&mut self, table: &str) -> Result<i64, TargetStoreError> {
        Ok(self.table(table)?.rows.len() as i64)
    }

    async fn fetch_text_row(
        &mut self,
        table: &str,
        id_column: &str,
        id_value: &str,
        columns: &[String],
    ) -> Result<Option<TextRow>, TargetStoreError> {
        let found = self
            .table(table)?
            .rows
            .iter()
            .find(|r| r.get(id_column).and_then(|v| v.as_deref()) == Some(id_value));

        Ok(found.map(|row| {
            columns
                .iter()
                .map(|c| (c.clone(), row.get(c).cloned().flatten()))
                .collect()
        }))
    }

    async fn distinct_text_values(
        &mut self,
        table: &str,
        column: &str,
        limit: i64,
    ) -> Result<Vec<String>, TargetStoreError> {
        let values: BTreeSet<String> = self
            .table(table)?
            .rows
            .iter()
            .filter_map(|r| r.get(column).cloned().flatten())
            .collect();
        Ok(values.into_iter().take(limit.max(0) as usize).collect())
    }
}

pub const USER_SCHEMA: &str = r#"
model User {
  id       String   @id
  active   Boolean
  joinedAt DateTime
}
"#;

pub const CHAIN_SCHEMA: &str = r#"
model Program {
  id      Int      @id
  name    String
  members Member[]
}

model Member {
  id        Int     @id
  email     String
  program   Program @relation(fields: [programId], references: [id])
  programId Int
  votes     Vote[]
}

model Vote {
  id       Int     @id
  member   Member  @relation(fields: [memberId], references: [id])
  memberId Int
  approve  Boolean
}
"#;

pub fn chain_source() -> MemorySource {
    MemorySource::new()
        .with_rows(
            "Program",
            vec![
                vec![("id", RawValue::Integer(1)), ("name", RawValue::from("alpha"))],
                vec![("id", RawValue::Integer(2)), ("name", RawValue::from("beta"))],
            ],
        )
        .with_rows(
            "Member",
            vec![
                vec![
                    ("id", RawValue::Integer(10)),
                    ("email", RawValue::from("a@example.com")),
                    ("programId", RawValue::Integer(1)),
                ],
                vec![
                    ("id", RawValue::Integer(11)),
                    ("email", RawValue::from("b@example.com")),
                    ("programId", RawValue::Integer(2)),
                ],
            ],
        )
        .with_rows(
            "Vote",
            vec![vec![
                ("id", RawValue::Integer(100)),
                ("memberId", RawValue::Integer(10)),
                ("approve", RawValue::Integer(1)),
            ]],
        )
}

pub fn chain_target(can_disable_integrity: bool) -> MemoryTarget {
    MemoryTarget::new(can_disable_integrity)
        .with_table("Program", "id")
        .with_table("Member", "id")
        .with_table("Vote", "id")
        .with_foreign_key("Member", "programId", "Program", "id")
        .with_foreign_key("Vote", "memberId", "Member", "id")
}
