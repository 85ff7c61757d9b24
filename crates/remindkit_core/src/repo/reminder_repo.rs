//! Reminder repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD access to the `reminders` table.
//! - Keep SQL and column encoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Reminder::validate()` before SQL mutations.
//! - Read paths reject unknown enum values instead of masking them.
//! - `selected_days` is stored as a comma-separated list (`"1,3,5"`).

use crate::db::DbError;
use crate::model::reminder::{
    mode_label, recurring_mode_label, Priority, RecurringMode, Reminder, ReminderMode,
    ReminderValidationError,
};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const REMINDER_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    priority,
    mode,
    recurring_mode,
    selected_days,
    date,
    date_created,
    date_modified
FROM reminders";

pub type RepoResult<T> = Result<T, RepoError>;

/// Reminder persistence error.
#[derive(Debug)]
pub enum RepoError {
    Validation(ReminderValidationError),
    Db(DbError),
    NotFound(String),
    AlreadyExists(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "reminder not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "reminder already exists: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted reminder data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::AlreadyExists(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ReminderValidationError> for RepoError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for reminder records.
pub trait ReminderRepository {
    fn create_reminder(&self, reminder: &Reminder) -> RepoResult<()>;
    fn update_reminder(&self, reminder: &Reminder) -> RepoResult<()>;
    fn get_reminder(&self, id: &str) -> RepoResult<Option<Reminder>>;
    /// All reminders, newest edit first.
    fn list_reminders(&self) -> RepoResult<Vec<Reminder>>;
    fn delete_reminder(&self, id: &str) -> RepoResult<()>;
}

/// SQLite-backed reminder repository.
pub struct SqliteReminderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReminderRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReminderRepository for SqliteReminderRepository<'_> {
    fn create_reminder(&self, reminder: &Reminder) -> RepoResult<()> {
        reminder.validate()?;

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO reminders (
                id,
                title,
                description,
                priority,
                mode,
                recurring_mode,
                selected_days,
                date,
                date_created,
                date_modified
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                reminder.id.as_str(),
                reminder.title.as_str(),
                reminder.description.as_deref(),
                priority_to_db(reminder.priority),
                mode_label(reminder.mode),
                reminder.recurring_mode.map(recurring_mode_label),
                days_to_db(&reminder.selected_days),
                reminder.date,
                reminder.date_created,
                reminder.date_modified,
            ],
        )?;

        if inserted == 0 {
            return Err(RepoError::AlreadyExists(reminder.id.clone()));
        }
        Ok(())
    }

    fn update_reminder(&self, reminder: &Reminder) -> RepoResult<()> {
        reminder.validate()?;

        let changed = self.conn.execute(
            "UPDATE reminders
             SET
                title = ?2,
                description = ?3,
                priority = ?4,
                mode = ?5,
                recurring_mode = ?6,
                selected_days = ?7,
                date = ?8,
                date_modified = ?9
             WHERE id = ?1;",
            params![
                reminder.id.as_str(),
                reminder.title.as_str(),
                reminder.description.as_deref(),
                priority_to_db(reminder.priority),
                mode_label(reminder.mode),
                reminder.recurring_mode.map(recurring_mode_label),
                days_to_db(&reminder.selected_days),
                reminder.date,
                reminder.date_modified,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(reminder.id.clone()));
        }
        Ok(())
    }

    fn get_reminder(&self, id: &str) -> RepoResult<Option<Reminder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REMINDER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_reminder_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_reminders(&self) -> RepoResult<Vec<Reminder>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REMINDER_SELECT_SQL} ORDER BY date_modified DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut reminders = Vec::new();
        while let Some(row) = rows.next()? {
            reminders.push(parse_reminder_row(row)?);
        }
        Ok(reminders)
    }

    fn delete_reminder(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM reminders WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn parse_reminder_row(row: &Row<'_>) -> RepoResult<Reminder> {
    let id: String = row.get("id")?;

    let priority_text: String = row.get("priority")?;
    let priority = parse_priority(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid priority `{priority_text}` for `{id}`"))
    })?;

    let mode_text: String = row.get("mode")?;
    let mode = parse_mode(&mode_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid mode `{mode_text}` for `{id}`")))?;

    let recurring_mode = match row.get::<_, Option<String>>("recurring_mode")? {
        Some(value) => Some(parse_recurring_mode(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid recurring mode `{value}` for `{id}`"))
        })?),
        None => None,
    };

    let days_text: String = row.get("selected_days")?;
    let selected_days = parse_days(&days_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid selected days `{days_text}` for `{id}`"))
    })?;

    Ok(Reminder {
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        mode,
        recurring_mode,
        selected_days,
        date: row.get("date")?,
        date_created: row.get("date_created")?,
        date_modified: row.get("date_modified")?,
        id,
    })
}

fn priority_to_db(priority: Priority) -> &'static str {
    match priority {
        Priority::Silent => "silent",
        Priority::Vibrate => "vibrate",
        Priority::Urgent => "urgent",
    }
}

fn parse_priority(value: &str) -> Option<Priority> {
    match value {
        "silent" => Some(Priority::Silent),
        "vibrate" => Some(Priority::Vibrate),
        "urgent" => Some(Priority::Urgent),
        _ => None,
    }
}

fn parse_mode(value: &str) -> Option<ReminderMode> {
    match value {
        "once" => Some(ReminderMode::Once),
        "repeat" => Some(ReminderMode::Repeat),
        "permanent" => Some(ReminderMode::Permanent),
        _ => None,
    }
}

fn parse_recurring_mode(value: &str) -> Option<RecurringMode> {
    match value {
        "day" => Some(RecurringMode::Day),
        "week" => Some(RecurringMode::Week),
        "month" => Some(RecurringMode::Month),
        _ => None,
    }
}

fn days_to_db(days: &[u8]) -> String {
    days.iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_days(value: &str) -> Option<Vec<u8>> {
    if value.trim().is_empty() {
        return Some(Vec::new());
    }
    value
        .split(',')
        .map(|part| part.trim().parse::<u8>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{days_to_db, parse_days};

    #[test]
    fn days_column_encoding() {
        assert_eq!(days_to_db(&[1, 3, 5]), "1,3,5");
        assert_eq!(days_to_db(&[]), "");
        assert_eq!(parse_days("1, 3,5"), Some(vec![1, 3, 5]));
        assert_eq!(parse_days(""), Some(Vec::new()));
        assert_eq!(parse_days("1,x"), None);
    }
}
