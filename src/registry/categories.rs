// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::clean;
use crate::errors::{Result, TabunganError};
use crate::models::{Category, CategoryKind};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInput {
    pub kind: CategoryKind,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub target: Option<Decimal>,
    pub storage_account_id: Option<i64>,
}

impl CategoryInput {
    pub fn new(kind: CategoryKind, name: &str) -> Self {
        CategoryInput {
            kind,
            name: name.to_string(),
            description: None,
            icon: None,
            color: None,
            target: None,
            storage_account_id: None,
        }
    }

    fn normalized(&self, conn: &Connection) -> Result<CategoryInput> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TabunganError::validation("category name must not be empty"));
        }
        if let Some(t) = self.target {
            if t < Decimal::ZERO {
                return Err(TabunganError::validation("target must not be negative"));
            }
        }
        if let Some(account_id) = self.storage_account_id {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT id FROM storage_accounts WHERE id=?1",
                    params![account_id],
                    |r| r.get(0),
                )
                .optional()?;
            if found.is_none() {
                return Err(TabunganError::not_found("storage account", account_id));
            }
        }
        Ok(CategoryInput {
            kind: self.kind,
            name: name.to_string(),
            description: clean(self.description.as_deref()),
            icon: clean(self.icon.as_deref()),
            color: clean(self.color.as_deref()),
            // a zero target means "no target"
            target: self.target.filter(|t| !t.is_zero()),
            storage_account_id: self.storage_account_id,
        })
    }
}

pub fn add(conn: &Connection, input: &CategoryInput) -> Result<Category> {
    let c = input.normalized(conn)?;
    conn.execute(
        "INSERT INTO categories(kind, name, description, icon, color, target,
             storage_account_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            c.kind.as_str(),
            c.name,
            c.description,
            c.icon,
            c.color,
            c.target.map(|t| t.to_string()),
            c.storage_account_id,
            Utc::now(),
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

/// Overwrites every editable field. The kind of an existing category is
/// fixed; `input.kind` must match it.
pub fn edit(conn: &Connection, id: i64, input: &CategoryInput) -> Result<Category> {
    let existing = get(conn, id)?;
    if existing.kind != input.kind {
        return Err(TabunganError::not_found(input.kind.entity(), id));
    }
    let c = input.normalized(conn)?;
    conn.execute(
        "UPDATE categories SET name=?1, description=?2, icon=?3, color=?4, target=?5,
             storage_account_id=?6, updated_at=?7
         WHERE id=?8",
        params![
            c.name,
            c.description,
            c.icon,
            c.color,
            c.target.map(|t| t.to_string()),
            c.storage_account_id,
            Utc::now(),
            id,
        ],
    )?;
    get(conn, id)
}

pub fn remove(conn: &Connection, kind: CategoryKind, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM categories WHERE id=?1 AND kind=?2",
        params![id, kind.as_str()],
    )?;
    if n == 0 {
        return Err(TabunganError::not_found(kind.entity(), id));
    }
    Ok(())
}

pub fn get(conn: &Connection, id: i64) -> Result<Category> {
    let sql = format!("SELECT {} FROM categories WHERE id=?1", Category::COLUMNS);
    conn.query_row(&sql, params![id], Category::from_row)
        .optional()?
        .ok_or_else(|| TabunganError::not_found("category", id))
}

pub fn find_by_name(conn: &Connection, kind: CategoryKind, name: &str) -> Result<Option<Category>> {
    let sql = format!(
        "SELECT {} FROM categories WHERE kind=?1 AND name=?2",
        Category::COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![kind.as_str(), name.trim()], Category::from_row)
        .optional()?)
}

/// Categories of `kind`, or all when `None`, by kind then name.
pub fn list(conn: &Connection, kind: Option<CategoryKind>) -> Result<Vec<Category>> {
    let sql = format!(
        "SELECT {} FROM categories WHERE ?1 IS NULL OR kind=?1 ORDER BY kind, name",
        Category::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![kind.map(|k| k.as_str())], Category::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_allowed_across_kinds() {
        let conn = crate::db::open_in_memory().unwrap();
        add(&conn, &CategoryInput::new(CategoryKind::Savings, "Pendidikan")).unwrap();
        add(&conn, &CategoryInput::new(CategoryKind::Expense, "Pendidikan")).unwrap();
        assert!(add(&conn, &CategoryInput::new(CategoryKind::Expense, "Pendidikan")).is_err());
        assert_eq!(list(&conn, None).unwrap().len(), 2);
        assert_eq!(list(&conn, Some(CategoryKind::Savings)).unwrap().len(), 1);
    }

    #[test]
    fn linked_account_must_exist() {
        let conn = crate::db::open_in_memory().unwrap();
        let mut input = CategoryInput::new(CategoryKind::Expense, "Listrik");
        input.storage_account_id = Some(5);
        assert!(matches!(
            add(&conn, &input),
            Err(TabunganError::NotFound { entity: "storage account", id: 5 })
        ));
    }

    #[test]
    fn remove_checks_kind() {
        let conn = crate::db::open_in_memory().unwrap();
        let c = add(&conn, &CategoryInput::new(CategoryKind::Savings, "Haji")).unwrap();
        assert!(remove(&conn, CategoryKind::Expense, c.id).is_err());
        remove(&conn, CategoryKind::Savings, c.id).unwrap();
        assert!(get(&conn, c.id).is_err());
    }
}
