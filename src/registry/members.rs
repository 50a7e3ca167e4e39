// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::clean;
use crate::errors::{Result, TabunganError};
use crate::models::FamilyMember;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

pub fn add(conn: &Connection, name: &str, role: &str, avatar: Option<&str>) -> Result<FamilyMember> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TabunganError::validation("member name must not be empty"));
    }
    conn.execute(
        "INSERT INTO family_members(name, role, avatar, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![name, role.trim(), clean(avatar), Utc::now()],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn edit(
    conn: &Connection,
    id: i64,
    name: &str,
    role: &str,
    avatar: Option<&str>,
) -> Result<FamilyMember> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TabunganError::validation("member name must not be empty"));
    }
    let n = conn.execute(
        "UPDATE family_members SET name=?1, role=?2, avatar=?3, updated_at=?4 WHERE id=?5",
        params![name, role.trim(), clean(avatar), Utc::now(), id],
    )?;
    if n == 0 {
        return Err(TabunganError::not_found("family member", id));
    }
    get(conn, id)
}

pub fn remove(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM family_members WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(TabunganError::not_found("family member", id));
    }
    Ok(())
}

pub fn get(conn: &Connection, id: i64) -> Result<FamilyMember> {
    let sql = format!("SELECT {} FROM family_members WHERE id=?1", FamilyMember::COLUMNS);
    conn.query_row(&sql, params![id], FamilyMember::from_row)
        .optional()?
        .ok_or_else(|| TabunganError::not_found("family member", id))
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<FamilyMember>> {
    let sql = format!(
        "SELECT {} FROM family_members WHERE name=?1 ORDER BY id LIMIT 1",
        FamilyMember::COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![name.trim()], FamilyMember::from_row)
        .optional()?)
}

pub fn list(conn: &Connection) -> Result<Vec<FamilyMember>> {
    let sql = format!("SELECT {} FROM family_members ORDER BY id", FamilyMember::COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], FamilyMember::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
