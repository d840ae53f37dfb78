// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{insert_error, maybe_print_json, output_flags, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            add(conn, name)?;
            println!("Added category '{}'", name);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data = list_rows(conn)?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|c| vec![c.name.clone(), c.items.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Category", "Items"], rows));
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let n = conn.execute("DELETE FROM categories WHERE name=?1", params![name])?;
            if n == 0 {
                return Err(anyhow!("Category '{}' not found", name));
            }
            tracing::info!(category = name, "category removed");
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

pub fn add(conn: &Connection, name: &str) -> Result<i64> {
    if name.is_empty() {
        return Err(anyhow!("Category name cannot be empty"));
    }
    conn.execute("INSERT INTO categories(name) VALUES (?1)", params![name])
        .map_err(|e| insert_error(e, "category", format!("Category '{}' already exists", name)))?;
    Ok(conn.last_insert_rowid())
}

#[derive(Debug, Serialize)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub items: i64,
}

pub fn list_rows(conn: &Connection) -> Result<Vec<CategoryRow>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, COUNT(i.id)
         FROM categories c LEFT JOIN items i ON i.category_id=c.id
         GROUP BY c.id ORDER BY c.name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(CategoryRow {
            id: r.get(0)?,
            name: r.get(1)?,
            items: r.get(2)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
