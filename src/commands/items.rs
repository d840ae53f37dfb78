// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_category, insert_error, maybe_print_json, output_flags, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let category = sub.get_one::<String>("category").unwrap().trim();
            add(conn, name, category)?;
            println!("Added item '{}' under '{}'", name, category);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let category = sub.get_one::<String>("category").map(|s| s.trim());
            let data = list_rows(conn, category)?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|i| vec![i.name.clone(), i.category.clone()])
                    .collect();
                println!("{}", pretty_table(&["Item", "Category"], rows));
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let n = conn.execute("DELETE FROM items WHERE name=?1", params![name])?;
            if n == 0 {
                return Err(anyhow!("Item '{}' not found", name));
            }
            tracing::info!(item = name, "item removed");
            println!("Removed item '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

pub fn add(conn: &Connection, name: &str, category: &str) -> Result<i64> {
    if name.is_empty() {
        return Err(anyhow!("Item name cannot be empty"));
    }
    let category_id = id_for_category(conn, category)?;
    conn.execute(
        "INSERT INTO items(name, category_id) VALUES (?1, ?2)",
        params![name, category_id],
    )
    .map_err(|e| insert_error(e, "item", format!("Item '{}' already exists", name)))?;
    Ok(conn.last_insert_rowid())
}

#[derive(Debug, Serialize)]
pub struct ItemRow {
    pub id: i64,
    pub name: String,
    pub category: String,
}

pub fn list_rows(conn: &Connection, category: Option<&str>) -> Result<Vec<ItemRow>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.name, c.name
         FROM items i JOIN categories c ON i.category_id=c.id
         WHERE ?1 IS NULL OR c.name=?1
         ORDER BY c.name, i.name",
    )?;
    let rows = stmt.query_map(params![category], |r| {
        Ok(ItemRow {
            id: r.get(0)?,
            name: r.get(1)?,
            category: r.get(2)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
