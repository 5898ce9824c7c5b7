//! Menu item store backed by SQLite
//!
//! Durable menu entries created from reviewed scan results or added by
//! hand. The parser never writes here; the caller decides what to keep.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// A durable menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub unit: String,
    pub image_uri: String,
}

/// Fields supplied by the caller when creating an entry.
#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub name: String,
    pub price: f64,
    pub unit: String,
    pub image_uri: String,
}

/// SQLite-backed menu item store.
pub struct MenuStore {
    conn: Connection,
}

impl MenuStore {
    /// Open or create the store at path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS menu_items (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                unit TEXT NOT NULL,
                image_uri TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;
        Ok(())
    }

    /// Add a single item; the store assigns the id.
    pub fn add_item(&self, new_item: NewMenuItem) -> Result<MenuItem> {
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            name: new_item.name,
            price: new_item.price,
            unit: new_item.unit,
            image_uri: new_item.image_uri,
        };
        self.conn.execute(
            "INSERT INTO menu_items (id, name, price, unit, image_uri)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![item.id, item.name, item.price, item.unit, item.image_uri],
        )?;
        Ok(item)
    }

    /// Add many items in one transaction; all or nothing.
    pub fn add_items(&mut self, new_items: Vec<NewMenuItem>) -> Result<Vec<MenuItem>> {
        let tx = self.conn.transaction()?;
        let mut added = Vec::with_capacity(new_items.len());

        for new_item in new_items {
            let item = MenuItem {
                id: Uuid::new_v4().to_string(),
                name: new_item.name,
                price: new_item.price,
                unit: new_item.unit,
                image_uri: new_item.image_uri,
            };
            tx.execute(
                "INSERT INTO menu_items (id, name, price, unit, image_uri)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![item.id, item.name, item.price, item.unit, item.image_uri],
            )?;
            added.push(item);
        }

        tx.commit()?;
        Ok(added)
    }

    /// Delete an item by id. Returns whether anything was removed.
    pub fn delete_item(&self, id: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM menu_items WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// All items in insertion order.
    pub fn list_items(&self) -> Result<Vec<MenuItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, price, unit, image_uri FROM menu_items ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(MenuItem {
                id: row.get(0)?,
                name: row.get(1)?,
                price: row.get(2)?,
                unit: row.get(3)?,
                image_uri: row.get(4)?,
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }
}
