//! SQLite-backed family-tree store. Relationships are identifier lists
//! stored as JSON text columns.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Person {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub middle_names: Vec<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub nicknames: Vec<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub pronouns: Option<String>,
    /// Dates of birth/death as Unix seconds.
    #[serde(default)]
    pub dob: Option<i64>,
    #[serde(default)]
    pub dod: Option<i64>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub step_parents: Vec<String>,
    #[serde(default)]
    pub guardians: Vec<String>,
    #[serde(default)]
    pub is_adopted: bool,
    #[serde(default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub prev_partners: Vec<String>,
}

#[derive(Clone)]
pub struct PersonStore {
    conn: Arc<Mutex<Connection>>,
}

const COLUMNS: &str = "id, name, middle_names, surname, nicknames, sex, gender, pronouns, \
                       dob, dod, parents, step_parents, guardians, is_adopted, partner, \
                       prev_partners";

impl PersonStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, id: &str) -> Result<Person> {
        let conn = self.conn();
        let person = conn
            .query_row(
                &format!("SELECT {} FROM people WHERE id = ?", COLUMNS),
                [id],
                person_from_row,
            )
            .optional()?;
        person.ok_or_else(|| Error::NotFound("person does not exist".to_string()))
    }

    pub fn get_by_name(&self, name: &str) -> Result<Person> {
        let conn = self.conn();
        let person = conn
            .query_row(
                &format!("SELECT {} FROM people WHERE name = ?", COLUMNS),
                [name],
                person_from_row,
            )
            .optional()?;
        person.ok_or_else(|| Error::NotFound("person does not exist".to_string()))
    }

    pub fn create(&self, person: &Person) -> Result<()> {
        self.conn().execute(
            "INSERT INTO people
             (id, name, middle_names, surname, nicknames, sex, gender, pronouns,
              dob, dod, parents, step_parents, guardians, is_adopted, partner, prev_partners)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            rusqlite::params_from_iter(person_params(person)),
        )?;
        Ok(())
    }

    pub fn update(&self, person: &Person) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE people SET
             name = ?2, middle_names = ?3, surname = ?4, nicknames = ?5, sex = ?6,
             gender = ?7, pronouns = ?8, dob = ?9, dod = ?10, parents = ?11,
             step_parents = ?12, guardians = ?13, is_adopted = ?14, partner = ?15,
             prev_partners = ?16
             WHERE id = ?1",
            rusqlite::params_from_iter(person_params(person)),
        )?;
        if changed == 0 {
            return Err(Error::NotFound("person does not exist".to_string()));
        }
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM people WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(Error::NotFound("person does not exist".to_string()));
        }
        Ok(())
    }

    pub fn list(&self, amount: usize, cursor: usize) -> Result<Vec<Person>> {
        let conn = self.conn();
        let total: usize = conn.query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))?;
        if cursor > 0 && cursor >= total {
            return Err(Error::InvalidInput("invalid cursor".to_string()));
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM people ORDER BY CAST(id AS INTEGER) LIMIT ?1 OFFSET ?2",
            COLUMNS
        ))?;
        let rows = stmt.query_map(params![amount, cursor], person_from_row)?;
        let mut people = Vec::new();
        for person in rows {
            people.push(person?);
        }
        Ok(people)
    }
}

fn person_params(person: &Person) -> Vec<Box<dyn rusqlite::ToSql>> {
    vec![
        Box::new(person.id.clone()),
        Box::new(person.name.clone()),
        Box::new(encode_list(&person.middle_names)),
        Box::new(person.surname.clone()),
        Box::new(encode_list(&person.nicknames)),
        Box::new(person.sex.clone()),
        Box::new(person.gender.clone()),
        Box::new(person.pronouns.clone()),
        Box::new(person.dob),
        Box::new(person.dod),
        Box::new(encode_list(&person.parents)),
        Box::new(encode_list(&person.step_parents)),
        Box::new(encode_list(&person.guardians)),
        Box::new(person.is_adopted),
        Box::new(person.partner.clone()),
        Box::new(encode_list(&person.prev_partners)),
    ]
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get(0)?,
        name: row.get(1)?,
        middle_names: decode_list(2, row.get(2)?)?,
        surname: row.get(3)?,
        nicknames: decode_list(4, row.get(4)?)?,
        sex: row.get(5)?,
        gender: row.get(6)?,
        pronouns: row.get(7)?,
        dob: row.get(8)?,
        dod: row.get(9)?,
        parents: decode_list(10, row.get(10)?)?,
        step_parents: decode_list(11, row.get(11)?)?,
        guardians: decode_list(12, row.get(12)?)?,
        is_adopted: row.get(13)?,
        partner: row.get(14)?,
        prev_partners: decode_list(15, row.get(15)?)?,
    })
}

fn decode_list(idx: usize, raw: String) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
