//! Stored server connection profiles.

use crate::domain::model::Server;
use crate::utils::error::{CmisError, Result};
use crate::utils::validation;
use rusqlite::{params, Connection, Row};

const SERVER_SELECT_SQL: &str = "SELECT id, name, url, username, password, workspace FROM servers";

pub trait ServerRepository {
    /// Stores a profile; the `id` of `server` is ignored and the new id returned.
    fn insert(&self, server: &Server) -> Result<i64>;
    fn get(&self, id: i64) -> Result<Server>;
    fn list(&self) -> Result<Vec<Server>>;
    fn delete(&self, id: i64) -> Result<()>;
}

pub struct SqliteServerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteServerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

fn server_from_row(row: &Row<'_>) -> rusqlite::Result<Server> {
    Ok(Server {
        id: row.get("id")?,
        name: row.get("name")?,
        url: row.get("url")?,
        user: row.get("username")?,
        password: row.get("password")?,
        workspace: row.get("workspace")?,
    })
}

impl ServerRepository for SqliteServerRepository<'_> {
    fn insert(&self, server: &Server) -> Result<i64> {
        validation::validate_not_blank("server.name", &server.name)?;
        validation::validate_url("server.url", &server.url)?;

        self.conn.execute(
            "INSERT INTO servers (name, url, username, password, workspace)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                server.name,
                server.url,
                server.user,
                server.password,
                server.workspace
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, id: i64) -> Result<Server> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SERVER_SELECT_SQL} WHERE id = ?1"))?;
        let server = stmt.query_map([id], server_from_row)?.next().transpose()?;

        server.ok_or_else(|| CmisError::NotFound {
            what: "server",
            key: id.to_string(),
        })
    }

    fn list(&self) -> Result<Vec<Server>> {
        let mut stmt = self.conn.prepare(&format!("{SERVER_SELECT_SQL} ORDER BY id"))?;
        let servers = stmt
            .query_map([], server_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(servers)
    }

    /// Removes the profile together with its favorites.
    fn delete(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM servers WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(CmisError::NotFound {
                what: "server",
                key: id.to_string(),
            });
        }
        self.conn
            .execute("DELETE FROM favorites WHERE server_id = ?1", [id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::favorites::{FavoriteRepository, NewFavorite, SqliteFavoriteRepository};
    use crate::adapters::open_db_in_memory;

    fn server(name: &str, url: &str) -> Server {
        Server {
            id: 0,
            name: name.to_string(),
            url: url.to_string(),
            user: "admin".to_string(),
            password: "admin".to_string(),
            workspace: String::new(),
        }
    }

    #[test]
    fn test_insert_and_list() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteServerRepository::new(&conn);

        let a = repo.insert(&server("dev", "http://dev/cmis")).unwrap();
        let b = repo.insert(&server("prod", "https://prod/cmis")).unwrap();
        assert_ne!(a, b);

        let stored = repo.get(b).unwrap();
        assert_eq!(stored.id, b);
        assert_eq!(stored.name, "prod");
        assert_eq!(stored.user, "admin");

        let names: Vec<String> = repo.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["dev", "prod"]);
    }

    #[test]
    fn test_invalid_profiles_are_rejected() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteServerRepository::new(&conn);

        assert!(repo.insert(&server("", "http://dev/cmis")).is_err());
        assert!(repo.insert(&server("dev", "dev/cmis")).is_err());
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_cascades_to_favorites() {
        let conn = open_db_in_memory().unwrap();
        let servers = SqliteServerRepository::new(&conn);
        let favorites = SqliteFavoriteRepository::new(&conn);

        let id = servers.insert(&server("dev", "http://dev/cmis")).unwrap();
        favorites
            .insert(&NewFavorite {
                title: "Sites".to_string(),
                url: "http://dev/cmis/children/sites".to_string(),
                server_id: id,
                mime_type: String::new(),
            })
            .unwrap();

        servers.delete(id).unwrap();
        assert!(matches!(servers.get(id), Err(CmisError::NotFound { .. })));
        assert!(favorites.list_for_server(id).unwrap().is_empty());
    }
}
