//! Bookmarked folders and documents.

use crate::domain::model::{CmisItem, Favorite};
use crate::utils::error::{CmisError, Result};
use rusqlite::{params, Connection, Row};

const FAVORITE_SELECT_SQL: &str = "SELECT id, title, url, server_id, mimetype FROM favorites";

/// A favorite before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFavorite {
    pub title: String,
    pub url: String,
    pub server_id: i64,
    pub mime_type: String,
}

impl NewFavorite {
    /// Folders are stored by their children feed, documents by their entry URL.
    pub fn from_item(server_id: i64, item: &CmisItem) -> Self {
        if item.has_children() {
            Self {
                title: item.title.clone(),
                url: item.down_link.clone(),
                server_id,
                mime_type: String::new(),
            }
        } else {
            Self {
                title: item.title.clone(),
                url: item.self_url.clone(),
                server_id,
                mime_type: item.mime_type.clone(),
            }
        }
    }
}

pub trait FavoriteRepository {
    fn insert(&self, favorite: &NewFavorite) -> Result<i64>;
    fn get(&self, id: i64) -> Result<Favorite>;
    fn list_for_server(&self, server_id: i64) -> Result<Vec<Favorite>>;
    fn list_all(&self) -> Result<Vec<Favorite>>;
    fn delete(&self, id: i64) -> Result<()>;
}

pub struct SqliteFavoriteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFavoriteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

fn favorite_from_row(row: &Row<'_>) -> rusqlite::Result<Favorite> {
    Ok(Favorite {
        id: row.get("id")?,
        title: row.get("title")?,
        url: row.get("url")?,
        server_id: row.get("server_id")?,
        mime_type: row.get("mimetype")?,
    })
}

impl FavoriteRepository for SqliteFavoriteRepository<'_> {
    fn insert(&self, favorite: &NewFavorite) -> Result<i64> {
        if favorite.url.is_empty() {
            return Err(CmisError::InvalidConfigValue {
                field: "favorite.url".to_string(),
                value: favorite.title.clone(),
                reason: "entry has neither a children feed nor a self link".to_string(),
            });
        }

        self.conn.execute(
            "INSERT INTO favorites (title, url, server_id, mimetype) VALUES (?1, ?2, ?3, ?4)",
            params![
                favorite.title,
                favorite.url,
                favorite.server_id,
                favorite.mime_type
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, id: i64) -> Result<Favorite> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FAVORITE_SELECT_SQL} WHERE id = ?1"))?;
        let favorite = stmt.query_map([id], favorite_from_row)?.next().transpose()?;

        favorite.ok_or_else(|| CmisError::NotFound {
            what: "favorite",
            key: id.to_string(),
        })
    }

    fn list_for_server(&self, server_id: i64) -> Result<Vec<Favorite>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FAVORITE_SELECT_SQL} WHERE server_id = ?1 ORDER BY id"
        ))?;
        let favorites = stmt
            .query_map([server_id], favorite_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(favorites)
    }

    fn list_all(&self) -> Result<Vec<Favorite>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FAVORITE_SELECT_SQL} ORDER BY server_id, id"))?;
        let favorites = stmt
            .query_map([], favorite_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(favorites)
    }

    fn delete(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM favorites WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(CmisError::NotFound {
                what: "favorite",
                key: id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::open_db_in_memory;

    fn new_favorite(title: &str, server_id: i64) -> NewFavorite {
        NewFavorite {
            title: title.to_string(),
            url: format!("http://host/{title}"),
            server_id,
            mime_type: String::new(),
        }
    }

    #[test]
    fn test_insert_get_delete() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteFavoriteRepository::new(&conn);

        let id = repo.insert(&new_favorite("Sites", 1)).unwrap();
        let stored = repo.get(id).unwrap();
        assert_eq!(stored.title, "Sites");
        assert_eq!(stored.url, "http://host/Sites");
        assert!(stored.is_folder());

        repo.delete(id).unwrap();
        assert!(matches!(repo.get(id), Err(CmisError::NotFound { .. })));
        assert!(matches!(repo.delete(id), Err(CmisError::NotFound { .. })));
    }

    #[test]
    fn test_list_is_scoped_by_server() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteFavoriteRepository::new(&conn);

        repo.insert(&new_favorite("a", 1)).unwrap();
        repo.insert(&new_favorite("b", 2)).unwrap();
        repo.insert(&new_favorite("c", 1)).unwrap();

        let titles: Vec<String> = repo
            .list_for_server(1)
            .unwrap()
            .into_iter()
            .map(|f| f.title)
            .collect();
        assert_eq!(titles, vec!["a", "c"]);
        assert_eq!(repo.list_all().unwrap().len(), 3);
        assert!(repo.list_for_server(7).unwrap().is_empty());
    }

    #[test]
    fn test_entry_without_links_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteFavoriteRepository::new(&conn);

        let orphan = NewFavorite::from_item(1, &CmisItem::navigation("orphan", ""));
        assert!(repo.insert(&orphan).is_err());
    }

    #[test]
    fn test_from_item_document_uses_self_url() {
        let mut item = CmisItem::navigation("a.pdf", "");
        item.self_url = "http://host/entry/a".to_string();
        item.mime_type = "application/pdf".to_string();

        let favorite = NewFavorite::from_item(4, &item);
        assert_eq!(favorite.url, "http://host/entry/a");
        assert_eq!(favorite.mime_type, "application/pdf");
        assert_eq!(favorite.server_id, 4);
    }
}
