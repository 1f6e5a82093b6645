//! Picture record CRUD operations.

use chrono::Utc;
use gallery_core::{BloggerId, Error, PictureCategory, PictureId, Result};
use rusqlite::Connection;

use crate::models::{format_timestamp, NewPicture, Picture};

const COLS: &str = "id, owner_id, category, path, bewrite, title, uploaded_at";

/// Insert a new picture record, stamping it with the current time.
pub fn create_picture(conn: &Connection, new: &NewPicture) -> Result<Picture> {
    let uploaded_at = Utc::now();

    conn.execute(
        "INSERT INTO blogger_pictures (owner_id, category, path, bewrite, title, uploaded_at)
         VALUES (?1,?2,?3,?4,?5,?6)",
        rusqlite::params![
            new.owner_id.get(),
            new.category.code(),
            new.path,
            new.bewrite,
            new.title,
            format_timestamp(&uploaded_at),
        ],
    )
    .map_err(|e| Error::persist(e.to_string()))?;

    Ok(Picture {
        id: PictureId::from(conn.last_insert_rowid()),
        owner_id: new.owner_id,
        category: new.category,
        path: new.path.clone(),
        bewrite: new.bewrite.clone(),
        title: new.title.clone(),
        uploaded_at,
    })
}

/// Re-insert a record under its original id.
pub fn restore_picture(conn: &Connection, picture: &Picture) -> Result<()> {
    conn.execute(
        &format!("INSERT INTO blogger_pictures ({COLS}) VALUES (?1,?2,?3,?4,?5,?6,?7)"),
        rusqlite::params![
            picture.id.get(),
            picture.owner_id.get(),
            picture.category.code(),
            picture.path,
            picture.bewrite,
            picture.title,
            format_timestamp(&picture.uploaded_at),
        ],
    )
    .map_err(|e| Error::persist(e.to_string()))?;
    Ok(())
}

/// Replace the mutable fields of a record. Returns the number of rows touched.
pub fn update_picture(conn: &Connection, picture: &Picture) -> Result<usize> {
    conn.execute(
        "UPDATE blogger_pictures
         SET category = ?2, path = ?3, bewrite = ?4, title = ?5, uploaded_at = ?6
         WHERE id = ?1",
        rusqlite::params![
            picture.id.get(),
            picture.category.code(),
            picture.path,
            picture.bewrite,
            picture.title,
            format_timestamp(&picture.uploaded_at),
        ],
    )
    .map_err(|e| Error::persist(e.to_string()))
}

/// Delete a record by id. Returns the number of rows removed.
pub fn delete_picture(conn: &Connection, id: PictureId) -> Result<usize> {
    conn.execute("DELETE FROM blogger_pictures WHERE id = ?1", [id.get()])
        .map_err(|e| Error::persist(e.to_string()))
}

/// Get a record by id.
pub fn get_picture(conn: &Connection, id: PictureId) -> Result<Option<Picture>> {
    let q = format!("SELECT {COLS} FROM blogger_pictures WHERE id = ?1");
    let result = conn.query_row(&q, [id.get()], Picture::from_row);
    match result {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::persist(e.to_string())),
    }
}

/// Get the picture an owner keeps in a slot category.
///
/// Should legacy data hold several, the newest record is the slot holder.
pub fn get_picture_by_owner_and_category(
    conn: &Connection,
    owner_id: BloggerId,
    category: PictureCategory,
) -> Result<Option<Picture>> {
    let q = format!(
        "SELECT {COLS} FROM blogger_pictures WHERE owner_id = ?1 AND category = ?2
         ORDER BY id DESC LIMIT 1"
    );
    let result = conn.query_row(
        &q,
        rusqlite::params![owner_id.get(), category.code()],
        Picture::from_row,
    );
    match result {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::persist(e.to_string())),
    }
}

/// Get the first picture in a category regardless of owner.
pub fn get_picture_by_category(
    conn: &Connection,
    category: PictureCategory,
) -> Result<Option<Picture>> {
    let q = format!(
        "SELECT {COLS} FROM blogger_pictures WHERE category = ?1 ORDER BY id ASC LIMIT 1"
    );
    let result = conn.query_row(&q, [category.code()], Picture::from_row);
    match result {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::persist(e.to_string())),
    }
}

/// List an owner's pictures in insertion order.
pub fn list_pictures_by_owner(
    conn: &Connection,
    owner_id: BloggerId,
    offset: i64,
    limit: i64,
) -> Result<Vec<Picture>> {
    let q = format!(
        "SELECT {COLS} FROM blogger_pictures WHERE owner_id = ?1
         ORDER BY id ASC LIMIT ?2 OFFSET ?3"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::persist(e.to_string()))?;
    let rows = stmt
        .query_map(
            rusqlite::params![owner_id.get(), limit, offset],
            Picture::from_row,
        )
        .map_err(|e| Error::persist(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::persist(e.to_string()))?;
    Ok(rows)
}

/// List an owner's pictures of one category in insertion order.
pub fn list_pictures_by_owner_and_category(
    conn: &Connection,
    owner_id: BloggerId,
    category: PictureCategory,
    offset: i64,
    limit: i64,
) -> Result<Vec<Picture>> {
    let q = format!(
        "SELECT {COLS} FROM blogger_pictures WHERE owner_id = ?1 AND category = ?2
         ORDER BY id ASC LIMIT ?3 OFFSET ?4"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::persist(e.to_string()))?;
    let rows = stmt
        .query_map(
            rusqlite::params![owner_id.get(), category.code(), limit, offset],
            Picture::from_row,
        )
        .map_err(|e| Error::persist(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::persist(e.to_string()))?;
    Ok(rows)
}

/// Count an owner's pictures, optionally within one category.
pub fn count_pictures_by_owner(
    conn: &Connection,
    owner_id: BloggerId,
    category: Option<PictureCategory>,
) -> Result<i64> {
    let result = match category {
        Some(c) => conn.query_row(
            "SELECT COUNT(*) FROM blogger_pictures WHERE owner_id = ?1 AND category = ?2",
            rusqlite::params![owner_id.get(), c.code()],
            |row| row.get(0),
        ),
        None => conn.query_row(
            "SELECT COUNT(*) FROM blogger_pictures WHERE owner_id = ?1",
            [owner_id.get()],
            |row| row.get(0),
        ),
    };
    result.map_err(|e| Error::persist(e.to_string()))
}
