//! The record-store seam used by the gallery service.
//!
//! [`PictureRepository`] abstracts the operations the service needs;
//! [`SqlitePictureRepository`] implements them over a pooled SQLite
//! connection by delegating to [`crate::queries::pictures`].

use gallery_core::{BloggerId, PictureCategory, PictureId, Result};

use crate::models::{NewPicture, Picture};
use crate::pool::{get_conn, DbPool};
use crate::queries::pictures;

/// CRUD over picture records.
///
/// Mutations report affected row counts so callers can tell "not found"
/// apart from success; failures of the store itself surface as
/// [`gallery_core::Error::Persist`]. Nothing here retries.
pub trait PictureRepository: Send + Sync {
    fn insert(&self, picture: &NewPicture) -> Result<PictureId>;

    /// Full replace of the mutable fields by id.
    fn update(&self, picture: &Picture) -> Result<usize>;

    fn delete(&self, id: PictureId) -> Result<usize>;

    /// Put a deleted record back under its original id.
    fn restore(&self, picture: &Picture) -> Result<()>;

    fn get_by_id(&self, id: PictureId) -> Result<Option<Picture>>;

    fn get_by_owner_and_category(
        &self,
        owner_id: BloggerId,
        category: PictureCategory,
    ) -> Result<Option<Picture>>;

    /// Lookup across all owners.
    fn get_by_category(&self, category: PictureCategory) -> Result<Option<Picture>>;

    fn list_by_owner(&self, owner_id: BloggerId, offset: i64, limit: i64) -> Result<Vec<Picture>>;

    fn list_by_owner_and_category(
        &self,
        owner_id: BloggerId,
        category: PictureCategory,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Picture>>;

    fn count_by_owner(&self, owner_id: BloggerId, category: Option<PictureCategory>)
        -> Result<i64>;
}

/// SQLite-backed [`PictureRepository`].
#[derive(Clone)]
pub struct SqlitePictureRepository {
    pool: DbPool,
}

impl SqlitePictureRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl PictureRepository for SqlitePictureRepository {
    fn insert(&self, picture: &NewPicture) -> Result<PictureId> {
        let conn = get_conn(&self.pool)?;
        let created = pictures::create_picture(&conn, picture)?;
        Ok(created.id)
    }

    fn update(&self, picture: &Picture) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        pictures::update_picture(&conn, picture)
    }

    fn delete(&self, id: PictureId) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        pictures::delete_picture(&conn, id)
    }

    fn restore(&self, picture: &Picture) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        pictures::restore_picture(&conn, picture)
    }

    fn get_by_id(&self, id: PictureId) -> Result<Option<Picture>> {
        let conn = get_conn(&self.pool)?;
        pictures::get_picture(&conn, id)
    }

    fn get_by_owner_and_category(
        &self,
        owner_id: BloggerId,
        category: PictureCategory,
    ) -> Result<Option<Picture>> {
        let conn = get_conn(&self.pool)?;
        pictures::get_picture_by_owner_and_category(&conn, owner_id, category)
    }

    fn get_by_category(&self, category: PictureCategory) -> Result<Option<Picture>> {
        let conn = get_conn(&self.pool)?;
        pictures::get_picture_by_category(&conn, category)
    }

    fn list_by_owner(&self, owner_id: BloggerId, offset: i64, limit: i64) -> Result<Vec<Picture>> {
        let conn = get_conn(&self.pool)?;
        pictures::list_pictures_by_owner(&conn, owner_id, offset, limit)
    }

    fn list_by_owner_and_category(
        &self,
        owner_id: BloggerId,
        category: PictureCategory,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Picture>> {
        let conn = get_conn(&self.pool)?;
        pictures::list_pictures_by_owner_and_category(&conn, owner_id, category, offset, limit)
    }

    fn count_by_owner(
        &self,
        owner_id: BloggerId,
        category: Option<PictureCategory>,
    ) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        pictures::count_pictures_by_owner(&conn, owner_id, category)
    }
}
