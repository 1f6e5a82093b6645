//! Gallery service coordinating the file store with picture records.
//!
//! Records are the source of truth. A file without a record is an orphan and
//! may be reclaimed later; a record pointing at a missing file must never be
//! committed. Every operation therefore orders its steps so that:
//!
//! - uploads and moves touch the file store before committing metadata,
//! - deletions commit metadata before removing the file,
//!
//! and when a later step fails, the earlier ones are rolled back through
//! [`Compensation`] values collected along the way.

use gallery_core::{BloggerId, Error, PictureCategory, PictureId, Result, SlotPolicy};
use gallery_db::models::{NewPicture, Picture};
use gallery_db::{PictureRepository, SqlitePictureRepository};

use crate::locks::SlotLocks;
use crate::storage::{title_from_path, FileStore, LocalFileStore};

/// Undo step recorded after a side effect succeeded.
#[derive(Debug, Clone)]
pub enum Compensation {
    /// Put a deleted record back under its id.
    Restore(Picture),
    /// Write the previous field values back over an updated record.
    Revert(Picture),
    /// Move a relocated file back to where `original` expects it.
    MoveBack { original: Picture, moved: Picture },
}

impl Compensation {
    fn apply<R: PictureRepository, F: FileStore>(&self, repo: &R, files: &F) -> Result<()> {
        match self {
            Compensation::Restore(picture) => repo.restore(picture),
            Compensation::Revert(picture) => match repo.update(picture)? {
                0 => Err(Error::not_found("picture", picture.id)),
                _ => Ok(()),
            },
            Compensation::MoveBack { original, moved } => {
                let back = files.relocate(moved, original.category)?;
                if back == original.path {
                    Ok(())
                } else {
                    Err(Error::io(format!(
                        "file of picture {} moved back to {back}, record expects {}",
                        original.id, original.path
                    )))
                }
            }
        }
    }
}

/// High-level gallery operations over a record store and a file store.
pub struct GalleryService<R = SqlitePictureRepository, F = LocalFileStore> {
    repo: R,
    files: F,
    slots: SlotLocks,
}

impl<R: PictureRepository, F: FileStore> GalleryService<R, F> {
    /// Create a new `GalleryService`.
    pub fn new(repo: R, files: F) -> Self {
        Self {
            repo,
            files,
            slots: SlotLocks::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn file_store(&self) -> &F {
        &self.files
    }

    // -----------------------------------------------------------------------
    // Inserts
    // -----------------------------------------------------------------------

    /// Store an uploaded image and create (or, for a unique category,
    /// replace) its record.
    ///
    /// A failed save aborts before any record is written. If the record
    /// cannot be written afterwards the saved file is left as an orphan.
    pub fn insert_from_upload(
        &self,
        data: &[u8],
        owner_id: BloggerId,
        bewrite: Option<&str>,
        category: PictureCategory,
        title: Option<&str>,
    ) -> Result<PictureId> {
        let path = self.files.save(data, owner_id, category)?;
        let title = effective_title(title, &path);

        let result = if category.is_unique() {
            self.update_unique_picture(owner_id, bewrite, &path, category, &title)
        } else {
            self.insert_record(owner_id, &path, bewrite, category, &title)
        };

        if let Err(ref e) = result {
            tracing::warn!("Upload for blogger {owner_id} left orphaned file {path}: {e}");
        }
        result
    }

    /// Create a record for a file that is already in the store.
    ///
    /// Unique categories go through [`update_unique_picture`](Self::update_unique_picture)
    /// so the slot never holds two records.
    pub fn insert_picture(
        &self,
        owner_id: BloggerId,
        path: &str,
        bewrite: Option<&str>,
        category: PictureCategory,
        title: &str,
    ) -> Result<PictureId> {
        if category.is_unique() {
            self.update_unique_picture(owner_id, bewrite, path, category, title)
        } else {
            self.insert_record(owner_id, path, bewrite, category, title)
        }
    }

    /// Point an owner's unique-category slot at `path`.
    ///
    /// Inserts a record when the slot is empty, otherwise overwrites the
    /// holder and refreshes its upload time. The holder's previous file is
    /// not removed. Repeating the call converges on a single record.
    pub fn update_unique_picture(
        &self,
        owner_id: BloggerId,
        bewrite: Option<&str>,
        path: &str,
        category: PictureCategory,
        title: &str,
    ) -> Result<PictureId> {
        if !category.is_unique() {
            return Err(Error::Validation(format!(
                "{category} is not a unique category"
            )));
        }

        self.slots.with_slot(owner_id, category, || {
            let Some(holder) = self.repo.get_by_owner_and_category(owner_id, category)? else {
                return self.insert_record(owner_id, path, bewrite, category, title);
            };

            let replaced = Picture {
                category,
                path: path.to_string(),
                bewrite: bewrite.map(String::from),
                title: title.to_string(),
                uploaded_at: chrono::Utc::now(),
                ..holder.clone()
            };
            self.persist(&replaced)?;

            if holder.path != replaced.path {
                tracing::debug!("Previous {category} file {} is now orphaned", holder.path);
            }
            tracing::info!(
                "Replaced {category} of blogger {owner_id} with picture {} -> {path}",
                replaced.id
            );
            Ok(replaced.id)
        })
    }

    fn insert_record(
        &self,
        owner_id: BloggerId,
        path: &str,
        bewrite: Option<&str>,
        category: PictureCategory,
        title: &str,
    ) -> Result<PictureId> {
        let id = self.repo.insert(&NewPicture {
            owner_id,
            category,
            path: path.to_string(),
            bewrite: bewrite.map(String::from),
            title: title.to_string(),
        })?;
        tracing::info!("Created picture {id} ({category}) for blogger {owner_id} at {path}");
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Updates
    // -----------------------------------------------------------------------

    /// Update caption, title and optionally category of a picture.
    ///
    /// `bewrite` is `None` to keep the caption, `Some(None)` to clear it and
    /// `Some(Some(text))` to replace it. A `None` or blank title keeps the
    /// current one. Only an actual category change moves the file; moving
    /// into a unique category first applies that category's [`SlotPolicy`]
    /// to the owner's current holder.
    pub fn update_picture(
        &self,
        id: PictureId,
        category: Option<PictureCategory>,
        bewrite: Option<Option<&str>>,
        title: Option<&str>,
    ) -> Result<()> {
        let old = self
            .repo
            .get_by_id(id)?
            .ok_or_else(|| Error::not_found("picture", id))?;

        let mut next = old.clone();
        if let Some(bewrite) = bewrite {
            next.bewrite = bewrite.map(String::from);
        }
        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            next.title = title.to_string();
        }

        match category.filter(|c| *c != old.category) {
            None => {
                self.persist(&next)?;
                tracing::info!("Updated picture {id}");
                Ok(())
            }
            Some(target) if target.is_unique() => self
                .slots
                .with_slot(old.owner_id, target, || self.move_and_persist(&old, next, target)),
            Some(target) => self.move_and_persist(&old, next, target),
        }
    }

    fn move_and_persist(&self, old: &Picture, mut next: Picture, target: PictureCategory) -> Result<()> {
        let mut undo = self.vacate_slot(old.owner_id, target)?;

        let new_path = match self.files.relocate(old, target) {
            Ok(path) => path,
            Err(e) => return Err(self.compensate(undo, e)),
        };
        if new_path != old.path {
            undo.push(Compensation::MoveBack {
                original: old.clone(),
                moved: Picture {
                    category: target,
                    path: new_path.clone(),
                    ..old.clone()
                },
            });
        }

        next.category = target;
        next.path = new_path;
        if let Err(e) = self.persist(&next) {
            return Err(self.compensate(undo, e));
        }

        tracing::info!(
            "Moved picture {} from {} to {target} ({})",
            old.id,
            old.category,
            next.path
        );
        Ok(())
    }

    /// Make room in `slot` for another picture of `owner_id`.
    ///
    /// Returns the steps that undo whatever was changed, so a later failure
    /// in the same operation can put the previous holder back.
    fn vacate_slot(&self, owner_id: BloggerId, slot: PictureCategory) -> Result<Vec<Compensation>> {
        let demote_to = match slot.slot_policy() {
            SlotPolicy::Shared => return Ok(Vec::new()),
            SlotPolicy::RejectOccupied => {
                return match self.repo.get_by_owner_and_category(owner_id, slot)? {
                    Some(holder) => Err(Error::Conflict(format!(
                        "{slot} of blogger {owner_id} is held by picture {}",
                        holder.id
                    ))),
                    None => Ok(Vec::new()),
                };
            }
            SlotPolicy::DemoteHolder { to } => to,
        };

        let Some(holder) = self.repo.get_by_owner_and_category(owner_id, slot)? else {
            return Ok(Vec::new());
        };

        let mut demoted = Picture {
            category: demote_to,
            ..holder.clone()
        };
        self.persist(&demoted)?;
        let mut undo = vec![Compensation::Revert(holder.clone())];

        let moved_path = match self.files.relocate(&holder, demote_to) {
            Ok(path) => path,
            Err(e) => return Err(self.compensate(undo, e)),
        };
        if moved_path != holder.path {
            demoted.path = moved_path;
            undo.push(Compensation::MoveBack {
                original: holder.clone(),
                moved: demoted.clone(),
            });
            if let Err(e) = self.persist(&demoted) {
                return Err(self.compensate(undo, e));
            }
        }

        tracing::info!(
            "Demoted picture {} of blogger {owner_id} from {slot} to {demote_to}",
            holder.id
        );
        Ok(undo)
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Delete a picture record and, when asked, its file.
    ///
    /// The two steps form one unit: if the file cannot be removed the record
    /// is restored and the call fails. Pictures in a unique category are
    /// deleted under their slot lock, so a concurrent replacement cannot fill
    /// the slot while the record is briefly gone.
    pub fn delete_picture(&self, id: PictureId, delete_on_disk: bool) -> Result<()> {
        loop {
            let picture = self
                .repo
                .get_by_id(id)?
                .ok_or_else(|| Error::not_found("picture", id))?;

            if !picture.category.is_unique() {
                return self.remove(picture, delete_on_disk);
            }

            let (owner_id, slot) = (picture.owner_id, picture.category);
            let removed = self.slots.with_slot(owner_id, slot, || {
                // Re-read under the lock; the picture may have left the slot.
                match self.repo.get_by_id(id)? {
                    Some(current) if current.category == slot => {
                        self.remove(current, delete_on_disk).map(Some)
                    }
                    Some(_) => Ok(None),
                    None => Err(Error::not_found("picture", id)),
                }
            })?;
            if removed.is_some() {
                return Ok(());
            }
            tracing::debug!("Picture {id} left {slot} before delete; retrying");
        }
    }

    fn remove(&self, picture: Picture, delete_on_disk: bool) -> Result<()> {
        let id = picture.id;
        if self.repo.delete(id)? == 0 {
            return Err(Error::not_found("picture", id));
        }

        if delete_on_disk && !self.files.delete(&picture.path) {
            let cause = Error::io(format!("failed to delete file {}", picture.path));
            return Err(self.compensate(vec![Compensation::Restore(picture)], cause));
        }

        if !delete_on_disk {
            tracing::debug!("Kept file {} of deleted picture {id}", picture.path);
        }
        tracing::info!("Deleted picture {id} of blogger {}", picture.owner_id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get_picture(&self, id: PictureId) -> Result<Option<Picture>> {
        self.repo.get_by_id(id)
    }

    /// Like [`get_picture`](Self::get_picture) but only returns pictures
    /// owned by `owner_id`; anything else reads as absent.
    pub fn get_owned_picture(&self, id: PictureId, owner_id: BloggerId) -> Result<Option<Picture>> {
        Ok(self
            .repo
            .get_by_id(id)?
            .filter(|p| p.owner_id == owner_id))
    }

    /// First picture in `category` across all bloggers.
    pub fn get_picture_by_properties_category(
        &self,
        category: PictureCategory,
    ) -> Result<Option<Picture>> {
        self.repo.get_by_category(category)
    }

    /// A page of a blogger's pictures, optionally within one category.
    ///
    /// An empty gallery and a page past the end both come back empty.
    pub fn list_blogger_pictures(
        &self,
        owner_id: BloggerId,
        category: Option<PictureCategory>,
        offset: i64,
        rows: i64,
    ) -> Result<Vec<Picture>> {
        if offset < 0 || rows < 0 {
            return Err(Error::Validation(format!(
                "invalid page: offset {offset}, rows {rows}"
            )));
        }
        match category {
            Some(c) => self.repo.list_by_owner_and_category(owner_id, c, offset, rows),
            None => self.repo.list_by_owner(owner_id, offset, rows),
        }
    }

    pub fn count_blogger_pictures(
        &self,
        owner_id: BloggerId,
        category: Option<PictureCategory>,
    ) -> Result<i64> {
        self.repo.count_by_owner(owner_id, category)
    }

    // -----------------------------------------------------------------------
    // helpers
    // -----------------------------------------------------------------------

    fn persist(&self, picture: &Picture) -> Result<()> {
        match self.repo.update(picture)? {
            0 => Err(Error::not_found("picture", picture.id)),
            _ => Ok(()),
        }
    }

    /// Apply `steps` newest first and hand back the error to report.
    fn compensate(&self, steps: Vec<Compensation>, cause: Error) -> Error {
        for step in steps.iter().rev() {
            if let Err(e) = step.apply(&self.repo, &self.files) {
                tracing::error!("Rollback step {step:?} failed after `{cause}`: {e}");
                return Error::Internal(format!("{cause}; rollback failed: {e}"));
            }
        }
        if !steps.is_empty() {
            tracing::warn!("Rolled back {} step(s) after: {cause}", steps.len());
        }
        cause
    }
}

fn effective_title(title: Option<&str>, path: &str) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => title_from_path(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use gallery_db::pool::init_memory_pool;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR unit";

    fn service() -> (GalleryService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqlitePictureRepository::new(init_memory_pool().unwrap());
        let files = LocalFileStore::new(dir.path());
        (GalleryService::new(repo, files), dir)
    }

    #[test]
    fn effective_title_prefers_supplied() {
        assert_eq!(effective_title(Some(" Sunset "), "1/default/ab.png"), "Sunset");
        assert_eq!(effective_title(Some("  "), "1/default/ab.png"), "ab");
        assert_eq!(effective_title(None, "1/default/ab.png"), "ab");
    }

    #[test]
    fn upload_derives_title_from_path() {
        let (svc, _dir) = service();
        let id = svc
            .insert_from_upload(PNG, BloggerId::from(1), None, PictureCategory::Public, None)
            .unwrap();
        let pic = svc.get_picture(id).unwrap().unwrap();
        assert_eq!(pic.title, title_from_path(&pic.path));
        assert!(svc.file_store().exists(&pic.path));
    }

    #[test]
    fn slot_replace_rejects_shared_category() {
        let (svc, _dir) = service();
        let result = svc.update_unique_picture(
            BloggerId::from(1),
            None,
            "1/public/a.png",
            PictureCategory::Public,
            "a",
        );
        assert_matches!(result, Err(Error::Validation(_)));
    }

    #[test]
    fn update_without_category_keeps_file() {
        let (svc, _dir) = service();
        let id = svc
            .insert_from_upload(PNG, BloggerId::from(1), Some("old"), PictureCategory::Public, Some("t"))
            .unwrap();
        let before = svc.get_picture(id).unwrap().unwrap();

        svc.update_picture(id, Some(PictureCategory::Public), Some(Some("new")), None)
            .unwrap();

        let after = svc.get_picture(id).unwrap().unwrap();
        assert_eq!(after.path, before.path);
        assert_eq!(after.bewrite.as_deref(), Some("new"));
        assert_eq!(after.title, "t");
    }

    #[test]
    fn update_can_clear_caption() {
        let (svc, _dir) = service();
        let id = svc
            .insert_from_upload(PNG, BloggerId::from(1), Some("old"), PictureCategory::Public, None)
            .unwrap();

        svc.update_picture(id, None, None, None).unwrap();
        assert_eq!(svc.get_picture(id).unwrap().unwrap().bewrite.as_deref(), Some("old"));

        svc.update_picture(id, None, Some(None), None).unwrap();
        assert_eq!(svc.get_picture(id).unwrap().unwrap().bewrite, None);
    }

    #[test]
    fn update_missing_picture_is_not_found() {
        let (svc, _dir) = service();
        let result = svc.update_picture(PictureId::from(404), None, None, None);
        assert_matches!(result, Err(Error::NotFound { .. }));
    }

    #[test]
    fn negative_page_is_rejected() {
        let (svc, _dir) = service();
        let result = svc.list_blogger_pictures(BloggerId::from(1), None, -1, 10);
        assert_matches!(result, Err(Error::Validation(_)));
    }
}
