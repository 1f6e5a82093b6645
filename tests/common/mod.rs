//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires a [`GalleryService`] to an in-memory
//! database and a temporary picture directory. Both stores are wrapped so
//! tests can make individual operations fail and count file store calls.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use gallery::{FileStore, GalleryService, LocalFileStore};
use gallery_core::{BloggerId, Error, PictureCategory, PictureId, Result};
use gallery_db::models::{NewPicture, Picture};
use gallery_db::pool::init_memory_pool;
use gallery_db::{PictureRepository, SqlitePictureRepository};
use parking_lot::Mutex;
use tempfile::TempDir;

/// Minimal payload recognised as PNG, made distinct by `seed`.
pub fn png(seed: u8) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
    data.extend_from_slice(&[seed; 16]);
    data
}

// ---------------------------------------------------------------------------
// FlakyFileStore
// ---------------------------------------------------------------------------

/// Holds the next [`FileStore::delete`] call open until released.
pub struct DeleteGate {
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Handles the test keeps to follow a [`DeleteGate`].
pub struct GateControl {
    pub entered: Receiver<()>,
    pub release: Sender<()>,
}

/// [`LocalFileStore`] with switchable failures and a call counter.
pub struct FlakyFileStore {
    pub inner: LocalFileStore,
    pub fail_delete: AtomicBool,
    /// Relocations of this picture fail.
    pub fail_relocate_for: Mutex<Option<PictureId>>,
    pub delete_gate: Mutex<Option<DeleteGate>>,
    pub calls: AtomicUsize,
}

impl FlakyFileStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next delete signal `entered` and block until `release`.
    pub fn gate_next_delete(&self) -> GateControl {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.delete_gate.lock() = Some(DeleteGate {
            entered: entered_tx,
            release: release_rx,
        });
        GateControl {
            entered: entered_rx,
            release: release_tx,
        }
    }
}

impl FileStore for FlakyFileStore {
    fn save(&self, data: &[u8], owner_id: BloggerId, category: PictureCategory) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.save(data, owner_id, category)
    }

    fn delete(&self, path: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.delete_gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.recv();
        }
        if self.fail_delete.load(Ordering::SeqCst) {
            return false;
        }
        self.inner.delete(path)
    }

    fn relocate(&self, picture: &Picture, category: PictureCategory) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_relocate_for.lock() == Some(picture.id) {
            return Err(Error::io(format!(
                "injected move failure for picture {} into {category}",
                picture.id
            )));
        }
        self.inner.relocate(picture, category)
    }

    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }
}

// ---------------------------------------------------------------------------
// FlakyRepository
// ---------------------------------------------------------------------------

/// [`SqlitePictureRepository`] whose writes can be made to fail.
pub struct FlakyRepository {
    pub inner: SqlitePictureRepository,
    pub fail_insert: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_restore: AtomicBool,
    /// Updates still allowed to succeed; once spent every update fails.
    pub update_budget: Mutex<Option<usize>>,
}

impl PictureRepository for FlakyRepository {
    fn insert(&self, picture: &NewPicture) -> Result<PictureId> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(Error::persist("injected insert failure"));
        }
        self.inner.insert(picture)
    }

    fn update(&self, picture: &Picture) -> Result<usize> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Error::persist("injected update failure"));
        }
        if let Some(left) = self.update_budget.lock().as_mut() {
            if *left == 0 {
                return Err(Error::persist("injected update failure"));
            }
            *left -= 1;
        }
        self.inner.update(picture)
    }

    fn delete(&self, id: PictureId) -> Result<usize> {
        self.inner.delete(id)
    }

    fn restore(&self, picture: &Picture) -> Result<()> {
        if self.fail_restore.load(Ordering::SeqCst) {
            return Err(Error::persist("injected restore failure"));
        }
        self.inner.restore(picture)
    }

    fn get_by_id(&self, id: PictureId) -> Result<Option<Picture>> {
        self.inner.get_by_id(id)
    }

    fn get_by_owner_and_category(
        &self,
        owner_id: BloggerId,
        category: PictureCategory,
    ) -> Result<Option<Picture>> {
        self.inner.get_by_owner_and_category(owner_id, category)
    }

    fn get_by_category(&self, category: PictureCategory) -> Result<Option<Picture>> {
        self.inner.get_by_category(category)
    }

    fn list_by_owner(&self, owner_id: BloggerId, offset: i64, limit: i64) -> Result<Vec<Picture>> {
        self.inner.list_by_owner(owner_id, offset, limit)
    }

    fn list_by_owner_and_category(
        &self,
        owner_id: BloggerId,
        category: PictureCategory,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Picture>> {
        self.inner
            .list_by_owner_and_category(owner_id, category, offset, limit)
    }

    fn count_by_owner(
        &self,
        owner_id: BloggerId,
        category: Option<PictureCategory>,
    ) -> Result<i64> {
        self.inner.count_by_owner(owner_id, category)
    }
}

// ---------------------------------------------------------------------------
// TestHarness
// ---------------------------------------------------------------------------

/// Test harness wrapping a [`GalleryService`] over flaky stores.
pub struct TestHarness {
    pub svc: GalleryService<FlakyRepository, FlakyFileStore>,
    pub dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with an in-memory DB and empty picture directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let pool = init_memory_pool().expect("failed to create in-memory pool");

        let repo = FlakyRepository {
            inner: SqlitePictureRepository::new(pool),
            fail_insert: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            fail_restore: AtomicBool::new(false),
            update_budget: Mutex::new(None),
        };
        let files = FlakyFileStore {
            inner: LocalFileStore::new(dir.path()),
            fail_delete: AtomicBool::new(false),
            fail_relocate_for: Mutex::new(None),
            delete_gate: Mutex::new(None),
            calls: AtomicUsize::new(0),
        };

        Self {
            svc: GalleryService::new(repo, files),
            dir,
        }
    }

    pub fn files(&self) -> &FlakyFileStore {
        self.svc.file_store()
    }

    pub fn repo(&self) -> &FlakyRepository {
        self.svc.repository()
    }

    /// Upload a distinct PNG and return the created record.
    pub fn upload(&self, owner: i64, category: PictureCategory, seed: u8) -> Picture {
        let id = self
            .svc
            .insert_from_upload(&png(seed), BloggerId::from(owner), None, category, None)
            .expect("upload failed");
        self.get(id)
    }

    pub fn get(&self, id: PictureId) -> Picture {
        self.svc
            .get_picture(id)
            .expect("lookup failed")
            .expect("picture missing")
    }

    pub fn in_category(&self, owner: i64, category: PictureCategory) -> Vec<Picture> {
        self.svc
            .list_blogger_pictures(BloggerId::from(owner), Some(category), 0, 100)
            .expect("listing failed")
    }

    /// Number of regular files anywhere under the picture directory.
    pub fn file_count(&self) -> usize {
        walkdir::WalkDir::new(self.dir.path())
            .into_iter()
            .flatten()
            .filter(|e| e.file_type().is_file())
            .count()
    }
}
