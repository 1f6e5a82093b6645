//! Picture categories and the slot rules attached to them.
//!
//! Categories serialize in lowercase and are persisted by their stable
//! integer [`code`](PictureCategory::code). Unique categories model slots
//! (one avatar, one banner per blogger); what happens to the current holder
//! when another picture is moved into a slot is decided by [`SlotPolicy`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// SlotPolicy
// ---------------------------------------------------------------------------

/// What a category does with its current holder when another picture of the
/// same owner is moved into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Not a slot; any number of pictures may share the category.
    Shared,
    /// Move the current holder to `to` before the newcomer takes the slot.
    DemoteHolder { to: PictureCategory },
    /// Refuse the move while the slot is occupied.
    RejectOccupied,
}

// ---------------------------------------------------------------------------
// PictureCategory
// ---------------------------------------------------------------------------

/// Closed set of gallery categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PictureCategory {
    Default,
    Private,
    Public,
    Avatar,
    Banner,
}

impl PictureCategory {
    /// The neutral category pictures are demoted to.
    pub const DEFAULT: Self = Self::Default;

    /// The blogger avatar slot.
    pub const AVATAR: Self = Self::Avatar;

    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Private,
        Self::Public,
        Self::Avatar,
        Self::Banner,
    ];

    /// Stable integer code used by the record store.
    pub fn code(&self) -> i64 {
        match self {
            Self::Default => 0,
            Self::Private => 1,
            Self::Public => 2,
            Self::Avatar => 3,
            Self::Banner => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Slot behaviour of this category.
    pub fn slot_policy(&self) -> SlotPolicy {
        match self {
            Self::Default | Self::Private | Self::Public => SlotPolicy::Shared,
            Self::Avatar => SlotPolicy::DemoteHolder { to: Self::DEFAULT },
            Self::Banner => SlotPolicy::RejectOccupied,
        }
    }

    /// Whether at most one picture per owner may hold this category.
    pub fn is_unique(&self) -> bool {
        self.slot_policy() != SlotPolicy::Shared
    }

    /// Lowercase name, also used as the on-disk directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Private => "private",
            Self::Public => "public",
            Self::Avatar => "avatar",
            Self::Banner => "banner",
        }
    }
}

impl fmt::Display for PictureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PictureCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| format!("unknown picture category: {s}"))
    }
}
