use crate::entity::EntityKind;
use crate::ids::{LegacyId, NewId};

/// Outcome of translating one legacy foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The legacy field was null: nothing to resolve, nothing is wrong.
    Absent,
    Resolved(NewId),
    /// A legacy id was given but no destination row has claimed it yet.
    Unresolved { kind: EntityKind, legacy_id: LegacyId },
}

impl Resolution {
    /// The new id, if resolved. `Absent` and `Unresolved` both yield `None`.
    #[must_use]
    pub fn new_id(self) -> Option<NewId> {
        match self {
            Self::Resolved(id) => Some(id),
            Self::Absent | Self::Unresolved { .. } => None,
        }
    }

    #[must_use]
    pub fn is_unresolved(self) -> bool {
        matches!(self, Self::Unresolved { .. })
    }
}
