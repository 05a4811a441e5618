//! The pose library and the per-tick detector.
//!
//! The library is insertion-ordered; each record carries its precomputed
//! opposite-chirality mirror so a detection pass allocates nothing and
//! never re-derives geometry.  Detection is frame-local: each tick is
//! decided entirely from that tick's snapshots, first passing record in
//! library order wins, and there is no score beyond pass/fail.

use hand_skeleton::{BoneKind, Chirality, FingerKind, SkeletalHand};
use tracing::{debug, warn};

use crate::error::PoseError;
use crate::mirror::mirror;
use crate::record::{HandPoseRecord, RecordId, ThresholdPair};
use crate::validate::{validate, ValidationResult};

// ════════════════════════════════════════════════════════════════════════════
// PoseLibrary
// ════════════════════════════════════════════════════════════════════════════

/// One stored pose with its derived mirror.
#[derive(Clone, Debug)]
struct LibraryEntry {
    record:   HandPoseRecord,
    mirrored: HandPoseRecord,
}

impl LibraryEntry {
    /// The variant whose chirality matches `chirality`.
    fn variant(&self, chirality: Chirality) -> &HandPoseRecord {
        if self.record.chirality() == chirality { &self.record } else { &self.mirrored }
    }
}

/// An ordered collection of pose records (insertion order = authoring
/// order), each paired with its mirror.  Ids are unique.
#[derive(Clone, Debug, Default)]
pub struct PoseLibrary {
    entries: Vec<LibraryEntry>,
}

impl PoseLibrary {
    pub fn new() -> Self {
        PoseLibrary { entries: Vec::new() }
    }

    /// Rebuild a library from persisted records, in order.
    pub fn from_records(records: Vec<HandPoseRecord>) -> Result<Self, PoseError> {
        let mut lib = PoseLibrary::new();
        for r in records {
            lib.insert(r)?;
        }
        Ok(lib)
    }

    /// Append a record, deriving its mirror eagerly.
    ///
    /// Rejected with [`PoseError::DuplicateId`] on an id collision and
    /// with [`PoseError::MalformedPose`] if the skeleton cannot be
    /// mirrored; the library is unchanged either way.
    pub fn insert(&mut self, record: HandPoseRecord) -> Result<(), PoseError> {
        if self.get(record.id()).is_some() {
            return Err(PoseError::DuplicateId { id: record.id().to_string() });
        }
        let mirrored = mirror(&record)?;
        debug!(id = %record.id(), chirality = %record.chirality(), "pose added to library");
        self.entries.push(LibraryEntry { record, mirrored });
        Ok(())
    }

    /// Remove a record by id, returning it if present.
    pub fn remove(&mut self, id: &RecordId) -> Option<HandPoseRecord> {
        let at = self.entries.iter().position(|e| e.record.id() == id)?;
        Some(self.entries.remove(at).record)
    }

    /// Look up a record by id.
    pub fn get(&self, id: &RecordId) -> Option<&HandPoseRecord> {
        self.entries.iter().map(|e| &e.record).find(|r| r.id() == id)
    }

    /// The stored records, in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &HandPoseRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.entries.iter().map(|e| e.record.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Authoring edit: toggle one finger of one record.  Returns false
    /// if the id is unknown.
    pub fn set_enabled(&mut self, id: &RecordId, finger: FingerKind, on: bool) -> bool {
        self.edit(id, |r| r.set_enabled(finger, on))
    }

    /// Authoring edit: tune one bone's tolerances.  Returns false if the
    /// id is unknown.
    pub fn set_threshold(
        &mut self,
        id:     &RecordId,
        finger: FingerKind,
        bone:   BoneKind,
        pair:   ThresholdPair,
    ) -> bool {
        self.edit(id, |r| r.set_threshold(finger, bone, pair))
    }

    /// Apply an edit and re-derive the mirror so both variants stay in
    /// step.  Edits never change geometry, so mirroring a record that
    /// inserted cleanly cannot fail; if it somehow does, the stale
    /// mirror is kept and the record will be skipped during detection.
    fn edit(&mut self, id: &RecordId, apply: impl FnOnce(&mut HandPoseRecord)) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.record.id() == id) else {
            return false;
        };
        apply(&mut entry.record);
        match mirror(&entry.record) {
            Ok(m)  => entry.mirrored = m,
            Err(e) => warn!(id = %id, error = %e, "could not re-derive mirror after edit"),
        }
        true
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Detection / DetectionPass
// ════════════════════════════════════════════════════════════════════════════

/// One matched pose for one live hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub id:        RecordId,
    /// Chirality of the live hand that matched (the mirrored variant of
    /// a record reports the opposite of its source's chirality).
    pub chirality: Chirality,
    /// Full per-check diagnostics of the winning validation.
    pub result:    ValidationResult,
}

/// Everything one detection tick produced: at most one match per live
/// chirality, plus the records that had to be skipped as malformed.
#[derive(Clone, Debug, Default)]
pub struct DetectionPass {
    pub matches: Vec<Detection>,
    pub skipped: Vec<(RecordId, PoseError)>,
}

impl DetectionPass {
    /// The match for the given chirality, if any.
    pub fn for_chirality(&self, chirality: Chirality) -> Option<&Detection> {
        self.matches.iter().find(|d| d.chirality == chirality)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PoseDetector
// ════════════════════════════════════════════════════════════════════════════

/// Evaluates live hands against a [`PoseLibrary`] once per tick.
///
/// Owns the library; the borrow checker keeps authoring edits and
/// in-progress passes mutually exclusive.  Holds no per-tick state:
/// results are returned to the caller, never stashed in a global.
#[derive(Clone, Debug, Default)]
pub struct PoseDetector {
    library: PoseLibrary,
}

impl PoseDetector {
    pub fn new(library: PoseLibrary) -> Self {
        PoseDetector { library }
    }

    /// Read access to the library.
    pub fn library(&self) -> &PoseLibrary {
        &self.library
    }

    /// Authoring access to the library (add / remove / edit).
    pub fn library_mut(&mut self) -> &mut PoseLibrary {
        &mut self.library
    }

    /// Evaluate every live hand independently against the library.
    ///
    /// Per hand: records are tried in insertion order, each via the
    /// variant matching the live chirality; the first record whose
    /// validation passes is the match for that hand.  Malformed records
    /// are skipped and reported, never propagated as a tick failure.
    /// At most one hand per chirality is considered; extras are ignored.
    pub fn detect(&self, hands: &[SkeletalHand]) -> DetectionPass {
        let mut pass = DetectionPass::default();

        for chirality in [Chirality::Left, Chirality::Right] {
            let Some(hand) = hands.iter().find(|h| h.chirality == chirality) else {
                continue;
            };
            if let Some(detection) = self.detect_one(hand, &mut pass.skipped) {
                pass.matches.push(detection);
            }
        }
        pass
    }

    /// Evaluate only the live hand of the given chirality.
    ///
    /// # Errors
    ///
    /// [`PoseError::NoHandData`] if no such hand is present this tick;
    /// callers treat that as "no detection", not as a fault.
    pub fn detect_for(
        &self,
        hands:     &[SkeletalHand],
        chirality: Chirality,
    ) -> Result<Option<Detection>, PoseError> {
        let hand = hands
            .iter()
            .find(|h| h.chirality == chirality)
            .ok_or(PoseError::NoHandData { chirality })?;
        let mut skipped = Vec::new();
        Ok(self.detect_one(hand, &mut skipped))
    }

    fn detect_one(
        &self,
        hand:    &SkeletalHand,
        skipped: &mut Vec<(RecordId, PoseError)>,
    ) -> Option<Detection> {
        for entry in &self.library.entries {
            let candidate = entry.variant(hand.chirality);
            match validate(hand, candidate) {
                Ok(result) if result.passed => {
                    return Some(Detection {
                        id:        candidate.id().clone(),
                        chirality: hand.chirality,
                        result,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(id = %candidate.id(), error = %e, "skipping malformed pose");
                    skipped.push((candidate.id().clone(), e));
                }
            }
        }
        None
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
