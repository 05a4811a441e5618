//! The hand pose record: a named reference snapshot plus per-bone
//! rotation tolerances and per-finger enable flags, and the recorder
//! that captures new ones from live hands.

use hand_skeleton::{BoneKind, Chirality, FingerKind, SkeletalHand, CHECKED_BONES, FINGER_COUNT};
use serde::{Deserialize, Serialize};

use crate::error::PoseError;

/// Smallest tolerance a recorder will emit.  A tolerance of 0 would mean
/// "match exactly", which always fails on floating tracking input.
pub const MIN_TOLERANCE_DEG: f32 = 1.0;

// ════════════════════════════════════════════════════════════════════════════
// ThresholdPair / ThresholdTable
// ════════════════════════════════════════════════════════════════════════════

/// Angular tolerances for one checked bone, in degrees.
///
/// Each value is the half-width of the allowed symmetric band around the
/// recorded direction.  The secondary axis only applies to the proximal
/// bone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ThresholdPair {
    pub primary_deg:   f32,
    pub secondary_deg: f32,
}

impl ThresholdPair {
    pub fn new(primary_deg: f32, secondary_deg: f32) -> Self {
        ThresholdPair { primary_deg, secondary_deg }
    }

    /// Clamp both tolerances up to [`MIN_TOLERANCE_DEG`].
    pub fn clamped(self) -> Self {
        ThresholdPair {
            primary_deg:   self.primary_deg.max(MIN_TOLERANCE_DEG),
            secondary_deg: self.secondary_deg.max(MIN_TOLERANCE_DEG),
        }
    }
}

// Deserialization clamps like the constructors do, so hand-edited JSON
// cannot smuggle in sub-minimum tolerances.
impl<'de> Deserialize<'de> for ThresholdPair {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            primary_deg:   f32,
            secondary_deg: f32,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(ThresholdPair::new(raw.primary_deg, raw.secondary_deg).clamped())
    }
}

/// Per-bone tolerances for a whole hand: 5 fingers × 3 checked bones,
/// fixed size so a lookup can never miss.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pairs: [[ThresholdPair; CHECKED_BONES]; FINGER_COUNT],
}

impl ThresholdTable {
    /// The same tolerance pair for every bone of every finger.
    pub fn uniform(primary_deg: f32, secondary_deg: f32) -> Self {
        let pair = ThresholdPair::new(primary_deg, secondary_deg).clamped();
        ThresholdTable { pairs: [[pair; CHECKED_BONES]; FINGER_COUNT] }
    }

    /// Tolerances for one checked bone.  The metacarpal has no entry.
    pub fn get(&self, finger: FingerKind, bone: BoneKind) -> Option<ThresholdPair> {
        bone.checked_index().map(|bi| self.pairs[finger.index()][bi])
    }

    /// Set the tolerances for one checked bone (clamped to the minimum).
    /// Setting the metacarpal is a no-op.
    pub fn set(&mut self, finger: FingerKind, bone: BoneKind, pair: ThresholdPair) {
        if let Some(bi) = bone.checked_index() {
            self.pairs[finger.index()][bi] = pair.clamped();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RecordId
// ════════════════════════════════════════════════════════════════════════════

/// Stable identity of a recorded pose.  Unique within a library.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandPoseRecord
// ════════════════════════════════════════════════════════════════════════════

/// A named, persisted snapshot of a hand pose.
///
/// Created once by [`PoseRecorder::capture`], then immutable except
/// through the explicit threshold / enable edits below.  Every field
/// round-trips losslessly through serde.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandPoseRecord {
    id:         RecordId,
    chirality:  Chirality,
    reference:  SkeletalHand,
    enabled:    [bool; FINGER_COUNT],
    thresholds: ThresholdTable,
}

impl HandPoseRecord {
    /// Assemble a record from parts.  All fingers start enabled.
    pub fn new(id: RecordId, reference: SkeletalHand, thresholds: ThresholdTable) -> Self {
        HandPoseRecord {
            id,
            chirality: reference.chirality,
            reference,
            enabled: [true; FINGER_COUNT],
            thresholds,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn chirality(&self) -> Chirality {
        self.chirality
    }

    pub fn reference(&self) -> &SkeletalHand {
        &self.reference
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Whether the given finger participates in matching.
    pub fn enabled(&self, finger: FingerKind) -> bool {
        self.enabled[finger.index()]
    }

    /// Authoring edit: include or exclude one finger from matching.
    pub fn set_enabled(&mut self, finger: FingerKind, on: bool) {
        self.enabled[finger.index()] = on;
    }

    /// Authoring edit: tune one bone's tolerances.
    pub fn set_threshold(&mut self, finger: FingerKind, bone: BoneKind, pair: ThresholdPair) {
        self.thresholds.set(finger, bone, pair);
    }

    /// Construct the flipped-chirality twin used internally by mirroring.
    pub(crate) fn with_geometry(&self, chirality: Chirality, reference: SkeletalHand) -> Self {
        HandPoseRecord {
            id: self.id.clone(),
            chirality,
            reference,
            enabled: self.enabled,
            thresholds: self.thresholds,
        }
    }

    /// Verify the reference skeleton is usable for matching: finite
    /// joints everywhere, and a direction for every checked bone.
    pub fn check_well_formed(&self) -> Result<(), PoseError> {
        if !self.reference.is_finite() {
            return Err(PoseError::MalformedPose {
                id: self.id.to_string(),
                detail: "non-finite joint data".to_string(),
            });
        }
        for finger in &self.reference.fingers {
            for bk in BoneKind::CHECKED {
                if finger.bone(bk).direction().is_none() {
                    return Err(PoseError::MalformedPose {
                        id: self.id.to_string(),
                        detail: format!("{} {} bone has zero length", finger.kind, bk),
                    });
                }
            }
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PoseRecorder
// ════════════════════════════════════════════════════════════════════════════

/// Captures live hands into fresh [`HandPoseRecord`]s.
///
/// Capture does *not* insert into any library; insertion is a separate,
/// explicit operation.  Countdown / UI behaviour around capture belongs
/// to the caller.
#[derive(Debug, Default)]
pub struct PoseRecorder {
    counter: u32,
}

impl PoseRecorder {
    pub fn new() -> Self {
        PoseRecorder { counter: 0 }
    }

    /// Snapshot `live` verbatim as a new record with a fresh unique id
    /// (`<name_hint>_<n>`) and the given tolerances.
    pub fn capture(
        &mut self,
        live:       &SkeletalHand,
        name_hint:  &str,
        thresholds: ThresholdTable,
    ) -> HandPoseRecord {
        self.counter += 1;
        let id = RecordId::new(format!("{}_{}", name_hint, self.counter));
        HandPoseRecord::new(id, live.clone(), thresholds)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_skeleton::HandRig;

    fn right_hand() -> SkeletalHand {
        HandRig::new(Chirality::Right).build()
    }

    #[test]
    fn capture_assigns_fresh_ids() {
        let mut rec = PoseRecorder::new();
        let a = rec.capture(&right_hand(), "fist", ThresholdTable::uniform(15.0, 15.0));
        let b = rec.capture(&right_hand(), "fist", ThresholdTable::uniform(15.0, 15.0));
        assert_eq!(a.id().as_str(), "fist_1");
        assert_eq!(b.id().as_str(), "fist_2");
    }

    #[test]
    fn capture_snapshots_the_live_hand_verbatim() {
        let hand = right_hand();
        let mut rec = PoseRecorder::new();
        let r = rec.capture(&hand, "open", ThresholdTable::uniform(10.0, 10.0));
        assert_eq!(r.reference(), &hand);
        assert_eq!(r.chirality(), Chirality::Right);
        assert!(FingerKind::ALL.iter().all(|&f| r.enabled(f)));
    }

    #[test]
    fn uniform_table_clamps_to_minimum_tolerance() {
        let t = ThresholdTable::uniform(0.0, 0.5);
        let p = t.get(FingerKind::Index, BoneKind::Proximal).unwrap();
        assert_eq!(p.primary_deg, MIN_TOLERANCE_DEG);
        assert_eq!(p.secondary_deg, MIN_TOLERANCE_DEG);
    }

    #[test]
    fn deserialized_thresholds_are_clamped() {
        let p: ThresholdPair =
            serde_json::from_str(r#"{"primary_deg":-5.0,"secondary_deg":0.25}"#).unwrap();
        assert_eq!(p.primary_deg, MIN_TOLERANCE_DEG);
        assert_eq!(p.secondary_deg, MIN_TOLERANCE_DEG);
    }

    #[test]
    fn metacarpal_has_no_threshold_entry() {
        let t = ThresholdTable::uniform(15.0, 15.0);
        assert!(t.get(FingerKind::Middle, BoneKind::Metacarpal).is_none());
    }

    #[test]
    fn threshold_edit_sticks() {
        let mut rec = PoseRecorder::new();
        let mut r = rec.capture(&right_hand(), "p", ThresholdTable::uniform(15.0, 15.0));
        r.set_threshold(FingerKind::Index, BoneKind::Distal, ThresholdPair::new(30.0, 5.0));
        let p = r.thresholds().get(FingerKind::Index, BoneKind::Distal).unwrap();
        assert_eq!(p.primary_deg, 30.0);
        assert_eq!(p.secondary_deg, 5.0);
    }

    #[test]
    fn well_formed_rig_hand_passes_the_check() {
        let mut rec = PoseRecorder::new();
        let r = rec.capture(&right_hand(), "ok", ThresholdTable::uniform(15.0, 15.0));
        assert!(r.check_well_formed().is_ok());
    }

    #[test]
    fn zero_length_checked_bone_is_malformed() {
        let mut hand = right_hand();
        let b = &mut hand.fingers[FingerKind::Index.index()].bones[BoneKind::Distal.index()];
        b.next_joint = b.prev_joint;
        let r = HandPoseRecord::new(RecordId::from("broken"), hand, ThresholdTable::uniform(15.0, 15.0));
        match r.check_well_formed() {
            Err(PoseError::MalformedPose { id, detail }) => {
                assert_eq!(id, "broken");
                assert!(detail.contains("index distal"));
            }
            other => panic!("expected MalformedPose, got {:?}", other),
        }
    }

    #[test]
    fn record_round_trips_through_serde() {
        let mut rec = PoseRecorder::new();
        let mut r = rec.capture(&right_hand(), "pinch", ThresholdTable::uniform(12.0, 8.0));
        r.set_enabled(FingerKind::Pinky, false);
        r.set_threshold(FingerKind::Thumb, BoneKind::Proximal, ThresholdPair::new(25.0, 20.0));

        let json = serde_json::to_string(&r).unwrap();
        let back: HandPoseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
