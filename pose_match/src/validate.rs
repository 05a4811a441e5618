//! Score a live hand against one recorded pose.
//!
//! Per enabled finger, each non-metacarpal bone's direction is compared
//! with the recorded direction as a signed angle projected into a
//! comparison plane.  That plane is built from three joints of the
//! *recorded* finger (proximal base, proximal tip, intermediate tip), so
//! it stays fixed per record and does not drift with the live hand.
//! The proximal bone gets a second check on the perpendicular axis,
//! which is how palm-plane splay is constrained.

use hand_skeleton::{BoneKind, FingerKind, Finger, SkeletalHand, FINGER_COUNT};
use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::error::PoseError;
use crate::record::HandPoseRecord;

// ════════════════════════════════════════════════════════════════════════════
// Axis / BoneCheck / ValidationResult
// ════════════════════════════════════════════════════════════════════════════

/// Which tolerance band a check was made against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// In-plane deviation, checked on every non-metacarpal bone.
    Primary,
    /// Perpendicular deviation, checked on the proximal bone only.
    Secondary,
}

/// One angular comparison: which bone, which axis, how far off, and
/// whether it stayed inside the band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneCheck {
    pub finger:        FingerKind,
    pub bone:          BoneKind,
    pub axis:          Axis,
    /// Signed deviation in degrees, range (−180, 180].
    pub deviation_deg: f32,
    /// The half-width the deviation was compared against.
    pub threshold_deg: f32,
    pub passed:        bool,
}

/// The full outcome of validating one live hand against one record.
///
/// Recomputed every tick, never persisted.  The per-check detail exists
/// for diagnostics and gizmo-style consumers; the overall flag is what
/// detection uses.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationResult {
    /// True iff every enabled finger passed all its checks.
    pub passed:        bool,
    /// Per-finger outcome; disabled fingers count as passed.
    pub finger_passed: [bool; FINGER_COUNT],
    /// Every individual check that was made, in finger/bone order.
    pub checks:        Vec<BoneCheck>,
}

impl ValidationResult {
    /// The checks that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BoneCheck> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// validate
// ════════════════════════════════════════════════════════════════════════════

/// Compare `live` against `record`, bone by bone.
///
/// Pure and deterministic: identical inputs always produce identical
/// results, and neither argument is mutated.
///
/// # Errors
///
/// * [`PoseError::NoHandData`] — `live` is the wrong chirality for this
///   record; the caller should have picked the record's mirror instead.
/// * [`PoseError::MalformedPose`] — the record's skeleton cannot produce
///   a comparison plane or bone direction.
pub fn validate(live: &SkeletalHand, record: &HandPoseRecord) -> Result<ValidationResult, PoseError> {
    if live.chirality != record.chirality() {
        return Err(PoseError::NoHandData { chirality: record.chirality() });
    }
    record.check_well_formed()?;

    let mut checks = Vec::with_capacity(FINGER_COUNT * 4);
    let mut finger_passed = [true; FINGER_COUNT];

    for kind in FingerKind::ALL {
        if !record.enabled(kind) {
            continue;
        }

        let reference = record.reference().finger(kind);
        let normal = finger_plane_normal(reference).ok_or_else(|| PoseError::MalformedPose {
            id:     record.id().to_string(),
            detail: format!("{} finger joints are collinear, no comparison plane", kind),
        })?;

        let mut all_passed = true;
        for bk in BoneKind::CHECKED {
            // check_well_formed guarantees a direction for every checked
            // reference bone.
            let Some(ref_dir) = reference.bone(bk).direction() else { continue };
            let live_dir = live.finger(kind).bone(bk).direction();

            let pair = match record.thresholds().get(kind, bk) {
                Some(p) => p,
                None    => continue,
            };

            let primary = projected_deviation(&normal, &ref_dir, live_dir.as_ref());
            let check = BoneCheck {
                finger:        kind,
                bone:          bk,
                axis:          Axis::Primary,
                deviation_deg: primary,
                threshold_deg: pair.primary_deg,
                passed:        primary.abs() <= pair.primary_deg,
            };
            all_passed &= check.passed;
            checks.push(check);

            if bk == BoneKind::Proximal {
                let axis = secondary_axis(&normal, &ref_dir);
                let secondary = projected_deviation(&axis, &ref_dir, live_dir.as_ref());
                let check = BoneCheck {
                    finger:        kind,
                    bone:          bk,
                    axis:          Axis::Secondary,
                    deviation_deg: secondary,
                    threshold_deg: pair.secondary_deg,
                    passed:        secondary.abs() <= pair.secondary_deg,
                };
                all_passed &= check.passed;
                checks.push(check);
            }
        }
        finger_passed[kind.index()] = all_passed;
    }

    let passed = finger_passed.iter().all(|&p| p);
    Ok(ValidationResult { passed, finger_passed, checks })
}

// ════════════════════════════════════════════════════════════════════════════
// Geometry helpers
// ════════════════════════════════════════════════════════════════════════════

/// Normal of the comparison plane through the recorded finger's proximal
/// base, proximal tip, and intermediate tip.  `None` if those joints are
/// collinear.
pub fn finger_plane_normal(finger: &Finger) -> Option<Unit<Vector3<f32>>> {
    let proximal     = finger.bone(BoneKind::Proximal);
    let intermediate = finger.bone(BoneKind::Intermediate);
    let a = proximal.prev_joint;
    let b = proximal.next_joint;
    let c = intermediate.next_joint;
    Unit::try_new((b - a).cross(&(c - a)), 1e-9)
}

/// The secondary comparison axis: the plane normal rotated 90° about the
/// recorded bone direction.
pub fn secondary_axis(normal: &Unit<Vector3<f32>>, bone_dir: &Vector3<f32>) -> Unit<Vector3<f32>> {
    let rot = match Unit::try_new(*bone_dir, 1e-9) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, 90f32.to_radians()),
        None       => UnitQuaternion::identity(),
    };
    Unit::new_normalize(rot * normal.into_inner())
}

/// Signed angle (degrees, (−180, 180]) from `reference` to `live` after
/// projecting both into the plane perpendicular to `axis`.
///
/// A missing live direction, or a live direction parallel to the axis,
/// cannot be compared; it reports the worst case (180°) so the check
/// fails unless the band covers everything.
fn projected_deviation(
    axis:      &Unit<Vector3<f32>>,
    reference: &Vector3<f32>,
    live:      Option<&Vector3<f32>>,
) -> f32 {
    let Some(live) = live else { return 180.0 };
    let n = axis.as_ref();

    let ref_p  = reference - n * reference.dot(n);
    let live_p = live - n * live.dot(n);
    if ref_p.norm() < 1e-6 || live_p.norm() < 1e-6 {
        return 180.0;
    }

    let sin = n.dot(&ref_p.cross(&live_p));
    let cos = ref_p.dot(&live_p);
    sin.atan2(cos).to_degrees()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PoseRecorder, ThresholdPair, ThresholdTable};
    use approx::assert_relative_eq;
    use hand_skeleton::{Chirality, HandRig};

    const T: f32 = 15.0;

    fn captured(rig: &HandRig) -> HandPoseRecord {
        PoseRecorder::new().capture(&rig.build(), "v", ThresholdTable::uniform(T, T))
    }

    #[test]
    fn identical_hand_passes_every_check() {
        let rig = HandRig::new(Chirality::Right);
        let record = captured(&rig);
        let result = validate(&rig.build(), &record).unwrap();
        assert!(result.passed);
        assert!(result.checks.iter().all(|c| c.passed));
        // 5 fingers × (3 primary + 1 proximal secondary)
        assert_eq!(result.checks.len(), 20);
    }

    #[test]
    fn identical_hand_passes_for_any_nonnegative_thresholds() {
        let rig = HandRig::new(Chirality::Right);
        let hand = rig.build();
        let record = PoseRecorder::new().capture(&hand, "tight", ThresholdTable::uniform(0.0, 0.0));
        let result = validate(&hand, &record).unwrap();
        assert!(result.passed);
        for c in &result.checks {
            assert_relative_eq!(c.deviation_deg, 0.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn wrong_chirality_is_no_hand_data() {
        let record = captured(&HandRig::new(Chirality::Right));
        let left = HandRig::new(Chirality::Left).build();
        assert_eq!(
            validate(&left, &record),
            Err(PoseError::NoHandData { chirality: Chirality::Right }),
        );
    }

    #[test]
    fn primary_deviation_matches_the_applied_rotation() {
        let rig = HandRig::new(Chirality::Right);
        let record = captured(&rig);
        let normal = finger_plane_normal(record.reference().finger(FingerKind::Index)).unwrap();

        let live = rig.build().with_bone_rotated(
            FingerKind::Index, BoneKind::Intermediate, &normal, 10.0,
        );
        let result = validate(&live, &record).unwrap();
        assert!(result.passed); // 10° is inside the 15° band

        let check = result.checks.iter()
            .find(|c| c.finger == FingerKind::Index
                && c.bone == BoneKind::Intermediate
                && c.axis == Axis::Primary)
            .unwrap();
        assert_relative_eq!(check.deviation_deg.abs(), 10.0, epsilon = 0.1);
    }

    #[test]
    fn over_threshold_bone_fails_exactly_that_check() {
        let rig = HandRig::new(Chirality::Right);
        let record = captured(&rig);
        let normal = finger_plane_normal(record.reference().finger(FingerKind::Index)).unwrap();

        // threshold + ε on the primary axis of one bone
        let live = rig.build().with_bone_rotated(
            FingerKind::Index, BoneKind::Proximal, &normal, T + 5.0,
        );
        let result = validate(&live, &record).unwrap();
        assert!(!result.passed);
        assert!(!result.finger_passed[FingerKind::Index.index()]);

        let failures: Vec<_> = result.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].finger, FingerKind::Index);
        assert_eq!(failures[0].bone, BoneKind::Proximal);
        assert_eq!(failures[0].axis, Axis::Primary);

        // Every other finger still passes.
        for kind in [FingerKind::Thumb, FingerKind::Middle, FingerKind::Ring, FingerKind::Pinky] {
            assert!(result.finger_passed[kind.index()], "{} should pass", kind);
        }
    }

    #[test]
    fn disabled_finger_passes_regardless_of_deviation() {
        let rig = HandRig::new(Chirality::Right);
        let mut record = captured(&rig);
        record.set_enabled(FingerKind::Index, false);

        let mut bent = rig;
        bent.curl(FingerKind::Index, 150.0);
        let result = validate(&bent.build(), &record).unwrap();
        assert!(result.passed);
        assert!(result.checks.iter().all(|c| c.finger != FingerKind::Index));
    }

    #[test]
    fn curled_finger_fails_against_an_open_record() {
        let rig = HandRig::new(Chirality::Right);
        let record = captured(&rig);

        let mut bent = rig;
        bent.curl(FingerKind::Middle, 120.0);
        let result = validate(&bent.build(), &record).unwrap();
        assert!(!result.passed);
        assert!(!result.finger_passed[FingerKind::Middle.index()]);
        assert!(result.failures().all(|c| c.finger == FingerKind::Middle));
    }

    #[test]
    fn secondary_axis_catches_splay_on_the_proximal_bone() {
        let rig = HandRig::new(Chirality::Right);
        let mut record = captured(&rig);
        // Widen every primary band so only the secondary check can fail.
        for bk in BoneKind::CHECKED {
            record.set_threshold(FingerKind::Index, bk, ThresholdPair::new(90.0, T));
        }

        let record_ref = record.reference().finger(FingerKind::Index);
        let normal = finger_plane_normal(record_ref).unwrap();
        let dir = record_ref.bone(BoneKind::Proximal).direction().unwrap();
        let axis = secondary_axis(&normal, &dir);

        let live = rig.build().with_bone_rotated(
            FingerKind::Index, BoneKind::Proximal, &axis, T + 10.0,
        );
        let result = validate(&live, &record).unwrap();
        assert!(!result.passed);
        let failures: Vec<_> = result.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].axis, Axis::Secondary);
        assert_eq!(failures[0].bone, BoneKind::Proximal);
    }

    #[test]
    fn deviation_is_signed() {
        let rig = HandRig::new(Chirality::Right);
        let record = captured(&rig);
        let normal = finger_plane_normal(record.reference().finger(FingerKind::Ring)).unwrap();

        let plus  = rig.build().with_bone_rotated(FingerKind::Ring, BoneKind::Distal, &normal, 8.0);
        let minus = rig.build().with_bone_rotated(FingerKind::Ring, BoneKind::Distal, &normal, -8.0);

        let dev = |hand: &SkeletalHand| {
            validate(hand, &record).unwrap().checks.iter()
                .find(|c| c.finger == FingerKind::Ring && c.bone == BoneKind::Distal)
                .unwrap()
                .deviation_deg
        };
        let (dp, dm) = (dev(&plus), dev(&minus));
        assert!(dp * dm < 0.0, "expected opposite signs, got {} and {}", dp, dm);
        assert_relative_eq!(dp.abs(), 8.0, epsilon = 0.1);
        assert_relative_eq!(dm.abs(), 8.0, epsilon = 0.1);
    }

    #[test]
    fn malformed_record_is_reported_not_crashed() {
        let mut hand = HandRig::new(Chirality::Right).build();
        let b = &mut hand.fingers[FingerKind::Thumb.index()].bones[BoneKind::Intermediate.index()];
        b.next_joint = b.prev_joint;
        let record = HandPoseRecord::new("bad".into(), hand, ThresholdTable::uniform(T, T));

        let live = HandRig::new(Chirality::Right).build();
        assert!(matches!(validate(&live, &record), Err(PoseError::MalformedPose { .. })));
    }
}
