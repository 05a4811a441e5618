//! A posable synthetic hand rig.
//!
//! [`HandRig`] generates [`SkeletalHand`] snapshots from a small amount of
//! pose state (per-finger curl), so the simulator and the test suite can
//! produce plausible tracking frames without hardware.  A left rig is the
//! exact sagittal mirror of the right rig at the same pose, which is what
//! the mirroring round-trip tests rely on.

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::hand::{
    Bone, BoneKind, Chirality, Finger, FingerKind, JointPose, SkeletalHand,
    BONE_COUNT, FINGER_COUNT,
};

// ── anatomical constants (metres / degrees) ─────────────────────────────────

/// Knuckle x-offset from the palm centre, per finger (right hand).
const BASE_X: [f32; FINGER_COUNT] = [0.035, 0.020, 0.000, -0.020, -0.038];

/// Splay of each finger away from straight ahead, per finger (right hand).
const SPREAD_DEG: [f32; FINGER_COUNT] = [35.0, 8.0, 0.0, -8.0, -18.0];

/// Bone lengths base to tip, per finger.  Thumb metacarpal is zero length
/// (the Leap convention); the thumb "intermediate" stands in for its
/// proximal phalanx so every finger keeps the uniform 4-bone layout.
const BONE_LEN: [[f32; BONE_COUNT]; FINGER_COUNT] = [
    [0.000, 0.046, 0.032, 0.030], // thumb
    [0.066, 0.040, 0.025, 0.018], // index
    [0.064, 0.044, 0.028, 0.019], // middle
    [0.058, 0.040, 0.026, 0.018], // ring
    [0.052, 0.031, 0.020, 0.017], // pinky
];

/// Resting flexion of each bone relative to the previous one.  A real
/// relaxed hand is never perfectly straight; the slight curl also keeps
/// the per-finger comparison plane well defined.
const REST_PITCH_DEG: [f32; BONE_COUNT] = [0.0, 6.0, 8.0, 6.0];

// ════════════════════════════════════════════════════════════════════════════
// HandRig
// ════════════════════════════════════════════════════════════════════════════

/// Pose state for one synthetic hand.
///
/// `curl_deg[finger]` is *extra* flexion on top of the resting pose,
/// distributed over the three phalanges.  0 = relaxed, ~60 = the finger
/// folded toward the palm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandRig {
    pub chirality: Chirality,
    pub curl_deg:  [f32; FINGER_COUNT],
}

impl HandRig {
    /// A relaxed open hand.
    pub fn new(chirality: Chirality) -> Self {
        HandRig { chirality, curl_deg: [0.0; FINGER_COUNT] }
    }

    /// Add `degrees` of curl to one finger (clamped to 0–90 per phalanx).
    pub fn curl(&mut self, finger: FingerKind, degrees: f32) {
        let c = &mut self.curl_deg[finger.index()];
        *c = (*c + degrees).clamp(0.0, 270.0);
    }

    /// Return the finger to the resting pose.
    pub fn flatten(&mut self, finger: FingerKind) {
        self.curl_deg[finger.index()] = 0.0;
    }

    /// Generate the skeletal snapshot for the current pose.
    ///
    /// Palm sits at the origin with identity orientation; fingers point
    /// along +Z and splay on ±X.  The left hand is the +X/−X mirror of
    /// the right hand at the same pose.
    pub fn build(&self) -> SkeletalHand {
        let side = match self.chirality {
            Chirality::Right => 1.0,
            Chirality::Left  => -1.0,
        };

        let fingers = FingerKind::ALL.map(|kind| {
            self.build_finger(kind, side, self.curl_deg[kind.index()])
        });

        SkeletalHand {
            chirality: self.chirality,
            palm: JointPose::identity(),
            fingers,
        }
    }

    fn build_finger(&self, kind: FingerKind, side: f32, curl: f32) -> Finger {
        let fi = kind.index();
        let yaw = (SPREAD_DEG[fi] * side).to_radians();

        // Orientation accumulates down the chain: splay once at the base,
        // then per-bone flexion about the local X axis.
        let mut orient = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw);
        let mut prev   = Point3::new(side * BASE_X[fi], 0.0, 0.015);
        let per_phalanx = curl / 3.0;

        let bones = BoneKind::ALL.map(|bk| {
            let bi = bk.index();
            let pitch = if bk == BoneKind::Metacarpal {
                REST_PITCH_DEG[bi]
            } else {
                REST_PITCH_DEG[bi] + per_phalanx
            };
            orient = orient * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), pitch.to_radians());

            let dir  = orient * Vector3::z();
            let next = prev + dir * BONE_LEN[fi][bi];
            let bone = Bone { prev_joint: prev, next_joint: next, rotation: orient };
            prev = next;
            bone
        });

        Finger { kind, bones }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxed_hand_is_finite_and_forward() {
        let hand = HandRig::new(Chirality::Right).build();
        assert!(hand.is_finite());
        // Index fingertip well in front of the palm.
        let tip = hand.finger(FingerKind::Index).bone(BoneKind::Distal).next_joint;
        assert!(tip.z > 0.08, "tip.z = {}", tip.z);
    }

    #[test]
    fn thumb_metacarpal_is_zero_length() {
        let hand = HandRig::new(Chirality::Right).build();
        let mc = hand.finger(FingerKind::Thumb).bone(BoneKind::Metacarpal);
        assert_eq!(mc.length(), 0.0);
        assert!(mc.direction().is_none());
    }

    #[test]
    fn checked_bones_always_have_direction() {
        let hand = HandRig::new(Chirality::Left).build();
        for finger in &hand.fingers {
            for bk in BoneKind::CHECKED {
                assert!(finger.bone(bk).direction().is_some(), "{} {}", finger.kind, bk);
            }
        }
    }

    #[test]
    fn left_is_the_x_mirror_of_right() {
        let right = HandRig::new(Chirality::Right).build();
        let left  = HandRig::new(Chirality::Left).build();
        for fi in 0..FINGER_COUNT {
            for bi in 0..BONE_COUNT {
                let r = right.fingers[fi].bones[bi];
                let l = left.fingers[fi].bones[bi];
                assert!((r.next_joint.x + l.next_joint.x).abs() < 1e-6);
                assert!((r.next_joint.y - l.next_joint.y).abs() < 1e-6);
                assert!((r.next_joint.z - l.next_joint.z).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn curl_bends_the_finger_toward_the_palm() {
        let mut rig = HandRig::new(Chirality::Right);
        let open_tip = rig.build().finger(FingerKind::Index).bone(BoneKind::Distal).next_joint;
        rig.curl(FingerKind::Index, 120.0);
        let curled_tip = rig.build().finger(FingerKind::Index).bone(BoneKind::Distal).next_joint;
        assert!(curled_tip.z < open_tip.z);
        assert!(curled_tip.y < open_tip.y);
    }

    #[test]
    fn flatten_restores_the_resting_pose() {
        let mut rig = HandRig::new(Chirality::Right);
        let open = rig.build();
        rig.curl(FingerKind::Pinky, 90.0);
        rig.flatten(FingerKind::Pinky);
        assert_eq!(rig.build(), open);
    }
}
