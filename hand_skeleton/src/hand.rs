//! The skeletal hand data model: chirality, finger/bone enumerations,
//! joint poses, and the per-frame [`SkeletalHand`] snapshot.

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Chirality
// ════════════════════════════════════════════════════════════════════════════

/// Which physical hand a snapshot (or a recorded pose) belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chirality {
    Left,
    Right,
}

impl Chirality {
    /// The opposite hand.
    pub fn opposite(self) -> Self {
        match self {
            Chirality::Left  => Chirality::Right,
            Chirality::Right => Chirality::Left,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Chirality::Left  => "left",
            Chirality::Right => "right",
        }
    }
}

impl std::fmt::Display for Chirality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger / bone enumerations
// ════════════════════════════════════════════════════════════════════════════

/// Number of fingers per hand.
pub const FINGER_COUNT: usize = 5;

/// Number of bones per finger (metacarpal included).
pub const BONE_COUNT: usize = 4;

/// Bones that participate in matching (metacarpal excluded).
pub const CHECKED_BONES: usize = 3;

/// The five fingers, in Leap digit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FingerKind {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl FingerKind {
    /// All fingers in digit order.
    pub const ALL: [FingerKind; FINGER_COUNT] = [
        FingerKind::Thumb,
        FingerKind::Index,
        FingerKind::Middle,
        FingerKind::Ring,
        FingerKind::Pinky,
    ];

    /// Array index (0–4) in digit order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FingerKind::Thumb  => "thumb",
            FingerKind::Index  => "index",
            FingerKind::Middle => "middle",
            FingerKind::Ring   => "ring",
            FingerKind::Pinky  => "pinky",
        }
    }
}

impl std::fmt::Display for FingerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The four bones of a finger, base to tip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoneKind {
    Metacarpal,
    Proximal,
    Intermediate,
    Distal,
}

impl BoneKind {
    /// All bones base to tip.
    pub const ALL: [BoneKind; BONE_COUNT] = [
        BoneKind::Metacarpal,
        BoneKind::Proximal,
        BoneKind::Intermediate,
        BoneKind::Distal,
    ];

    /// Array index (0–3) base to tip.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The bones that participate in matching, base to tip.
    pub const CHECKED: [BoneKind; CHECKED_BONES] = [
        BoneKind::Proximal,
        BoneKind::Intermediate,
        BoneKind::Distal,
    ];

    /// Index into a per-checked-bone table (proximal = 0), or `None`
    /// for the metacarpal.
    pub fn checked_index(self) -> Option<usize> {
        match self {
            BoneKind::Metacarpal   => None,
            BoneKind::Proximal     => Some(0),
            BoneKind::Intermediate => Some(1),
            BoneKind::Distal       => Some(2),
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            BoneKind::Metacarpal   => "metacarpal",
            BoneKind::Proximal     => "proximal",
            BoneKind::Intermediate => "intermediate",
            BoneKind::Distal       => "distal",
        }
    }
}

impl std::fmt::Display for BoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// JointPose / Bone / Finger
// ════════════════════════════════════════════════════════════════════════════

/// A position + orientation pair (used for the palm).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointPose {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl JointPose {
    pub fn identity() -> Self {
        JointPose {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// True if every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.position.coords.iter().all(|c| c.is_finite())
            && self.rotation.coords.iter().all(|c| c.is_finite())
    }
}

/// One bone of one finger: the joint it starts at, the joint it ends at,
/// and its orientation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub prev_joint: Point3<f32>,
    pub next_joint: Point3<f32>,
    pub rotation:   UnitQuaternion<f32>,
}

impl Bone {
    /// Normalised base→tip direction, or `None` for a zero-length bone
    /// (the thumb metacarpal).
    pub fn direction(&self) -> Option<Vector3<f32>> {
        let v = self.next_joint - self.prev_joint;
        let len = v.norm();
        if len < 1e-6 { None } else { Some(v / len) }
    }

    /// Bone length in metres.
    pub fn length(&self) -> f32 {
        (self.next_joint - self.prev_joint).norm()
    }

    /// True if every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.prev_joint.coords.iter().all(|c| c.is_finite())
            && self.next_joint.coords.iter().all(|c| c.is_finite())
            && self.rotation.coords.iter().all(|c| c.is_finite())
    }
}

/// One finger: its kind and its four bones base to tip.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Finger {
    pub kind:  FingerKind,
    pub bones: [Bone; BONE_COUNT],
}

impl Finger {
    /// The bone of the given kind.
    pub fn bone(&self, kind: BoneKind) -> &Bone {
        &self.bones[kind.index()]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SkeletalHand
// ════════════════════════════════════════════════════════════════════════════

/// An immutable-per-frame snapshot of one tracked hand.
///
/// Supplied each tick by a tracking source; matching code never mutates
/// one and never retains it past the tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkeletalHand {
    pub chirality: Chirality,
    pub palm:      JointPose,
    pub fingers:   [Finger; FINGER_COUNT],
}

impl SkeletalHand {
    /// The finger of the given kind.
    pub fn finger(&self, kind: FingerKind) -> &Finger {
        &self.fingers[kind.index()]
    }

    /// True if every joint of every bone is a finite number.
    pub fn is_finite(&self) -> bool {
        self.palm.is_finite()
            && self.fingers.iter().all(|f| f.bones.iter().all(|b| b.is_finite()))
    }

    /// A copy with one bone rotated about `axis` (anchored at the bone's
    /// base joint) by `degrees`.  The rotation is deliberately *not*
    /// propagated to later bones; this deforms exactly one bone, which is
    /// what threshold tests need.
    pub fn with_bone_rotated(
        &self,
        finger:  FingerKind,
        bone:    BoneKind,
        axis:    &Vector3<f32>,
        degrees: f32,
    ) -> SkeletalHand {
        let mut out = self.clone();
        let axis = match Unit::try_new(*axis, 1e-9) {
            Some(a) => a,
            None    => return out,
        };
        let rot = UnitQuaternion::from_axis_angle(&axis, degrees.to_radians());
        let b = &mut out.fingers[finger.index()].bones[bone.index()];
        b.next_joint = b.prev_joint + rot * (b.next_joint - b.prev_joint);
        b.rotation   = rot * b.rotation;
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chirality_opposite_is_involutive() {
        assert_eq!(Chirality::Left.opposite(), Chirality::Right);
        assert_eq!(Chirality::Left.opposite().opposite(), Chirality::Left);
    }

    #[test]
    fn checked_index_skips_metacarpal() {
        assert_eq!(BoneKind::Metacarpal.checked_index(), None);
        assert_eq!(BoneKind::Proximal.checked_index(), Some(0));
        assert_eq!(BoneKind::Distal.checked_index(), Some(2));
    }

    #[test]
    fn zero_length_bone_has_no_direction() {
        let p = Point3::new(0.1, 0.2, 0.3);
        let b = Bone { prev_joint: p, next_joint: p, rotation: UnitQuaternion::identity() };
        assert!(b.direction().is_none());
        assert_eq!(b.length(), 0.0);
    }

    #[test]
    fn direction_is_normalised() {
        let b = Bone {
            prev_joint: Point3::origin(),
            next_joint: Point3::new(0.0, 0.0, 0.04),
            rotation:   UnitQuaternion::identity(),
        };
        let d = b.direction().unwrap();
        assert!((d.norm() - 1.0).abs() < 1e-6);
        assert!((d.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rotate_bone_moves_only_that_bone() {
        let hand = crate::rig::HandRig::new(Chirality::Right).build();
        let x = Vector3::x();
        let bent = hand.with_bone_rotated(FingerKind::Index, BoneKind::Intermediate, &x, 30.0);

        let orig = hand.finger(FingerKind::Index).bone(BoneKind::Intermediate);
        let new  = bent.finger(FingerKind::Index).bone(BoneKind::Intermediate);
        assert_eq!(orig.prev_joint, new.prev_joint);
        assert!((orig.next_joint - new.next_joint).norm() > 1e-4);

        // Distal bone untouched.
        assert_eq!(
            hand.finger(FingerKind::Index).bone(BoneKind::Distal),
            bent.finger(FingerKind::Index).bone(BoneKind::Distal),
        );
        // Other fingers untouched.
        assert_eq!(hand.finger(FingerKind::Middle), bent.finger(FingerKind::Middle));
    }

    #[test]
    fn rotate_bone_preserves_length() {
        let hand = crate::rig::HandRig::new(Chirality::Right).build();
        let bent = hand.with_bone_rotated(FingerKind::Ring, BoneKind::Proximal, &Vector3::y(), 45.0);
        let a = hand.finger(FingerKind::Ring).bone(BoneKind::Proximal).length();
        let b = bent.finger(FingerKind::Ring).bone(BoneKind::Proximal).length();
        assert!((a - b).abs() < 1e-6);
    }
}
