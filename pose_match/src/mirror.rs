//! Chirality mirroring: derive the opposite-hand twin of a recorded pose.
//!
//! The reflection happens in the hand's *own* reference frame (the palm
//! pose), not in world space, so a mirrored record is correct regardless
//! of where or how the hand was held during recording.  Rotations are
//! conjugated by the reflection matrix rather than negated per Euler
//! axis; the conjugated matrix has determinant +1 and re-extracts as a
//! clean unit quaternion, with no gimbal artifacts.

use hand_skeleton::{Bone, Finger, JointPose, SkeletalHand};
use nalgebra::{Matrix3, Point3, Rotation3, UnitQuaternion, Vector3};

use crate::error::PoseError;
use crate::record::HandPoseRecord;

/// Derive the opposite-chirality record.
///
/// Pure; the source is untouched.  Thresholds and enable flags carry
/// over unchanged (tolerances are chirality-symmetric).  Mirroring is
/// its own inverse within floating-point tolerance.
///
/// Fails with [`PoseError::MalformedPose`] if the source skeleton is
/// unusable (non-finite joints or zero-length checked bones).
pub fn mirror(record: &HandPoseRecord) -> Result<HandPoseRecord, PoseError> {
    record.check_well_formed()?;

    let palm = record.reference().palm;
    let flip = FrameReflection::about_palm_x(&palm);

    let fingers = record.reference().fingers.map(|finger| {
        let bones = finger.bones.map(|b| flip.bone(&b));
        Finger { kind: finger.kind, bones }
    });

    let reference = SkeletalHand {
        chirality: record.chirality().opposite(),
        palm: JointPose {
            position: palm.position,
            rotation: flip.rotation(&palm.rotation),
        },
        fingers,
    };

    Ok(record.with_geometry(record.chirality().opposite(), reference))
}

// ════════════════════════════════════════════════════════════════════════════
// FrameReflection — reflection across the palm-local sagittal plane
// ════════════════════════════════════════════════════════════════════════════

/// Reflection across the plane normal to the palm frame's local X axis.
struct FrameReflection {
    origin: Point3<f32>,
    /// World-space linear part: `R_p · S · R_pᵀ` with `S = diag(−1,1,1)`.
    world:  Matrix3<f32>,
    /// Palm frame rotation matrix and the local mirror, kept separate
    /// for the rotation conjugation.
    frame:  Matrix3<f32>,
    local:  Matrix3<f32>,
}

impl FrameReflection {
    fn about_palm_x(palm: &JointPose) -> Self {
        let frame = *palm.rotation.to_rotation_matrix().matrix();
        let local = Matrix3::from_diagonal(&Vector3::new(-1.0, 1.0, 1.0));
        let world = frame * local * frame.transpose();
        FrameReflection { origin: palm.position, world, frame, local }
    }

    fn point(&self, p: &Point3<f32>) -> Point3<f32> {
        self.origin + self.world * (p - self.origin)
    }

    /// Conjugate a world rotation by the reflection: express it in the
    /// palm frame, sandwich with the local mirror, re-attach the frame.
    fn rotation(&self, q: &UnitQuaternion<f32>) -> UnitQuaternion<f32> {
        let r = q.to_rotation_matrix();
        let local_rot = self.frame.transpose() * r.matrix();
        let mirrored  = self.frame * (self.local * local_rot * self.local);
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(mirrored))
    }

    fn bone(&self, b: &Bone) -> Bone {
        Bone {
            prev_joint: self.point(&b.prev_joint),
            next_joint: self.point(&b.next_joint),
            rotation:   self.rotation(&b.rotation),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
