//! # hand_skeleton
//!
//! Immutable-per-frame skeletal hand snapshots, as delivered by a hand
//! tracking source once per tick:
//!
//! * [`SkeletalHand`] — palm pose + 5 fingers × 4 bones, tagged with
//!   [`Chirality`].
//! * [`Finger`] / [`Bone`] — joint positions and bone orientations.
//! * [`HandRig`] — a posable synthetic hand (curl per finger)
//!   used by the simulator and by tests, so nothing downstream needs
//!   real hardware to exercise the full pipeline.
//!
//! ## Skeletal model
//!
//! | Bone | Matched? | Notes |
//! |---|---|---|
//! | Metacarpal   | no  | present for structural consistency; zero length on the thumb |
//! | Proximal     | yes | also carries the secondary-axis check |
//! | Intermediate | yes | |
//! | Distal       | yes | |
//!
//! The thumb uses the same 4-bone layout as every other finger, with a
//! zero-length metacarpal (the Leap convention).  Matching never looks at
//! the metacarpal, so the uniform layout costs nothing.

pub mod hand;
pub mod rig;

pub use hand::{
    Bone, Chirality, Finger, FingerKind, BoneKind, JointPose, SkeletalHand,
    BONE_COUNT, CHECKED_BONES, FINGER_COUNT,
};
pub use rig::HandRig;
