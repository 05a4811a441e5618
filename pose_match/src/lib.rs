//! # pose_match
//!
//! Recognise when a tracked hand matches a previously recorded pose, and
//! mirror recorded poses across chirality:
//!
//! * [`HandPoseRecord`] — a named snapshot of a
//!   [`SkeletalHand`](hand_skeleton::SkeletalHand) plus a
//!   per-bone rotation [`ThresholdTable`] and per-finger enable flags.
//! * [`mirror`] — pure derivation of the opposite-chirality record
//!   (its own inverse, within floating-point tolerance).
//! * [`validate`] — score a live hand against one record, producing a
//!   per-(finger, bone, axis) pass/fail map.
//! * [`PoseDetector`] / [`PoseLibrary`] — evaluate the live hand(s)
//!   against an insertion-ordered library each tick; first pass wins.
//! * [`PoseRecorder`] — capture a live hand into a fresh record.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_skeleton::{Chirality, HandRig};
//! use pose_match::{PoseDetector, PoseLibrary, PoseRecorder, ThresholdTable};
//!
//! let hand = HandRig::new(Chirality::Right).build();
//!
//! let mut recorder = PoseRecorder::new();
//! let record = recorder.capture(&hand, "open_palm", ThresholdTable::uniform(15.0, 15.0));
//!
//! let mut library = PoseLibrary::new();
//! library.insert(record).unwrap();
//!
//! let detector = PoseDetector::new(library);
//! let pass = detector.detect(&[hand]);
//! assert_eq!(pass.matches.len(), 1);
//! assert_eq!(pass.matches[0].id.as_str(), "open_palm_1");
//! ```
//!
//! Detection is frame-local: every tick is decided from that tick's
//! snapshots alone, with no debouncing or hysteresis.

pub mod detect;
pub mod error;
pub mod mirror;
pub mod record;
pub mod validate;

pub use detect::{Detection, DetectionPass, PoseDetector, PoseLibrary};
pub use error::PoseError;
pub use mirror::mirror;
pub use record::{HandPoseRecord, PoseRecorder, RecordId, ThresholdPair, ThresholdTable, MIN_TOLERANCE_DEG};
pub use validate::{validate, Axis, BoneCheck, ValidationResult};
