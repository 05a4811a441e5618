//! Error kinds for recording, mirroring, validation, and library edits.
//!
//! Nothing here ever crashes a detection pass: a malformed record is
//! skipped for that tick and surfaced to the authoring side, and a
//! missing live hand is "no detection", not a failure.

use hand_skeleton::Chirality;
use thiserror::Error;

/// Everything that can go wrong in the pose-matching core.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PoseError {
    /// A record's skeleton is unusable (missing bone directions,
    /// non-finite joints, degenerate comparison plane).  Fatal for that
    /// record only.
    #[error("pose \"{id}\" is malformed: {detail}")]
    MalformedPose { id: String, detail: String },

    /// No live hand of the requested chirality this tick.  Recoverable;
    /// callers treat it as "no detection".
    #[error("no live {chirality} hand this tick")]
    NoHandData { chirality: Chirality },

    /// Library insertion with a colliding id.  The library is unchanged.
    #[error("a pose named \"{id}\" is already in the library")]
    DuplicateId { id: String },
}
