//! # pose_console
//!
//! Console front-end for the hand pose detector.  A tracking source
//! streams [`SkeletalHand`](hand_skeleton::SkeletalHand) frames over a
//! channel; the app state runs one detection tick per frame, announces
//! match transitions, and exposes the authoring operations (record,
//! tune, enable/disable, delete, save/load).
//!
//! ## Commands
//!
//! | Command | Action |
//! |---|---|
//! | `show left` / `show right` | Bring a simulated hand into tracking |
//! | `hide <hand>` | Remove a simulated hand from tracking |
//! | `curl <hand> <finger> [deg]` | Bend a simulated finger |
//! | `flat <hand> <finger>` | Return a finger to the resting pose |
//! | `record <hand> <name>` | Capture the live hand as a new pose |
//! | `list` | Show the pose library |
//! | `finger <id> <finger> on\|off` | Toggle a finger in matching |
//! | `tune <id> <finger> <bone> <p> <s>` | Set one bone's tolerance pair |
//! | `delete <id>` | Remove a pose from the library |
//! | `save <path>` / `load <path>` | Pose library to/from JSON |
//! | `quit` | Exit |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: commands pose a synthetic
//!   [`HandRig`](hand_skeleton::HandRig); no hardware needed.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via
//!   LeapC and converts its frames to skeletal snapshots.

pub mod app;
pub mod source;
pub mod store;
