//! Tracking sources — both LeapMotion hardware and the keyboard-posed
//! simulator.
//!
//! The public interface is [`TrackingFrame`] delivered over a `mpsc`
//! channel.  Consumers don't need to know whether frames came from real
//! hardware or the simulator.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use hand_skeleton::{Chirality, FingerKind, HandRig, SkeletalHand};

// ════════════════════════════════════════════════════════════════════════════
// TrackingFrame
// ════════════════════════════════════════════════════════════════════════════

/// One tick of tracking data: zero, one, or two hands.
#[derive(Clone, Debug, Default)]
pub struct TrackingFrame {
    pub hands: Vec<SkeletalHand>,
}

impl TrackingFrame {
    /// The live hand of the given chirality, if tracked this tick.
    pub fn hand(&self, chirality: Chirality) -> Option<&SkeletalHand> {
        self.hands.iter().find(|h| h.chirality == chirality)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`TrackingFrame`]s over a channel.
pub trait TrackingSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>);
}

/// Spawn a tracking source on its own thread and return the receiving end.
pub fn spawn_tracking_source<S: TrackingSource>(source: S) -> Receiver<TrackingFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimSource — keyboard-posed rig (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Pose commands sent to the simulator from the console loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimCommand {
    /// Bring a hand into tracking (relaxed open pose).
    Show(Chirality),
    /// Drop a hand from tracking.
    Hide(Chirality),
    /// Add curl to one finger of one simulated hand.
    Curl(Chirality, FingerKind, f32),
    /// Return a finger to the resting pose.
    Flatten(Chirality, FingerKind),
    /// Stop the source thread.
    Quit,
}

/// Tracking source backed by two posable [`HandRig`]s.
///
/// Each command updates the rig state and emits one fresh frame, so the
/// consumer sees exactly one tick per pose change — convenient for a
/// console loop (no 90 Hz stream to drain) and deterministic for tests.
pub struct SimSource {
    pub rx: Receiver<SimCommand>,
}

/// Rig state behind the simulator; factored out so tests can drive it
/// without threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimHands {
    left:  Option<HandRig>,
    right: Option<HandRig>,
}

impl SimHands {
    fn slot(&mut self, chirality: Chirality) -> &mut Option<HandRig> {
        match chirality {
            Chirality::Left  => &mut self.left,
            Chirality::Right => &mut self.right,
        }
    }

    /// Apply one command.  Returns false for [`SimCommand::Quit`].
    pub fn apply(&mut self, cmd: SimCommand) -> bool {
        match cmd {
            SimCommand::Show(c) => {
                self.slot(c).get_or_insert_with(|| HandRig::new(c));
            }
            SimCommand::Hide(c) => {
                *self.slot(c) = None;
            }
            SimCommand::Curl(c, finger, deg) => {
                if let Some(rig) = self.slot(c).as_mut() {
                    rig.curl(finger, deg);
                }
            }
            SimCommand::Flatten(c, finger) => {
                if let Some(rig) = self.slot(c).as_mut() {
                    rig.flatten(finger);
                }
            }
            SimCommand::Quit => return false,
        }
        true
    }

    /// Build the tracking frame for the current pose state.
    pub fn frame(&self) -> TrackingFrame {
        let hands = [self.left, self.right]
            .iter()
            .flatten()
            .map(|rig| rig.build())
            .collect();
        TrackingFrame { hands }
    }
}

impl TrackingSource for SimSource {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>) {
        let mut hands = SimHands::default();
        for cmd in self.rx {
            if !hands.apply(cmd) {
                return;
            }
            if tx.send(hands.frame()).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Tracking source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library
/// installed.  Each tracking event is converted to a [`TrackingFrame`];
/// palm orientation is reconstructed from the middle-finger metacarpal
/// so the conversion only relies on joint positions.
#[cfg(feature = "leap")]
pub struct LeapSource;

#[cfg(feature = "leap")]
impl TrackingSource for LeapSource {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                tracing::error!(error = ?e, "failed to create LeapC connection");
                return;
            }
        };
        if let Err(e) = connection.open() {
            tracing::error!(error = ?e, "failed to open LeapMotion device");
            return;
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands = frame
                    .hands()
                    .filter_map(|h| convert::hand(&h))
                    .collect();
                if tx.send(TrackingFrame { hands }).is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(feature = "leap")]
mod convert {
    //! leaprs → hand_skeleton conversion.  Leap reports millimetres;
    //! skeletal snapshots use metres.

    use hand_skeleton::{
        Bone, BoneKind, Chirality, Finger, FingerKind, JointPose, SkeletalHand,
    };
    use nalgebra::{Point3, UnitQuaternion, Vector3};

    const MM_TO_M: f32 = 0.001;

    fn point(v: &leaprs::Vector) -> Point3<f32> {
        Point3::new(v.x * MM_TO_M, v.y * MM_TO_M, v.z * MM_TO_M)
    }

    fn bone(b: &leaprs::Bone) -> Bone {
        let prev_joint = point(&b.prev_joint());
        let next_joint = point(&b.next_joint());
        let dir = next_joint - prev_joint;
        let rotation = UnitQuaternion::rotation_between(&Vector3::z(), &dir)
            .unwrap_or_else(UnitQuaternion::identity);
        Bone { prev_joint, next_joint, rotation }
    }

    fn finger(kind: FingerKind, d: &leaprs::Digit) -> Finger {
        let bones = [
            bone(&d.metacarpal()),
            bone(&d.proximal()),
            bone(&d.intermediate()),
            bone(&d.distal()),
        ];
        Finger { kind, bones }
    }

    pub fn hand(h: &leaprs::Hand) -> Option<SkeletalHand> {
        let chirality = match h.hand_type() {
            leaprs::HandType::Left  => Chirality::Left,
            leaprs::HandType::Right => Chirality::Right,
        };

        let digits: Vec<_> = h.digits().collect();
        if digits.len() < 5 {
            return None;
        }
        let fingers = [
            finger(FingerKind::Thumb,  &digits[0]),
            finger(FingerKind::Index,  &digits[1]),
            finger(FingerKind::Middle, &digits[2]),
            finger(FingerKind::Ring,   &digits[3]),
            finger(FingerKind::Pinky,  &digits[4]),
        ];

        // Palm orientation from the middle metacarpal direction, up = +Y.
        let position = point(&h.palm().position());
        let middle_mc = fingers[FingerKind::Middle.index()].bone(BoneKind::Metacarpal);
        let rotation = middle_mc
            .direction()
            .and_then(|d| UnitQuaternion::rotation_between(&Vector3::z(), &d))
            .unwrap_or_else(UnitQuaternion::identity);

        Some(SkeletalHand {
            chirality,
            palm: JointPose { position, rotation },
            fingers,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
