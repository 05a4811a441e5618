//! Top-level application state machine.
//!
//! `AppState` owns the `PoseDetector` (and through it the library) and a
//! `PoseRecorder`.  It applies one detection tick per incoming
//! [`TrackingFrame`] and remembers the previously announced match per
//! chirality so transitions are reported exactly once.

use hand_skeleton::{BoneKind, Chirality, FingerKind, SkeletalHand};
use pose_match::{
    Detection, PoseDetector, PoseError, PoseLibrary, PoseRecorder, RecordId,
    ThresholdPair, ThresholdTable,
};
use tracing::info;

use crate::source::TrackingFrame;
use crate::store;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    /// Tolerances given to every newly recorded pose (tunable per bone
    /// afterwards).
    pub default_primary_deg:   f32,
    pub default_secondary_deg: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_primary_deg:   15.0,
            default_secondary_deg: 15.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    detector:  PoseDetector,
    recorder:  PoseRecorder,
    cfg:       AppConfig,

    // ── tick state ────────────────────────────────────────────────────────
    /// The most recent tracking frame (what `record` captures from).
    current:   TrackingFrame,
    /// Previously announced match per chirality, for transition logging.
    announced: [Option<RecordId>; 2],
    /// Records already reported as skipped, so a broken record is
    /// announced once, not once per frame.
    reported_skips: Vec<RecordId>,

    // ── status message ────────────────────────────────────────────────────
    pub status: String,
}

fn side_index(chirality: Chirality) -> usize {
    match chirality {
        Chirality::Left  => 0,
        Chirality::Right => 1,
    }
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Self {
        AppState {
            detector:  PoseDetector::new(PoseLibrary::new()),
            recorder:  PoseRecorder::new(),
            cfg,
            current:   TrackingFrame::default(),
            announced: [None, None],
            reported_skips: Vec::new(),
            status:    "Ready — no hands tracked, library empty".to_string(),
        }
    }

    pub fn detector(&self) -> &PoseDetector {
        &self.detector
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    /// Run one detection pass over a fresh tracking frame.
    ///
    /// Returns the transitions that happened this tick (pose entered or
    /// left), already logged; the caller only needs them for display.
    pub fn tick(&mut self, frame: TrackingFrame) -> Vec<String> {
        let pass = self.detector.detect(&frame.hands);
        self.current = frame;

        let mut transitions = Vec::new();
        for chirality in [Chirality::Left, Chirality::Right] {
            let now: Option<&Detection> = pass.for_chirality(chirality);
            let before = &self.announced[side_index(chirality)];

            match (before, now) {
                (None, Some(d)) => {
                    info!(id = %d.id, chirality = %chirality, "pose detected");
                    transitions.push(format!("{} hand: pose \"{}\" detected", chirality, d.id));
                }
                (Some(b), Some(d)) if *b != d.id => {
                    info!(id = %d.id, chirality = %chirality, "pose changed");
                    transitions.push(format!("{} hand: pose \"{}\" → \"{}\"", chirality, b, d.id));
                }
                (Some(b), None) => {
                    info!(id = %b, chirality = %chirality, "pose lost");
                    transitions.push(format!("{} hand: pose \"{}\" lost", chirality, b));
                }
                _ => {}
            }
            self.announced[side_index(chirality)] = now.map(|d| d.id.clone());
        }

        transitions.extend(self.skip_messages(&pass.skipped));

        self.status = self.describe();
        transitions
    }

    /// Messages for newly skipped records only.  A record that stays
    /// broken is reported once; if it recovers and breaks again, that
    /// is news again.
    fn skip_messages(&mut self, skipped: &[(RecordId, PoseError)]) -> Vec<String> {
        let messages = skipped.iter()
            .filter(|(id, _)| !self.reported_skips.contains(id))
            .map(|(id, e)| format!("skipped \"{}\": {}", id, e))
            .collect();
        self.reported_skips = skipped.iter().map(|(id, _)| id.clone()).collect();
        messages
    }

    fn describe(&self) -> String {
        let tracked: Vec<&str> = self.current.hands.iter()
            .map(|h| h.chirality.label())
            .collect();
        let matches: Vec<String> = self.announced.iter()
            .flatten()
            .map(|id| id.to_string())
            .collect();
        format!(
            "{} pose(s) stored — tracking [{}] — matching [{}]",
            self.detector.library().len(),
            tracked.join(", "),
            matches.join(", "),
        )
    }

    // ── authoring operations ──────────────────────────────────────────────

    /// Capture the currently tracked hand of `chirality` into a new
    /// record and insert it into the library.
    pub fn record(&mut self, chirality: Chirality, name_hint: &str) -> Result<RecordId, String> {
        let hand: &SkeletalHand = self.current.hand(chirality)
            .ok_or_else(|| format!("no live {} hand to record from", chirality))?;
        let thresholds = ThresholdTable::uniform(
            self.cfg.default_primary_deg,
            self.cfg.default_secondary_deg,
        );
        let record = self.recorder.capture(hand, name_hint, thresholds);
        let id = record.id().clone();
        self.detector.library_mut().insert(record).map_err(|e| e.to_string())?;
        self.status = format!("Recorded \"{}\" from the {} hand", id, chirality);
        Ok(id)
    }

    /// Toggle one finger of one stored pose.
    pub fn set_finger(&mut self, id: &RecordId, finger: FingerKind, on: bool) -> bool {
        let ok = self.detector.library_mut().set_enabled(id, finger, on);
        if ok {
            self.status = format!(
                "\"{}\": {} {}", id, finger, if on { "enabled" } else { "disabled" },
            );
        }
        ok
    }

    /// Tune one bone's tolerances on one stored pose.
    pub fn set_threshold(
        &mut self,
        id:     &RecordId,
        finger: FingerKind,
        bone:   BoneKind,
        pair:   ThresholdPair,
    ) -> bool {
        let pair = pair.clamped();
        let ok = self.detector.library_mut().set_threshold(id, finger, bone, pair);
        if ok {
            self.status = format!(
                "\"{}\": {} {} tolerances now ±{:.0}° / ±{:.0}°",
                id, finger, bone, pair.primary_deg, pair.secondary_deg,
            );
        }
        ok
    }

    /// Remove one stored pose.
    pub fn delete(&mut self, id: &RecordId) -> bool {
        let removed = self.detector.library_mut().remove(id).is_some();
        if removed {
            self.status = format!("Deleted \"{}\"", id);
            // A vanished pose can't stay announced.
            for slot in &mut self.announced {
                if slot.as_ref() == Some(id) {
                    *slot = None;
                }
            }
        }
        removed
    }

    /// Persist the library as JSON.
    pub fn save(&mut self, path: &str) -> Result<(), String> {
        store::save_library(path, self.detector.library()).map_err(|e| e.to_string())?;
        self.status = format!("Saved {} pose(s) to {}", self.detector.library().len(), path);
        Ok(())
    }

    /// Replace the library with one loaded from JSON.
    pub fn load(&mut self, path: &str) -> Result<(), String> {
        let library = store::load_library(path).map_err(|e| e.to_string())?;
        self.status = format!("Loaded {} pose(s) from {}", library.len(), path);
        self.detector = PoseDetector::new(library);
        self.announced = [None, None];
        self.reported_skips.clear();
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_skeleton::HandRig;

    fn frame_with(rigs: &[HandRig]) -> TrackingFrame {
        TrackingFrame { hands: rigs.iter().map(|r| r.build()).collect() }
    }

    fn app_with_open_right_pose() -> AppState {
        let mut app = AppState::new(AppConfig::default());
        app.tick(frame_with(&[HandRig::new(Chirality::Right)]));
        app.record(Chirality::Right, "open").unwrap();
        app
    }

    #[test]
    fn record_requires_a_live_hand() {
        let mut app = AppState::new(AppConfig::default());
        assert!(app.record(Chirality::Right, "open").is_err());
    }

    #[test]
    fn record_then_tick_detects_the_pose() {
        let mut app = app_with_open_right_pose();
        let transitions = app.tick(frame_with(&[HandRig::new(Chirality::Right)]));
        assert_eq!(transitions, vec!["right hand: pose \"open_1\" detected"]);
    }

    #[test]
    fn steady_match_is_announced_once() {
        let mut app = app_with_open_right_pose();
        let first  = app.tick(frame_with(&[HandRig::new(Chirality::Right)]));
        let second = app.tick(frame_with(&[HandRig::new(Chirality::Right)]));
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn losing_the_hand_reports_pose_lost() {
        let mut app = app_with_open_right_pose();
        app.tick(frame_with(&[HandRig::new(Chirality::Right)]));
        let transitions = app.tick(TrackingFrame::default());
        assert_eq!(transitions, vec!["right hand: pose \"open_1\" lost"]);
    }

    #[test]
    fn curled_hand_no_longer_matches() {
        let mut app = app_with_open_right_pose();
        app.tick(frame_with(&[HandRig::new(Chirality::Right)]));

        let mut rig = HandRig::new(Chirality::Right);
        rig.curl(FingerKind::Middle, 120.0);
        let transitions = app.tick(frame_with(&[rig]));
        assert_eq!(transitions, vec!["right hand: pose \"open_1\" lost"]);
    }

    #[test]
    fn left_hand_matches_via_the_mirror() {
        let mut app = app_with_open_right_pose();
        let transitions = app.tick(frame_with(&[HandRig::new(Chirality::Left)]));
        assert_eq!(transitions, vec!["left hand: pose \"open_1\" detected"]);
    }

    #[test]
    fn both_hands_report_independently() {
        let mut app = app_with_open_right_pose();
        let transitions = app.tick(frame_with(&[
            HandRig::new(Chirality::Left),
            HandRig::new(Chirality::Right),
        ]));
        assert_eq!(transitions.len(), 2);
    }

    #[test]
    fn disabling_a_finger_relaxes_matching() {
        let mut app = app_with_open_right_pose();
        assert!(app.set_finger(&"open_1".into(), FingerKind::Index, false));

        let mut rig = HandRig::new(Chirality::Right);
        rig.curl(FingerKind::Index, 150.0);
        let transitions = app.tick(frame_with(&[rig]));
        assert_eq!(transitions, vec!["right hand: pose \"open_1\" detected"]);
    }

    #[test]
    fn tuning_thresholds_relaxes_matching() {
        let mut app = app_with_open_right_pose();
        let id: RecordId = "open_1".into();

        // Curled well past the default 15° bands: no match.
        let mut rig = HandRig::new(Chirality::Right);
        rig.curl(FingerKind::Index, 60.0);
        assert!(app.tick(frame_with(&[rig])).is_empty());

        for bone in BoneKind::CHECKED {
            assert!(app.set_threshold(&id, FingerKind::Index, bone, ThresholdPair::new(65.0, 20.0)));
        }
        let transitions = app.tick(frame_with(&[rig]));
        assert_eq!(transitions, vec!["right hand: pose \"open_1\" detected"]);
    }

    #[test]
    fn tuning_an_unknown_pose_reports_false() {
        let mut app = AppState::new(AppConfig::default());
        let pair = ThresholdPair::new(20.0, 20.0);
        assert!(!app.set_threshold(&"ghost".into(), FingerKind::Index, BoneKind::Distal, pair));
    }

    #[test]
    fn skipped_record_is_announced_once_until_it_recovers() {
        let mut app = AppState::new(AppConfig::default());
        let skipped = vec![(
            RecordId::from("broken_1"),
            PoseError::MalformedPose {
                id:     "broken_1".to_string(),
                detail: "zero length".to_string(),
            },
        )];

        assert_eq!(app.skip_messages(&skipped).len(), 1);
        // Still broken next tick: stay quiet.
        assert!(app.skip_messages(&skipped).is_empty());

        // A tick without the skip clears the memory; a later break is
        // news again.
        assert!(app.skip_messages(&[]).is_empty());
        assert_eq!(app.skip_messages(&skipped).len(), 1);
    }

    #[test]
    fn deleting_the_matched_pose_clears_the_announcement() {
        let mut app = app_with_open_right_pose();
        app.tick(frame_with(&[HandRig::new(Chirality::Right)]));
        assert!(app.delete(&"open_1".into()));
        // Next tick with the same hand: nothing to match, and no stale
        // "lost" message for a pose that no longer exists.
        let transitions = app.tick(frame_with(&[HandRig::new(Chirality::Right)]));
        assert!(transitions.is_empty());
    }

    #[test]
    fn save_load_round_trip_keeps_detecting() {
        let mut app = app_with_open_right_pose();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poses.json");
        app.save(path.to_str().unwrap()).unwrap();

        let mut fresh = AppState::new(AppConfig::default());
        fresh.load(path.to_str().unwrap()).unwrap();
        let transitions = fresh.tick(frame_with(&[HandRig::new(Chirality::Right)]));
        assert_eq!(transitions, vec!["right hand: pose \"open_1\" detected"]);
    }
}
