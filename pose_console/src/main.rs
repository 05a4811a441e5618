//! pose_console — interactive entry point.

use std::io::{self, Write};
use std::sync::mpsc::{self, TryRecvError};

use hand_skeleton::{BoneKind, Chirality, FingerKind};
use pose_console::app::{AppConfig, AppState};
use pose_console::source::{spawn_tracking_source, SimCommand};
use pose_match::{RecordId, ThresholdPair};

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Pose Console — Hand Pose Recorder & Detector          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: simulated hands  (use --features leap for hardware)");
    println!("  Type `help` for commands.");
    println!();

    let cfg = if std::env::args().any(|a| a == "--loose") {
        println!("  Loose tolerances: 25° primary / 25° secondary\n");
        AppConfig { default_primary_deg: 25.0, default_secondary_deg: 25.0 }
    } else {
        AppConfig::default()
    };

    let (sim_tx, sim_rx) = mpsc::channel::<SimCommand>();

    #[cfg(not(feature = "leap"))]
    let frame_rx = spawn_tracking_source(pose_console::source::SimSource { rx: sim_rx });
    #[cfg(feature = "leap")]
    let frame_rx = {
        drop(sim_rx); // hardware frames ignore sim commands
        spawn_tracking_source(pose_console::source::LeapSource)
    };

    let mut app = AppState::new(cfg);

    loop {
        // Give the source thread a moment to emit frames for whatever
        // the previous command changed.
        std::thread::sleep(std::time::Duration::from_millis(10));

        // ── drain pending frames, announcing transitions ─────────────────
        loop {
            match frame_rx.try_recv() {
                Ok(frame) => {
                    for line in app.tick(frame) {
                        println!("  ♦ {}", line);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let line = read_line("pose> ");
        let words: Vec<&str> = line.split_whitespace().collect();
        let done = match words.as_slice() {
            [] => false,
            ["quit"] | ["q"] => true,
            ["help"] | ["h"] => { print_help(); false }
            ["status"] => { println!("  {}", app.status); false }

            ["show", hand] => send_sim(&sim_tx, parse_hand(hand).map(SimCommand::Show)),
            ["hide", hand] => send_sim(&sim_tx, parse_hand(hand).map(SimCommand::Hide)),
            ["curl", hand, finger] =>
                send_sim(&sim_tx, sim_curl(hand, finger, 60.0)),
            ["curl", hand, finger, deg] =>
                send_sim(&sim_tx, sim_curl(hand, finger, deg.parse().unwrap_or(60.0))),
            ["flat", hand, finger] => send_sim(&sim_tx, match (parse_hand(hand), parse_finger(finger)) {
                (Some(h), Some(f)) => Some(SimCommand::Flatten(h, f)),
                _ => None,
            }),

            ["record", hand, name] => {
                match parse_hand(hand) {
                    None => { println!("  ⚠  Unknown hand \"{}\".", hand); }
                    Some(h) => match app.record(h, name) {
                        Ok(id) => println!("  ✓ Recorded \"{}\".", id),
                        Err(e) => println!("  ⚠  {}", e),
                    },
                }
                false
            }
            ["list"] => {
                if app.detector().library().is_empty() {
                    println!("  Library is empty.");
                } else {
                    for record in app.detector().library().records() {
                        let fingers: String = FingerKind::ALL.iter()
                            .map(|&f| if record.enabled(f) { '●' } else { '○' })
                            .collect();
                        println!("  {:20} {:5} hand   fingers {}",
                                 record.id().to_string(), record.chirality().label(), fingers);
                    }
                }
                false
            }
            ["finger", id, finger, state] => {
                let on = matches!(*state, "on" | "yes" | "y");
                match parse_finger(finger) {
                    None => { println!("  ⚠  Unknown finger \"{}\".", finger); }
                    Some(f) => {
                        if !app.set_finger(&RecordId::from(*id), f, on) {
                            println!("  ⚠  No pose named \"{}\".", id);
                        } else {
                            println!("  {}", app.status);
                        }
                    }
                }
                false
            }
            ["tune", id, finger, bone, primary, secondary] => {
                match (parse_finger(finger), parse_bone(bone), primary.parse(), secondary.parse()) {
                    (Some(f), Some(b), Ok(p), Ok(s)) => {
                        if app.set_threshold(&RecordId::from(*id), f, b, ThresholdPair::new(p, s)) {
                            println!("  {}", app.status);
                        } else {
                            println!("  ⚠  No pose named \"{}\".", id);
                        }
                    }
                    _ => println!("  ⚠  Usage: tune <id> <finger> <bone> <primary°> <secondary°>"),
                }
                false
            }
            ["delete", id] => {
                if app.delete(&RecordId::from(*id)) {
                    println!("  {}", app.status);
                } else {
                    println!("  ⚠  No pose named \"{}\".", id);
                }
                false
            }
            ["save", path] => {
                match app.save(path) {
                    Ok(())  => println!("  {}", app.status),
                    Err(e)  => println!("  ⚠  {}", e),
                }
                false
            }
            ["load", path] => {
                match app.load(path) {
                    Ok(())  => println!("  {}", app.status),
                    Err(e)  => println!("  ⚠  {}", e),
                }
                false
            }
            _ => { println!("  ⚠  Unknown command — try `help`."); false }
        };

        if done {
            let _ = sim_tx.send(SimCommand::Quit);
            println!("\nGoodbye!\n");
            break;
        }
    }
}

/// Send a parsed sim command; report parse failures.  Always returns
/// false (the loop continues).
fn send_sim(tx: &mpsc::Sender<SimCommand>, cmd: Option<SimCommand>) -> bool {
    if cfg!(feature = "leap") {
        println!("  ⚠  Simulated-hand commands are unavailable in hardware mode.");
        return false;
    }
    match cmd {
        Some(c) => { let _ = tx.send(c); }
        None    => println!("  ⚠  Could not parse that — try `help`."),
    }
    false
}

fn sim_curl(hand: &str, finger: &str, deg: f32) -> Option<SimCommand> {
    Some(SimCommand::Curl(parse_hand(hand)?, parse_finger(finger)?, deg))
}

fn parse_hand(s: &str) -> Option<Chirality> {
    match s {
        "left"  | "l" => Some(Chirality::Left),
        "right" | "r" => Some(Chirality::Right),
        _ => None,
    }
}

fn parse_finger(s: &str) -> Option<FingerKind> {
    match s {
        "thumb"  => Some(FingerKind::Thumb),
        "index"  => Some(FingerKind::Index),
        "middle" => Some(FingerKind::Middle),
        "ring"   => Some(FingerKind::Ring),
        "pinky"  => Some(FingerKind::Pinky),
        _ => None,
    }
}

fn parse_bone(s: &str) -> Option<BoneKind> {
    match s {
        "proximal"     => Some(BoneKind::Proximal),
        "intermediate" => Some(BoneKind::Intermediate),
        "distal"       => Some(BoneKind::Distal),
        _ => None,
    }
}

fn print_help() {
    println!("  ┌──────────────────────────────────────────────────────────┐");
    println!("  │  show left|right            bring a sim hand in          │");
    println!("  │  hide left|right            drop a sim hand              │");
    println!("  │  curl <hand> <finger> [°]   bend a sim finger            │");
    println!("  │  flat <hand> <finger>       relax a sim finger           │");
    println!("  │  record <hand> <name>       capture the live hand        │");
    println!("  │  list                       show the pose library        │");
    println!("  │  finger <id> <finger> on|off  toggle a finger            │");
    println!("  │  tune <id> <finger> <bone> <p> <s>  set tolerances       │");
    println!("  │  delete <id>                remove a pose                │");
    println!("  │  save <path> / load <path>  pose library as JSON         │");
    println!("  │  status / quit                                           │");
    println!("  └──────────────────────────────────────────────────────────┘");
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "leap"))]
    #[test]
    fn parsed_sim_commands_reach_the_source_channel() {
        let (tx, rx) = mpsc::channel();
        assert!(!send_sim(&tx, Some(SimCommand::Show(Chirality::Right))));
        assert_eq!(rx.try_recv(), Ok(SimCommand::Show(Chirality::Right)));
    }

    #[cfg(feature = "leap")]
    #[test]
    fn sim_commands_are_refused_in_hardware_mode() {
        let (tx, rx) = mpsc::channel();
        assert!(!send_sim(&tx, Some(SimCommand::Show(Chirality::Right))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unparseable_sim_commands_send_nothing() {
        let (tx, rx) = mpsc::channel::<SimCommand>();
        assert!(!send_sim(&tx, None));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn tune_arguments_parse_to_checked_bones() {
        assert_eq!(parse_bone("proximal"), Some(BoneKind::Proximal));
        assert_eq!(parse_bone("distal"), Some(BoneKind::Distal));
        assert_eq!(parse_bone("metacarpal"), None);
    }
}
