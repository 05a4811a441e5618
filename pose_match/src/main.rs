//! Interactive menu for exploring pose capture, mirroring, validation,
//! and detection against a posable synthetic hand.

use hand_skeleton::{BoneKind, Chirality, FingerKind, HandRig};
use pose_match::{
    mirror, validate, Axis, PoseDetector, PoseLibrary, PoseRecorder, ThresholdPair,
    ThresholdTable,
};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║            Hand Pose Matching Explorer                   ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();
    println!("  A synthetic right hand starts open.  Curl its fingers,");
    println!("  capture poses, then see what the detector finds.");
    println!();

    let mut rig = HandRig::new(Chirality::Right);
    let mut recorder = PoseRecorder::new();
    let mut detector = PoseDetector::new(PoseLibrary::new());

    loop {
        print_menu();
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        match choice.as_str() {
            "1" => {
                let finger = match pick_finger() {
                    Some(f) => f,
                    None => continue,
                };
                let deg: f32 = read_line("  Curl by how many degrees (default 60): ")
                    .trim().parse().unwrap_or(60.0);
                rig.curl(finger, deg);
                println!("  {} now curled {:.0}°.", finger, rig.curl_deg[finger.index()]);
            }
            "2" => {
                let finger = match pick_finger() {
                    Some(f) => f,
                    None => continue,
                };
                rig.flatten(finger);
                println!("  {} flattened.", finger);
            }
            "3" => {
                let hint = read_line("  Pose name: ").trim().to_string();
                let hint = if hint.is_empty() { "pose".to_string() } else { hint };
                let primary: f32 = read_line("  Primary tolerance ° (default 15): ")
                    .trim().parse().unwrap_or(15.0);
                let secondary: f32 = read_line("  Secondary tolerance ° (default 15): ")
                    .trim().parse().unwrap_or(15.0);

                let record = recorder.capture(
                    &rig.build(), &hint, ThresholdTable::uniform(primary, secondary),
                );
                let id = record.id().clone();
                match detector.library_mut().insert(record) {
                    Ok(())  => println!("  ✓ Captured \"{}\" ({} poses stored).", id,
                                        detector.library().len()),
                    Err(e)  => println!("  ⚠  {}", e),
                }
            }
            "4" => {
                if detector.library().is_empty() {
                    println!("  No poses stored yet.");
                    continue;
                }
                println!("  Stored poses (insertion order):");
                for record in detector.library().records() {
                    let fingers: String = FingerKind::ALL.iter()
                        .map(|&f| if record.enabled(f) { '●' } else { '○' })
                        .collect();
                    println!("    {:20}  {:5} hand   fingers {}",
                             record.id().to_string(), record.chirality().label(), fingers);
                }
            }
            "5" => {
                let pass = detector.detect(&[rig.build()]);
                match pass.for_chirality(rig.chirality) {
                    Some(d) => println!("  ✓ Detected pose: \"{}\"", d.id),
                    None    => println!("  No pose detected."),
                }
                for (id, e) in &pass.skipped {
                    println!("  ⚠  Skipped \"{}\": {}", id, e);
                }
            }
            "6" => {
                let id = read_line("  Validate against which pose id? ").trim().to_string();
                let record = match detector.library().get(&id.as_str().into()) {
                    Some(r) => r.clone(),
                    None => { println!("  ⚠  No pose named \"{}\".", id); continue; }
                };
                let live = rig.build();
                let candidate = if live.chirality == record.chirality() {
                    record
                } else {
                    match mirror(&record) {
                        Ok(m)  => m,
                        Err(e) => { println!("  ⚠  {}", e); continue; }
                    }
                };
                match validate(&live, &candidate) {
                    Err(e) => println!("  ⚠  {}", e),
                    Ok(result) => {
                        println!("  Overall: {}", if result.passed { "PASS" } else { "fail" });
                        for c in &result.checks {
                            println!("    {:6} {:12} {:9}  {:>7.2}° / ±{:.0}°   {}",
                                     c.finger.label(), c.bone.label(),
                                     match c.axis { Axis::Primary => "primary", Axis::Secondary => "secondary" },
                                     c.deviation_deg, c.threshold_deg,
                                     if c.passed { "ok" } else { "FAIL" });
                        }
                    }
                }
            }
            "7" => {
                let id = read_line("  Pose id: ").trim().to_string();
                let finger = match pick_finger() {
                    Some(f) => f,
                    None => continue,
                };
                let on = read_line("  Enable this finger? (y/n): ")
                    .trim().eq_ignore_ascii_case("y");
                if detector.library_mut().set_enabled(&id.as_str().into(), finger, on) {
                    println!("  {} {} on \"{}\".", finger,
                             if on { "enabled" } else { "disabled" }, id);
                } else {
                    println!("  ⚠  No pose named \"{}\".", id);
                }
            }
            "8" => {
                let id = read_line("  Pose id: ").trim().to_string();
                let finger = match pick_finger() {
                    Some(f) => f,
                    None => continue,
                };
                let bone = match pick_bone() {
                    Some(b) => b,
                    None => continue,
                };
                let primary: f32 = read_line("  Primary ° : ").trim().parse().unwrap_or(15.0);
                let secondary: f32 = read_line("  Secondary °: ").trim().parse().unwrap_or(15.0);
                let pair = ThresholdPair::new(primary, secondary);
                if detector.library_mut().set_threshold(&id.as_str().into(), finger, bone, pair) {
                    println!("  Thresholds updated on \"{}\".", id);
                } else {
                    println!("  ⚠  No pose named \"{}\".", id);
                }
            }
            "9" => {
                let id = read_line("  Delete which pose id? ").trim().to_string();
                match detector.library_mut().remove(&id.as_str().into()) {
                    Some(_) => println!("  Deleted \"{}\".", id),
                    None    => println!("  ⚠  No pose named \"{}\".", id),
                }
            }
            "m" => {
                rig.chirality = rig.chirality.opposite();
                println!("  Live hand is now the {} hand.", rig.chirality);
            }
            "q" | "quit" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => println!("  ⚠  Unknown command."),
        }
        println!();
    }
}

fn print_menu() {
    println!("  ┌─────────────────────────────────────────────────────────┐");
    println!("  │  1. Curl a finger             6. Validate vs one pose   │");
    println!("  │  2. Flatten a finger          7. Enable/disable finger  │");
    println!("  │  3. Capture current pose      8. Tune bone thresholds   │");
    println!("  │  4. List stored poses         9. Delete a pose          │");
    println!("  │  5. Detect current pose       m. Mirror the live hand   │");
    println!("  │                               q. Quit                   │");
    println!("  └─────────────────────────────────────────────────────────┘");
}

fn pick_finger() -> Option<FingerKind> {
    println!("    1. thumb  2. index  3. middle  4. ring  5. pinky");
    match read_line("    Finger (1–5): ").trim() {
        "1" => Some(FingerKind::Thumb),
        "2" => Some(FingerKind::Index),
        "3" => Some(FingerKind::Middle),
        "4" => Some(FingerKind::Ring),
        "5" => Some(FingerKind::Pinky),
        _   => { println!("    ⚠  Please enter 1–5."); None }
    }
}

fn pick_bone() -> Option<BoneKind> {
    println!("    1. proximal  2. intermediate  3. distal");
    match read_line("    Bone (1–3): ").trim() {
        "1" => Some(BoneKind::Proximal),
        "2" => Some(BoneKind::Intermediate),
        "3" => Some(BoneKind::Distal),
        _   => { println!("    ⚠  Please enter 1–3."); None }
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
