// Speaker hand-over between the ambient bed and narration.

use pano_core::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn scene_activation_gives_ambient_the_speaker() {
    let mut arb = AudioArbiter::default();
    assert_eq!(arb.scene_activated().as_slice(), &[AudioCommand::UnmuteAmbient]);
    assert_eq!(arb.speaker(), Speaker::Ambient);
    assert!(arb.ambient_audible());
    assert!(!arb.narration_audible());
}

#[test]
fn narration_mutes_ambient_and_hands_back() {
    let mut arb = AudioArbiter::default();
    arb.scene_activated();
    assert_eq!(arb.narration_started().as_slice(), &[AudioCommand::MuteAmbient]);
    assert_eq!(arb.speaker(), Speaker::Narration);
    assert!(arb.resume_pending());
    assert!(!arb.ambient_audible());

    assert_eq!(arb.narration_finished().as_slice(), &[AudioCommand::UnmuteAmbient]);
    assert_eq!(arb.speaker(), Speaker::Ambient);
    assert!(!arb.resume_pending());
    // finishing again is a no-op
    assert!(arb.narration_finished().is_empty());
}

#[test]
fn narration_refused_when_disabled_or_closed() {
    let mut arb = AudioArbiter::new(true, false);
    arb.scene_activated();
    assert_eq!(arb.narration_started().as_slice(), &[AudioCommand::StopNarration]);
    assert_eq!(arb.speaker(), Speaker::Ambient);

    let mut closed = AudioArbiter::default();
    assert_eq!(closed.narration_started().as_slice(), &[AudioCommand::StopNarration]);
}

#[test]
fn disabling_narration_while_it_speaks() {
    let mut arb = AudioArbiter::default();
    arb.scene_activated();
    arb.narration_started();
    assert_eq!(
        arb.set_narration_enabled(false).as_slice(),
        &[AudioCommand::StopNarration, AudioCommand::UnmuteAmbient]
    );
    assert!(arb.ambient_audible());
    // unchanged value is a no-op
    assert!(arb.set_narration_enabled(false).is_empty());
}

#[test]
fn ambient_toggle_only_applies_while_ambient_speaks() {
    let mut arb = AudioArbiter::default();
    arb.scene_activated();
    assert_eq!(arb.set_ambient_enabled(false).as_slice(), &[AudioCommand::MuteAmbient]);
    assert!(!arb.ambient_audible());

    arb.narration_started();
    assert!(arb.set_ambient_enabled(true).is_empty());
    // comes back once narration lets go
    assert_eq!(arb.narration_finished().as_slice(), &[AudioCommand::UnmuteAmbient]);
    assert!(arb.ambient_audible());
}

#[test]
fn ambient_disabled_stays_muted_after_narration() {
    let mut arb = AudioArbiter::new(false, true);
    assert_eq!(arb.scene_activated().as_slice(), &[AudioCommand::MuteAmbient]);
    arb.narration_started();
    assert_eq!(arb.narration_finished().as_slice(), &[AudioCommand::MuteAmbient]);
}

#[test]
fn close_silences_both() {
    let mut arb = AudioArbiter::default();
    arb.scene_activated();
    arb.narration_started();
    assert_eq!(
        arb.closed().as_slice(),
        &[AudioCommand::StopNarration, AudioCommand::MuteAmbient]
    );
    assert!(!arb.is_open());
    assert!(!arb.ambient_audible());
    assert!(!arb.narration_audible());
}

#[test]
fn random_events_never_make_both_audible() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut arb = AudioArbiter::default();
    for step in 0..10_000 {
        match rng.gen_range(0..7) {
            0 => {
                arb.scene_activated();
            }
            1 | 2 => {
                arb.narration_started();
            }
            3 => {
                arb.narration_finished();
            }
            4 => {
                arb.set_narration_enabled(rng.gen_bool(0.5));
            }
            5 => {
                arb.set_ambient_enabled(rng.gen_bool(0.5));
            }
            _ => {
                arb.closed();
            }
        }
        assert!(
            !(arb.ambient_audible() && arb.narration_audible()),
            "both audible at step {step}"
        );
        // open with both producers enabled means exactly one holds the speaker
        if arb.is_open() && arb.ambient_enabled() && arb.narration_enabled() {
            assert!(
                arb.ambient_audible() || arb.narration_audible(),
                "silence at step {step}"
            );
        }
    }
}
