//! End-to-end behaviour of the PSG core through its public API

use ym2149_synth::ym2149::constants::{get_volume, OUTPUT_HEADROOM, VOLUME_TABLE};
use ym2149_synth::ym2149::ShapeFlags;
use ym2149_synth::{SynthError, Ym2149};

fn chip() -> Ym2149 {
    Ym2149::new(44_100).expect("valid sample rate")
}

fn assert_power_on_state(chip: &Ym2149) {
    assert_eq!(chip.registers(), [0; 16]);
    for channel in 0..3 {
        let voice = chip.voice(channel).unwrap();
        assert_eq!(voice.tone().period(), 1);
        assert_eq!(voice.tone().counter(), 0);
        assert_eq!(voice.tone().output(), 0);
        assert_eq!(voice.volume(), 0);
        assert!(voice.tone_enabled());
        assert!(!voice.noise_enabled());
        assert!(!voice.envelope_enabled());
    }
    assert_eq!(chip.noise().period(), 1);
    assert_eq!(chip.noise().counter(), 0);
    assert_eq!(chip.noise().output(), 0);
    assert_eq!(chip.noise().lfsr(), 1);
    assert_eq!(chip.envelope().period(), 1);
    assert_eq!(chip.envelope().counter(), 0);
    assert_eq!(chip.envelope().phase(), 0);
    assert_eq!(chip.envelope().output(), 15);
    assert!(!chip.envelope().is_holding());
    assert_eq!(chip.envelope().shape(), ShapeFlags::empty());
}

fn busy_chip() -> Ym2149 {
    let mut chip = chip();
    for (reg, value) in [
        (0x00, 0x10),
        (0x01, 0x01),
        (0x06, 0x07),
        (0x07, 0x30),
        (0x08, 0x0F),
        (0x09, 0x1A),
        (0x0B, 0x20),
        (0x0D, 0x0E),
    ] {
        chip.write_register(reg, value).unwrap();
    }
    chip.generate_samples(1234);
    chip
}

#[test]
fn reset_restores_power_on_state_and_is_idempotent() {
    let mut chip = busy_chip();
    chip.reset();
    assert_power_on_state(&chip);

    let once = chip.clone();
    chip.reset();
    assert_eq!(chip.registers(), once.registers());
    assert_eq!(chip.noise(), once.noise());
    assert_eq!(chip.envelope(), once.envelope());
    for channel in 0..3 {
        assert_eq!(chip.voice(channel), once.voice(channel));
    }

    assert_eq!(chip.generate_sample(), 0.0);
}

#[test]
fn golden_single_tone_voice() {
    let mut chip = chip();
    chip.write_register(0x00, 100).unwrap();
    chip.write_register(0x01, 0x00).unwrap();
    chip.write_register(0x08, 15).unwrap();
    chip.write_register(0x07, 0x3E).unwrap();
    assert_eq!(chip.voice(0).unwrap().tone().period(), 100);

    let expected = (VOLUME_TABLE[15] / 3.0) * OUTPUT_HEADROOM;

    for tick in 1..100 {
        assert_eq!(chip.generate_sample(), 0.0, "tick {tick} should be silent");
        assert_eq!(chip.voice(0).unwrap().tone().output(), 0);
    }

    // Tick 100 flips the output high
    assert_eq!(chip.generate_sample(), expected);
    assert_eq!(chip.voice(0).unwrap().tone().output(), 1);

    // The 101st sample still sits in the high half-cycle
    assert_eq!(chip.generate_sample(), expected);
    assert_eq!(expected, 0.5f32 / 3.0 * 0.3);
}

#[test]
fn tone_completes_one_cycle_every_two_periods() {
    let mut chip = chip();
    chip.write_register(0x04, 37).unwrap();
    let mut toggles = Vec::new();
    let mut last = chip.voice(2).unwrap().tone().output();
    for tick in 1..=(37 * 6) {
        chip.generate_sample();
        let out = chip.voice(2).unwrap().tone().output();
        if out != last {
            toggles.push(tick);
            last = out;
        }
    }
    assert_eq!(toggles, vec![37, 74, 111, 148, 185, 222]);
}

#[test]
fn noise_lfsr_has_full_period_and_never_reaches_zero() {
    let mut chip = chip();
    // R6 = 0 -> period 1, one shift per tick
    let mut steps = 0u32;
    loop {
        chip.generate_sample();
        steps += 1;
        let lfsr = chip.noise().lfsr();
        assert_ne!(lfsr, 0, "LFSR hit the absorbing state after {steps} steps");
        assert!(lfsr < (1 << 17));
        if lfsr == 1 {
            break;
        }
        assert!(steps < 1 << 18, "LFSR did not recur");
    }
    assert_eq!(steps, (1 << 17) - 1);
}

#[test]
fn noise_period_scales_shift_rate() {
    let mut chip = chip();
    chip.write_register(0x06, 0x03).unwrap();
    assert_eq!(chip.noise().period(), 6);
    chip.generate_samples(5);
    assert_eq!(chip.noise().lfsr(), 1);
    chip.generate_sample();
    assert_eq!(chip.noise().lfsr(), 0x1_0000);
}

#[test]
fn attack_without_continue_holds_after_32_periods() {
    let mut chip = chip();
    chip.write_register(0x0B, 3).unwrap(); // period 6
    chip.write_register(0x0D, 0x04).unwrap();
    let period = chip.envelope().period() as usize;
    assert_eq!(period, 6);

    chip.generate_samples(32 * period - 1);
    assert!(!chip.envelope().is_holding());
    chip.generate_sample();
    assert!(chip.envelope().is_holding());
    let held = chip.envelope().output();
    assert_eq!(held, 31);

    for _ in 0..10_000 {
        chip.generate_sample();
        assert_eq!(chip.envelope().output(), held);
        assert!(chip.envelope().is_holding());
    }
}

#[test]
fn continue_alternate_is_an_endless_triangle() {
    let mut chip = chip();
    chip.write_register(0x0D, 0x0A).unwrap(); // continue + alternate, decay first

    let mut phases = Vec::new();
    for _ in 0..(64 * 5) {
        chip.generate_sample();
        assert!(!chip.envelope().is_holding());
        phases.push(chip.envelope().phase());
    }

    assert_eq!(*phases.iter().min().unwrap(), 0);
    assert_eq!(*phases.iter().max().unwrap(), 31);
    for pair in phases.windows(2) {
        assert!((pair[1] - pair[0]).abs() <= 1, "phase jumped: {pair:?}");
    }
    // Each end is visited twice in a row (the saturating step repeats it)
    let tops = phases.windows(2).filter(|w| w[0] == 31 && w[1] == 31).count();
    assert!(tops >= 4);
}

#[test]
fn envelope_levels_above_15_are_halved_into_the_volume_table() {
    let mut chip = chip();
    chip.write_register(0x00, 0xFF).unwrap();
    chip.write_register(0x01, 0x0F).unwrap(); // long tone period
    chip.write_register(0x07, 0x3E).unwrap();
    chip.write_register(0x08, 0x10).unwrap(); // envelope-driven
    chip.write_register(0x0B, 40).unwrap();
    chip.write_register(0x0D, 0x0C).unwrap(); // sawtooth up

    let mut seen_high_phase = false;
    for _ in 0..20_000 {
        let sample = chip.generate_sample();
        let env_output = chip.envelope().output();
        let tone_high = chip.voice(0).unwrap().tone().output() == 1;
        let expected = if tone_high {
            (get_volume(env_output >> 1) / 3.0) * OUTPUT_HEADROOM
        } else {
            0.0
        };
        assert_eq!(sample, expected, "envelope output {env_output}");
        if tone_high && env_output > 15 {
            seen_high_phase = true;
            assert!(sample > 0.0);
        }
    }
    assert!(seen_high_phase);
}

#[test]
fn voice_with_both_sources_disabled_is_silent() {
    let mut chip = chip();
    chip.write_register(0x06, 0x01).unwrap();
    chip.write_register(0x07, 0x3F).unwrap();
    for reg in 0x08..=0x0A {
        chip.write_register(reg, 0x0F).unwrap();
    }
    assert!(chip.generate_samples(5000).iter().all(|&s| s == 0.0));
}

#[test]
fn noise_only_voice_follows_lfsr() {
    let mut chip = chip();
    chip.write_register(0x07, 0x37).unwrap(); // noise A only, tones off
    chip.write_register(0x08, 0x0F).unwrap();
    let loud = (VOLUME_TABLE[15] / 3.0) * OUTPUT_HEADROOM;
    for _ in 0..500 {
        let sample = chip.generate_sample();
        let expected = if chip.noise().output() == 1 { loud } else { 0.0 };
        assert_eq!(sample, expected);
    }
}

#[test]
fn all_voices_at_full_volume_stay_in_range() {
    let mut chip = chip();
    chip.write_register(0x07, 0x00).unwrap();
    for reg in 0x08..=0x0A {
        chip.write_register(reg, 0x0F).unwrap();
    }
    let samples = chip.generate_samples(10_000);
    let peak = samples.iter().cloned().fold(0.0f32, f32::max);
    assert_eq!(peak, 0.5 * OUTPUT_HEADROOM);
    assert!(samples.iter().all(|&s| (0.0..=0.3).contains(&s)));
}

#[test]
fn process_samples_matches_scalar_generation() {
    let mut scalar = busy_chip();
    let mut batch = scalar.clone();

    let expected: Vec<f32> = (0..4096).map(|_| scalar.generate_sample()).collect();

    let mut buffer = vec![-1.0f32; 5000];
    batch.process_samples(&mut buffer, 4096).unwrap();
    assert_eq!(&buffer[..4096], &expected[..]);
    assert!(buffer[4096..].iter().all(|&s| s == -1.0));

    // Both continue identically afterwards
    assert_eq!(batch.generate_sample(), scalar.generate_sample());
}

#[test]
fn identical_histories_are_bit_identical() {
    let mut a = busy_chip();
    let mut b = busy_chip();
    for step in 0..50 {
        let reg = (step % 14) as u8;
        let value = (step * 37 % 256) as u8;
        a.write_register(reg, value).unwrap();
        b.write_register(reg, value).unwrap();
        assert_eq!(a.generate_samples(97), b.generate_samples(97));
    }
}

#[test]
fn shape_rewrite_with_same_value_restarts_envelope() {
    let mut chip = chip();
    chip.write_register(0x0D, 0x0C).unwrap();
    chip.generate_samples(10);
    assert_eq!(chip.envelope().phase(), 10);

    chip.write_register(0x0D, 0x0C).unwrap();
    assert_eq!(chip.envelope().phase(), 0);
    assert_eq!(chip.envelope().counter(), 0);
    assert_eq!(chip.envelope().output(), 0);
}

#[test]
fn failed_write_leaves_state_untouched() {
    let mut chip = busy_chip();
    let before = chip.clone();
    let err = chip.write_register(0x10, 0x55).unwrap_err();
    assert!(matches!(err, SynthError::OutOfRange { index: 16 }));
    assert_eq!(err.to_string(), "Invalid register: 16. Must be 0-15");
    assert_eq!(chip.registers(), before.registers());
    assert_eq!(chip.envelope(), before.envelope());
    assert_eq!(chip.noise(), before.noise());
}

#[test]
fn io_port_registers_store_without_effect() {
    let mut chip = chip();
    chip.write_register(0x0E, 0xAB).unwrap();
    chip.write_register(0x0F, 0xCD).unwrap();
    assert_eq!(chip.read_register(0x0E).unwrap(), 0xAB);
    assert_eq!(chip.read_register(0x0F).unwrap(), 0xCD);
    assert_eq!(chip.generate_sample(), 0.0);
}
