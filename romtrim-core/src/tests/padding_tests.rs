use super::*;

/// Deterministic filler that never produces 0xFF or 0x00.
fn data_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + 7) % 250) as u8 + 1).collect()
}

fn padded(data_len: usize, pad: u8, pad_len: usize) -> Vec<u8> {
    let mut rom = data_bytes(data_len);
    rom.resize(data_len + pad_len, pad);
    rom
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn continuous_run_after_data() {
    let rom = padded(1000, 0xFF, 500);
    let report = analyze(&rom, 0xFF);

    assert!(report.has_padding);
    assert_eq!(report.trim_point, 1000);
    assert_eq!(report.padding_size, 500);
    assert_eq!(report.padding_byte, 0xFF);
    assert_eq!(report.pattern_type, PatternType::Continuous);
    // Short run, data end off every round boundary.
    assert!(approx(report.confidence, 0.3));
}

#[test]
fn all_padding_is_not_trimmable() {
    let rom = vec![0xFFu8; 4096];
    let report = analyze(&rom, 0xFF);
    assert!(!report.has_padding);
    assert_eq!(report.trim_point, rom.len());
    assert_eq!(report.padding_size, 0);
}

#[test]
fn empty_buffer_has_no_padding() {
    let report = analyze(&[], 0xFF);
    assert!(!report.has_padding);
    assert_eq!(report.trim_point, 0);
}

#[test]
fn data_at_end_means_no_padding() {
    let mut rom = padded(2048, 0xFF, 2048);
    rom.push(0x42);
    let report = analyze(&rom, 0xFF);
    assert!(!report.has_padding);
    assert_eq!(report.trim_point, rom.len());
    assert_eq!(report.pattern_type, PatternType::Mixed);
}

#[test]
fn wrong_padding_byte_finds_nothing() {
    let rom = padded(2048, 0xFF, 2048);
    let report = analyze(&rom, 0x00);
    assert!(!report.has_padding);
    assert_eq!(report.trim_point, rom.len());
}

#[test]
fn only_the_terminal_run_counts() {
    // 2000 bytes of 0xFF, one stray 0x00, then three more 0xFF. Rounding
    // the short final run up to 4 bytes swallows it completely.
    let mut rom = padded(4096, 0xFF, 2000);
    rom.push(0x00);
    rom.extend_from_slice(&[0xFF; 3]);
    assert_eq!(rom.len(), 6100);

    let report = analyze(&rom, 0xFF);
    assert!(!report.has_padding);
    assert_eq!(report.trim_point, rom.len());
}

#[test]
fn trim_point_rounds_up_to_four() {
    let rom = padded(1001, 0xFF, 100);
    let report = analyze(&rom, 0xFF);
    assert!(report.has_padding);
    assert_eq!(report.trim_point, 1004);
    assert_eq!(report.padding_size, 97);
}

#[test]
fn zero_padding_is_supported() {
    let rom = padded(8192, 0x00, 8192);
    let report = analyze(&rom, 0x00);
    assert!(report.has_padding);
    assert_eq!(report.trim_point, 8192);
    assert_eq!(report.padding_byte, 0x00);
}

#[test]
fn alternating_tail_is_rejected() {
    let mut rom = data_bytes(1024);
    for i in 0..256 {
        rom.push(if i % 2 == 0 { 0x00 } else { 0xFF });
    }
    let report = analyze(&rom, 0xFF);
    assert!(!report.has_padding);
    assert_eq!(report.pattern_type, PatternType::Alternating);
    assert!(approx(report.confidence, 0.3));
    assert_eq!(report.trim_point, rom.len());
}

#[test]
fn alternation_needs_four_bytes() {
    assert!(!has_alternating_pattern(&[0x00, 0xFF, 0x00], 0xFF));
    assert!(has_alternating_pattern(&[0x00, 0xFF, 0x00, 0xFF], 0xFF));
    assert!(has_alternating_pattern(&[0xFF, 0x00, 0xFF, 0x00], 0x00));
    assert!(!has_alternating_pattern(&[0x00, 0xFF, 0x00, 0x00], 0xFF));
    assert!(!has_alternating_pattern(&[0x12, 0xFF, 0x12, 0xFF], 0xFF));
}

#[test]
fn confidence_rewards_round_data_ends() {
    let mib = 1024 * 1024;

    // Half padding, data ends on 1 MiB.
    let report = analyze(&padded(mib, 0xFF, mib), 0xFF);
    assert!(approx(report.confidence, 1.0));

    // Mostly padding, data ends on 1 MiB.
    let report = analyze(&padded(mib, 0xFF, 2 * mib), 0xFF);
    assert!(approx(report.confidence, 0.8));

    // Data ends on 8 KiB.
    let report = analyze(&padded(8192, 0xFF, 4096), 0xFF);
    assert!(approx(report.confidence, 0.95));

    // Data ends on 4 KiB but not 8 KiB: no adjustment.
    let report = analyze(&padded(12288, 0xFF, 4096), 0xFF);
    assert!(approx(report.confidence, 0.9));
}

#[test]
fn trim_point_invariants_hold() {
    for data_len in [1usize, 3, 97, 1000, 1023, 4097] {
        for pad_len in [0usize, 1, 2, 5, 300, 2048] {
            let rom = padded(data_len, 0xFF, pad_len);
            let report = analyze(&rom, 0xFF);
            assert!(report.trim_point <= rom.len());
            assert_eq!(report.padding_size, rom.len() - report.trim_point);
            if report.has_padding {
                assert_eq!(report.trim_point % 4, 0);
            } else {
                assert_eq!(report.trim_point, rom.len());
            }
        }
    }
}

#[test]
fn auto_detect_prefers_majority() {
    let zeros = padded(4096, 0x00, 2048);
    assert_eq!(auto_detect_padding(&zeros, RomFormat::Nds), 0x00);
    assert_eq!(auto_detect_padding(&zeros, RomFormat::GameBoy), 0x00);

    let ffs = padded(4096, 0xFF, 2048);
    assert_eq!(auto_detect_padding(&ffs, RomFormat::Unknown), 0xFF);
}

#[test]
fn auto_detect_gba_is_always_ff() {
    let zeros = padded(4096, 0x00, 2048);
    assert_eq!(auto_detect_padding(&zeros, RomFormat::Gba), 0xFF);
}

#[test]
fn auto_detect_tie_goes_to_ff() {
    assert_eq!(auto_detect_padding(&[], RomFormat::Nds), 0xFF);
    assert_eq!(auto_detect_padding(&[0x00, 0xFF], RomFormat::Nds), 0xFF);
}
