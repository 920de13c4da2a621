use super::*;
use romtrim_core::apply_restoration_patch;
use std::fs;

const KIB: usize = 1024;

const GAME_BOY_LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

/// A Game Boy image with `data_len` bytes of content followed by `pad`.
fn gb_rom(data_len: usize, total: usize, pad: u8) -> Vec<u8> {
    let mut rom: Vec<u8> = (0..data_len)
        .map(|i| ((i * 31 + 7) % 250) as u8 + 1)
        .collect();
    rom[..0x100].fill(0xFF);
    rom[0x104..0x134].copy_from_slice(&GAME_BOY_LOGO);
    rom.resize(total, pad);
    rom
}

fn write_rom(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

// -- plan_trim ------------------------------------------------------------

#[test]
fn plan_finds_trim_point() {
    let rom = gb_rom(64 * KIB, 128 * KIB, 0xFF);
    let plan = plan_trim(&rom, &TrimOptions::default());
    assert_eq!(plan.format, RomFormat::GameBoy);
    assert_eq!(plan.padding_byte, Some(0xFF));
    assert_eq!(plan.verdict, Verdict::Trim { trim_point: 64 * KIB });
    assert!(plan.risk.is_some());
}

#[test]
fn plan_auto_detects_zero_padding() {
    let rom = gb_rom(64 * KIB, 128 * KIB, 0x00);
    let plan = plan_trim(&rom, &TrimOptions::default());
    assert_eq!(plan.padding_byte, Some(0x00));
    assert_eq!(plan.trim_point(), Some(64 * KIB));
}

#[test]
fn plan_honors_explicit_padding_byte() {
    let rom = gb_rom(64 * KIB, 128 * KIB, 0xFF);
    let options = TrimOptions::new().padding_byte(Some(0x00));
    let plan = plan_trim(&rom, &options);
    assert_eq!(plan.verdict, Verdict::NoPadding);
}

#[test]
fn plan_rejects_unsafe_trim() {
    let rom = gb_rom(64 * KIB, 256 * KIB, 0xFF);
    let plan = plan_trim(&rom, &TrimOptions::default());
    match plan.verdict {
        Verdict::Rejected { errors } => assert!(errors.iter().any(|e| e.contains("Cut ratio"))),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[test]
fn forced_plan_downgrades_errors() {
    let rom = gb_rom(64 * KIB, 256 * KIB, 0xFF);
    let plan = plan_trim(&rom, &TrimOptions::new().force(true));
    assert_eq!(plan.trim_point(), Some(64 * KIB));
    assert!(plan.warnings.iter().any(|w| w.starts_with("forced: ")));
}

#[test]
fn plan_skips_unknown_data() {
    let plan = plan_trim(&[0xFF; 4096], &TrimOptions::default());
    assert_eq!(plan.verdict, Verdict::Unsupported);
    assert_eq!(plan.format, RomFormat::Unknown);
}

// -- process_file ---------------------------------------------------------

#[test]
fn trims_in_place_with_backup() {
    let tmp = tempfile::tempdir().unwrap();
    let original = gb_rom(64 * KIB, 128 * KIB, 0xFF);
    let path = write_rom(tmp.path(), "game.gb", &original);

    let outcome = process_file(&path, &TrimOptions::default());

    assert_eq!(outcome.status, OutcomeStatus::Trimmed, "{:?}", outcome.error);
    assert!(outcome.trimmed);
    assert_eq!(outcome.format, RomFormat::GameBoy);
    assert_eq!(outcome.original_size, 128 * KIB as u64);
    assert_eq!(outcome.trimmed_size, 64 * KIB as u64);
    assert!((outcome.saved_ratio - 0.5).abs() < 1e-9);
    assert!(outcome.confidence.is_some());
    assert!(outcome.risk.is_some());

    assert_eq!(fs::read(&path).unwrap(), &original[..64 * KIB]);
    let backup = tmp.path().join("game.gb.bak");
    assert_eq!(fs::read(backup).unwrap(), original);
}

#[test]
fn existing_backup_is_overwritten() {
    let tmp = tempfile::tempdir().unwrap();
    let original = gb_rom(64 * KIB, 128 * KIB, 0xFF);
    let path = write_rom(tmp.path(), "game.gb", &original);
    write_rom(tmp.path(), "game.gb.bak", b"stale");

    let outcome = process_file(&path, &TrimOptions::default());
    assert_eq!(outcome.status, OutcomeStatus::Trimmed);
    assert_eq!(fs::read(backup_path(&path)).unwrap(), original);
}

#[test]
fn no_backup_when_disabled() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_rom(tmp.path(), "game.gb", &gb_rom(64 * KIB, 128 * KIB, 0xFF));

    let outcome = process_file(&path, &TrimOptions::new().backup(false));
    assert_eq!(outcome.status, OutcomeStatus::Trimmed);
    assert!(!backup_path(&path).exists());
}

#[test]
fn analyze_and_dry_run_leave_file_alone() {
    let tmp = tempfile::tempdir().unwrap();
    let original = gb_rom(64 * KIB, 128 * KIB, 0xFF);
    let path = write_rom(tmp.path(), "game.gb", &original);

    let outcome = process_file(&path, &TrimOptions::new().analyze_only(true));
    assert_eq!(outcome.status, OutcomeStatus::Analyzed);
    assert!(!outcome.trimmed);
    assert_eq!(outcome.trimmed_size, 64 * KIB as u64);

    let outcome = process_file(&path, &TrimOptions::new().dry_run(true));
    assert_eq!(outcome.status, OutcomeStatus::Simulated);
    assert!(!outcome.trimmed);

    assert_eq!(fs::read(&path).unwrap(), original);
    assert!(!backup_path(&path).exists());
}

#[test]
fn unpadded_file_is_left_alone() {
    let tmp = tempfile::tempdir().unwrap();
    let original = gb_rom(64 * KIB, 64 * KIB, 0xFF);
    let path = write_rom(tmp.path(), "full.gb", &original);

    let outcome = process_file(&path, &TrimOptions::default());
    assert_eq!(outcome.status, OutcomeStatus::NoPadding);
    assert_eq!(outcome.trimmed_size, outcome.original_size);
    assert!(outcome.error.is_none());
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn unknown_format_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_rom(tmp.path(), "blob.bin", &[0xFF; 4096]);

    let outcome = process_file(&path, &TrimOptions::default());
    assert_eq!(outcome.status, OutcomeStatus::Unsupported);
    assert!(!outcome.status.is_failure());
}

#[test]
fn validation_failure_keeps_file() {
    let tmp = tempfile::tempdir().unwrap();
    let original = gb_rom(64 * KIB, 256 * KIB, 0xFF);
    let path = write_rom(tmp.path(), "game.gb", &original);

    let outcome = process_file(&path, &TrimOptions::default());
    assert_eq!(outcome.status, OutcomeStatus::ValidationFailed);
    assert!(outcome.error.as_deref().unwrap().contains("Cut ratio"));
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn forced_trim_records_warnings() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_rom(tmp.path(), "game.gb", &gb_rom(64 * KIB, 256 * KIB, 0xFF));

    let outcome = process_file(&path, &TrimOptions::new().force(true).backup(false));
    assert_eq!(outcome.status, OutcomeStatus::Trimmed);
    assert!(outcome.warnings.iter().any(|w| w.contains("forced: Cut ratio")));
    assert_eq!(fs::metadata(&path).unwrap().len(), 64 * KIB as u64);
}

#[test]
fn empty_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_rom(tmp.path(), "empty.gb", &[]);

    let outcome = process_file(&path, &TrimOptions::default());
    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert!(outcome.error.as_deref().unwrap().contains("empty"));
}

#[test]
fn missing_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let outcome = process_file(&tmp.path().join("nope.gb"), &TrimOptions::default());
    assert_eq!(outcome.status, OutcomeStatus::Failed);
}

#[test]
fn output_dir_keeps_original() {
    let tmp = tempfile::tempdir().unwrap();
    let original = gb_rom(64 * KIB, 128 * KIB, 0xFF);
    let path = write_rom(tmp.path(), "game.gb", &original);
    let out_dir = tmp.path().join("out");

    let options = TrimOptions::new().output_dir(&out_dir).backup(false);
    let outcome = process_file(&path, &options);
    assert_eq!(outcome.status, OutcomeStatus::Trimmed, "{:?}", outcome.error);
    assert_eq!(fs::read(&path).unwrap(), original);
    assert_eq!(fs::read(out_dir.join("game.gb")).unwrap(), &original[..64 * KIB]);

    // Second run would clobber the output.
    let outcome = process_file(&path, &options);
    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert!(outcome.error.as_deref().unwrap().contains("already exists"));

    let outcome = process_file(&path, &options.clone().force(true));
    assert_eq!(outcome.status, OutcomeStatus::Trimmed);
}

#[test]
fn writes_restoration_patch() {
    let tmp = tempfile::tempdir().unwrap();
    let original = gb_rom(64 * KIB, 128 * KIB, 0xFF);
    let path = write_rom(tmp.path(), "game.gb", &original);

    let outcome = process_file(&path, &TrimOptions::new().write_patch(true).backup(false));
    assert_eq!(outcome.status, OutcomeStatus::Trimmed);

    let patch_file = outcome.patch_path.clone().unwrap();
    assert_eq!(patch_file, tmp.path().join("game.gb.rtpt"));

    let patch = RestorationPatch::load(&patch_file).unwrap();
    let trimmed = fs::read(&path).unwrap();
    assert_eq!(apply_restoration_patch(&trimmed, &patch).unwrap(), original);
}

#[test]
fn derived_paths() {
    let path = Path::new("/roms/game.gba");
    assert_eq!(backup_path(path), PathBuf::from("/roms/game.gba.bak"));
    assert_eq!(patch_path(path), PathBuf::from("/roms/game.gba.rtpt"));
    assert_eq!(output_path(path, &TrimOptions::default()), path);
    assert_eq!(
        output_path(path, &TrimOptions::new().output_dir("/out")),
        PathBuf::from("/out/game.gba")
    );
}
