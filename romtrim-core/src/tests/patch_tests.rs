use super::*;

fn data_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + 7) % 250) as u8 + 1).collect()
}

fn original_and_trimmed(pad: u8, pad_len: usize) -> (Vec<u8>, Vec<u8>) {
    let trimmed = data_bytes(1000);
    let mut original = trimmed.clone();
    original.resize(trimmed.len() + pad_len, pad);
    (original, trimmed)
}

#[test]
fn restores_original_image() {
    for pad in [0x00u8, 0xFF] {
        let (original, trimmed) = original_and_trimmed(pad, 500);
        let patch = RestorationPatch::create(&original, &trimmed, pad).unwrap();
        assert_eq!(patch.length, 500);
        assert_eq!(patch.padding_byte, pad);

        let restored = apply_restoration_patch(&trimmed, &patch).unwrap();
        assert_eq!(restored, original);
    }
}

#[test]
fn nothing_removed_gives_no_patch() {
    let data = data_bytes(100);
    assert!(RestorationPatch::create(&data, &data, 0xFF).is_none());
    assert!(RestorationPatch::create(&data[..50], &data, 0xFF).is_none());
}

#[test]
fn non_uniform_suffix_gives_no_patch() {
    let (mut original, trimmed) = original_and_trimmed(0xFF, 500);
    original[1200] = 0x00;
    assert!(RestorationPatch::create(&original, &trimmed, 0xFF).is_none());
}

#[test]
fn bad_magic_leaves_input_untouched() {
    let trimmed = data_bytes(64);
    let patch = RestorationPatch {
        magic: 0xDEAD_BEEF,
        padding_byte: 0xFF,
        length: 10,
    };
    let err = apply_restoration_patch(&trimmed, &patch).unwrap_err();
    assert!(matches!(err, PatchError::BadMagic { found: 0xDEAD_BEEF }));
    assert_eq!(trimmed, data_bytes(64));
}

#[test]
fn encoded_layout() {
    let patch = RestorationPatch {
        magic: PATCH_MAGIC,
        padding_byte: 0xFF,
        length: 3,
    };
    let bytes = patch.to_bytes();
    assert_eq!(&bytes[0..4], b"RTPT");
    assert_eq!(bytes[4], 0xFF);
    assert_eq!(&bytes[5..9], &3u32.to_le_bytes());
    assert_eq!(&bytes[9..], &[0xFF, 0xFF, 0xFF]);
    assert_eq!(bytes.len() as u64, patch.encoded_len());

    assert_eq!(RestorationPatch::from_bytes(&bytes).unwrap(), patch);
}

#[test]
fn decode_rejects_short_header() {
    let err = RestorationPatch::from_bytes(b"RTPT\xFF").unwrap_err();
    assert!(matches!(err, PatchError::Truncated { expected: 9, actual: 5 }));
}

#[test]
fn decode_rejects_bad_magic() {
    let mut bytes = RestorationPatch::create(&[1, 0, 0], &[1], 0).unwrap().to_bytes();
    bytes[0] = b'X';
    let err = RestorationPatch::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, PatchError::BadMagic { .. }));
}

#[test]
fn decode_rejects_short_payload() {
    let (original, trimmed) = original_and_trimmed(0xFF, 16);
    let bytes = RestorationPatch::create(&original, &trimmed, 0xFF)
        .unwrap()
        .to_bytes();
    let err = RestorationPatch::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, PatchError::Truncated { expected: 25, actual: 24 }));
}

#[test]
fn decode_rejects_payload_mismatch() {
    let (original, trimmed) = original_and_trimmed(0xFF, 16);
    let mut bytes = RestorationPatch::create(&original, &trimmed, 0xFF)
        .unwrap()
        .to_bytes();
    bytes[PATCH_HEADER_LEN + 5] = 0x00;
    let err = RestorationPatch::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, PatchError::PayloadMismatch { offset: 5 }));
}

#[test]
fn save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.gba.rtpt");

    let (original, trimmed) = original_and_trimmed(0xFF, 200_000);
    let patch = RestorationPatch::create(&original, &trimmed, 0xFF).unwrap();
    patch.save(&path).unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().len(), patch.encoded_len());
    let loaded = RestorationPatch::load(&path).unwrap();
    assert_eq!(loaded, patch);
    assert_eq!(apply_restoration_patch(&trimmed, &loaded).unwrap(), original);
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RestorationPatch::load(&dir.path().join("missing.rtpt")).unwrap_err();
    assert!(matches!(err, PatchError::Io(_)));
}
