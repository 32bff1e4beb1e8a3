#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // PPM 2x2
    let ppm = b"P6\n2 2\n255\n\xff\x00\x00\x00\xff\x00\x00\x00\xff\x80\x80\x80";
    fs::write(format!("{dir}/ppm_2x2.ppm"), ppm).unwrap();

    // PGM 3x2 with a comment
    let pgm = b"P5\n# scanner\n3 2\n255\n\x00\x40\x80\xc0\xff\x64";
    fs::write(format!("{dir}/pgm_3x2.pgm"), pgm).unwrap();

    // PGM 12-bit 1x1
    fs::write(format!("{dir}/pgm_12bit.pgm"), b"P5\n1 1\n4095\n\x0f\xff").unwrap();

    // JPEG-LS headers: SOI, SOF55 (8 bit, 1x1, 1 component), SOS, EOI
    let mut jls = vec![0xFF, 0xD8];
    jls.extend_from_slice(&[0xFF, 0xF7, 0x00, 0x0B, 8, 0, 1, 0, 1, 1, 1, 0x11, 0]);
    jls.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 1, 1, 0, 0, 0, 0]);
    jls.extend_from_slice(&[0x00, 0xFF, 0xD9]);
    fs::write(format!("{dir}/jls_1x1.jls"), &jls).unwrap();

    // Same frame at 16 bits behind a standard SPIFF header
    let mut spiff = vec![0xFF, 0xD8, 0xFF, 0xE8, 0x00, 0x20];
    spiff.extend_from_slice(b"SPIFF\0");
    spiff.extend_from_slice(&[2, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 8, 16, 6, 0]);
    spiff.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1]);
    spiff.extend_from_slice(&[0xFF, 0xE8, 0x00, 0x08, 0, 0, 0, 1, 0xFF, 0xD8]);
    spiff.extend_from_slice(&[0xFF, 0xF7, 0x00, 0x0B, 16, 0, 1, 0, 1, 1, 1, 0x11, 0]);
    spiff.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 1, 1, 0, 0, 0, 0]);
    spiff.extend_from_slice(&[0x00, 0xFF, 0xD9]);
    fs::write(format!("{dir}/jls_spiff_16bit.jls"), &spiff).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/just_p6.bin"), b"P6").unwrap();
    fs::write(format!("{dir}/soi_only.bin"), b"\xff\xd8").unwrap();
    fs::write(format!("{dir}/raw_16x16.bin"), [0x80u8; 256]).unwrap();

    println!("Generated seed corpus in {dir}/");
}
