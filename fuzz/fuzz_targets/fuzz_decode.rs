#![no_main]
use libfuzzer_sys::fuzz_target;
use zenjlst::jls::{NoCodec, patch, read_header};
use zenjlst::{ImageInfo, Limits, LoadRequest, Registry};

fuzz_target!(|data: &[u8]| {
    let registry = Registry::builtin(NoCodec);
    let limits = Limits::default().with_max_pixels(1 << 24);

    // Auto-detect, then with RAW hints; must never panic
    let _ = LoadRequest::new(data)
        .with_limits(&limits)
        .load(&registry, enough::Unstoppable);
    let _ = LoadRequest::new(data)
        .with_hints(ImageInfo::hints(16, 16))
        .with_limits(&limits)
        .load(&registry, enough::Unstoppable);

    // Header-only JPEG-LS paths
    let _ = read_header(data);
    let _ = patch::fix_jai(data);
    let mut copy = data.to_vec();
    let _ = patch::patch_header(&mut copy, 1);
});
