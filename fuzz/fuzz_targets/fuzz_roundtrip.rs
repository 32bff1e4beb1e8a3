#![no_main]
use libfuzzer_sys::fuzz_target;
use zenjlst::jls::NoCodec;
use zenjlst::{Limits, LoadRequest, Registry, SaveRequest};

fuzz_target!(|data: &[u8]| {
    // If PNM input loads, saving and loading again must produce identical pixels
    let registry = Registry::builtin(NoCodec);
    let limits = Limits::default().with_max_pixels(1 << 24);
    let Ok(image) = LoadRequest::new(data)
        .with_type("pnm")
        .with_limits(&limits)
        .load(&registry, enough::Unstoppable)
    else {
        return;
    };

    let Ok(saved) = SaveRequest::new("pnm").save(&registry, &image, enough::Unstoppable) else {
        panic!("loaded image failed to save");
    };
    let Ok(reloaded) = LoadRequest::new(&saved).load(&registry, enough::Unstoppable) else {
        panic!("saved data failed to load");
    };

    assert_eq!(image.pixels(), reloaded.pixels(), "roundtrip pixel mismatch");
    assert_eq!(image.info, reloaded.info);
});
