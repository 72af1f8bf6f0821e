#![no_main]

use gateway_config::{admit_lenient, admit_strict, ServerConfigRaw};
use gateway_runtime::risk::plan_spawn;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // An arbitrary `riskLevel`/`docker` combination must admit or demote
    // cleanly, never panic — including the HIGH-without-image case that
    // `admit_strict` is supposed to reject outright.
    let Ok(raw) = serde_json::from_str::<ServerConfigRaw>(text) else {
        return;
    };

    let admitted = admit_lenient("fuzz", raw.clone());
    let _ = plan_spawn(&admitted.config);

    if let Ok(config) = admit_strict("fuzz", raw) {
        let _ = plan_spawn(&config);
    }
});
