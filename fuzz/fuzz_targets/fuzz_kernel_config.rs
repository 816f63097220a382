#![no_main]

use libfuzzer_sys::fuzz_target;
use sfui::KernelConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must never panic, whatever the input.
    if let Ok(cfg) = KernelConfig::from_toml_str(text) {
        let _ = cfg.validate();
        if let Ok(out) = cfg.to_toml_string() {
            let _ = KernelConfig::from_toml_str(&out);
        }
    }
    if let Ok(cfg) = KernelConfig::from_json_str(text) {
        let _ = cfg.validate();
    }
});
