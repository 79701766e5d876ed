#![no_main]

use libfuzzer_sys::fuzz_target;
use sipcmd::command::{ArgumentScheme, Arguments, CommandRegistry};
use sipcmd::config::DispatchConfig;
use sipcmd::dispatcher::Dispatcher;
use sipcmd::parser::tokenize;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    for token in tokenize(input) {
        if let sipcmd::parser::Token::Pair { key, .. } = token {
            assert!(!key.is_empty());
        }
    }

    let mut registry = CommandRegistry::new();
    registry.register("show", "", |_: &Arguments| {}, ArgumentScheme::new());
    registry.register(
        "call",
        "",
        |args: &Arguments| assert!(args.contains_key("sip-address")),
        ArgumentScheme::new().required("sip-address").optional("video"),
    );
    let dispatcher = Dispatcher::new(registry, DispatchConfig::default());
    let _ = dispatcher.try_execute_command(input);
});
