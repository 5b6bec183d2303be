use std::sync::atomic::{AtomicBool, Ordering};

use restbook::context::Environment;
use restbook::status::ExitStatus;
use restbook::{core, signals};

/// Entry point - catches Ctrl+C and calls core::run()
fn main() -> ExitStatus {
    // Set a flag instead of exiting so in-flight work can stop cleanly
    ctrlc::set_handler(move || {
        signals::set_interrupted();
        eprintln!("\nInterrupted");

        // Second Ctrl+C exits immediately
        static SECOND_CTRL_C: AtomicBool = AtomicBool::new(false);
        if SECOND_CTRL_C.swap(true, Ordering::SeqCst) {
            std::process::exit(ExitStatus::Interrupted as i32);
        }
    })
    .ok();

    let args: Vec<String> = std::env::args().collect();
    let env = Environment::init();

    let status = core::run(args, env);

    if signals::was_interrupted() {
        return ExitStatus::Interrupted;
    }

    status
}
