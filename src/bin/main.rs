use std::env;
use std::process;

use tracing::Level;
use tracing_subscriber::{fmt as logger, fmt::format::FmtSpan};

use monowm::x11rb_backed_wm;

/// Prints a one-line diagnostic and exits.
///
/// Every terminating path funnels through here, the version query
/// included, so all of them exit nonzero.
fn fatal(msg: &str) -> ! {
    eprintln!("{}", msg);
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => {}
        [v] if v == "-v" => fatal(concat!("monowm-", env!("CARGO_PKG_VERSION"))),
        _ => fatal("usage: monowm [-v]"),
    }

    // set up the logger
    let logging = logger::fmt()
        // only log enter and exit
        .with_span_events(FmtSpan::ACTIVE)
        // log all events up to DEBUG
        .with_max_level(Level::DEBUG)
        // don't use timestamps
        .without_time()
        // don't show source filename
        .with_file(false)
        // don't show source code line
        .with_line_number(false)
        // register as global
        .try_init();
    if logging.is_err() {
        fatal("could not set up logging");
    }

    let mut wm = match x11rb_backed_wm() {
        Ok(wm) => wm,
        Err(e) => fatal(&format!("cannot open display: {}", e)),
    };

    if let Err(e) = wm.register() {
        fatal(&e.to_string());
    }
    if let Err(e) = wm.run() {
        fatal(&e.to_string());
    }
}
