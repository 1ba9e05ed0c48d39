use eyre::EyreHandler;
use std::{
    error::Error,
    fmt::{self, Write},
};

/// Env var that switches error reports to the verbose `color-eyre` handler.
pub const DEBUG_ENV: &str = "WRAP_DEBUG";

/// Prints a report as its top message followed by one `caused by` line per distinct source.
struct Handler;

impl EyreHandler for Handler {
    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return fmt::Debug::fmt(error, f);
        }
        write_report(f, error)
    }
}

fn write_report(out: &mut impl Write, error: &(dyn Error + 'static)) -> fmt::Result {
    let chain = dedup_chain(error);
    let Some((head, causes)) = chain.split_first() else { return Ok(()) };
    out.write_str(head)?;
    for cause in causes {
        write!(out, "\n  caused by: {cause}")?;
    }
    Ok(())
}

/// Installs the panic hook and the error report hook.
///
/// Reports go through `color-eyre` when `WRAP_DEBUG` is set.
pub fn install() {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section("This is a bug in wrap, please report it.")
        .into_hooks();
    panic_hook.install();
    let res = if std::env::var_os(DEBUG_ENV).is_some() {
        eyre_hook.install()
    } else {
        eyre::set_hook(Box::new(|_| Box::new(Handler)))
    };
    if let Err(err) = res {
        debug!(%err, "failed to install eyre error hook");
    }
}

/// Messages of an error and its sources, skipping any already contained in the previous one.
fn dedup_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut causes: Vec<String> = Vec::new();
    for cause in eyre::Chain::new(error) {
        let msg = cause.to_string().trim().to_string();
        // `failed: rpc down` followed by `rpc down`
        if causes.last().is_some_and(|prev| prev.contains(&msg)) {
            continue;
        }
        causes.push(msg);
    }
    causes
}
