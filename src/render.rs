//! Diagnostic text for an intercepted call.
//!
//! The message has the form `<target> (<Type.method(arg,arg)>)`. Arguments
//! longer than [`MAX_PARAM_LENGTH`] characters are cut and marked with
//! [`ELLIPSIS`]; the target label drops everything from the first
//! [`IDENTITY_SEPARATOR`] on.

use std::{
    fmt::{Display, Write},
    panic::{self, AssertUnwindSafe},
};

use crate::descriptor::{CallDescriptor, CallSite, PARAM_PLACEHOLDER};

pub const MAX_PARAM_LENGTH: usize = 20;
pub const ELLIPSIS: &str = "...";
pub const NULL_TOKEN: &str = "null";
/// Stands in for an argument whose `Display` impl failed.
pub const ERROR_TOKEN: &str = "<error>";
pub const IDENTITY_SEPARATOR: char = '@';

pub fn render(
    target: &dyn Display,
    site: &CallSite,
    args: &[Option<&dyn Display>],
) -> String {
    let params = render_params(args);
    let label = target_label(target);
    let method = site.short_form().replacen(PARAM_PLACEHOLDER, &params, 1);

    format!("{label} ({method})")
}

pub fn render_call(call: &CallDescriptor<'_>) -> String {
    render(call.target, call.site, call.args)
}

fn render_params(args: &[Option<&dyn Display>]) -> String {
    let mut out = String::with_capacity(args.len() * (MAX_PARAM_LENGTH + ELLIPSIS.len() + 1));
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        match arg {
            None => out.push_str(NULL_TOKEN),
            Some(value) => match stringify(*value) {
                Some(text) => push_truncated(&mut out, &text),
                None => out.push_str(ERROR_TOKEN),
            },
        }
    }
    out
}

fn push_truncated(out: &mut String, text: &str) {
    match text.char_indices().nth(MAX_PARAM_LENGTH) {
        Some((cut, _)) => {
            out.push_str(&text[..cut]);
            out.push_str(ELLIPSIS);
        }
        None => out.push_str(text),
    }
}

fn target_label(target: &dyn Display) -> String {
    let mut text = stringify(target).unwrap_or_else(|| ERROR_TOKEN.to_string());
    if let Some(idx) = text.find(IDENTITY_SEPARATOR) {
        text.truncate(idx);
    }
    text
}

/// `Display` output of `value`, or `None` if formatting errored or panicked.
fn stringify(value: &dyn Display) -> Option<String> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        let mut buf = String::new();
        write!(buf, "{value}").ok().map(|_| buf)
    }))
    .ok()
    .flatten()
}
