use crate::error::DailyErrorCode;

#[derive(Debug, Clone, Copy)]
pub struct WarnEvent<'a> {
    pub code: DailyErrorCode,
    pub stage: &'a str,
    pub action: &'a str,
    pub path: &'a str,
    pub reason: &'a str,
    pub err: &'a str,
}

fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else if !ch.is_control() {
            out.push(ch);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "na".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn render(event: &WarnEvent<'_>) -> String {
    format!(
        "DAILY_WARN code={} stage={} action={} path={} reason={} err={}",
        event.code.as_str(),
        sanitize_value(event.stage),
        sanitize_value(event.action),
        sanitize_value(event.path),
        sanitize_value(event.reason),
        sanitize_value(event.err),
    )
}

/// Recoverable failures are reported on stdout next to the progress lines.
pub fn emit(event: WarnEvent<'_>) {
    println!("{}", render(&event));
}
