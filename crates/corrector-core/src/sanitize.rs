/// Strip wrapping double quotes and surrounding whitespace from model output.
///
/// Models occasionally quote the corrected message despite being told not
/// to. Unbalanced quotes and quotes inside the text are left alone. The
/// result is a fixpoint: sanitizing twice changes nothing.
pub fn sanitize(raw: &str) -> String {
    let mut s = raw.trim();
    while s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s = s[1..s.len() - 1].trim();
    }
    s.to_string()
}
