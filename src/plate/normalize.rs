/// Letters the recognizer tends to read where a plate has a digit
const SUBSTITUTIONS: [(char, char); 4] = [('O', '0'), ('I', '1'), ('B', '8'), ('S', '5')];

/// Canonicalize a raw OCR string for plate matching.
///
/// Uppercases and trims, drops spaces, maps look-alike letters to digits
/// (one pass, a substituted digit is never mapped again), then keeps only
/// alphanumerics and hyphens.
pub fn normalize(raw: &str) -> String {
    raw.to_uppercase()
        .trim()
        .chars()
        .filter(|&c| c != ' ')
        .map(substitute)
        .filter(|&c| c.is_alphanumeric() || c == '-')
        .collect()
}

fn substitute(c: char) -> char {
    SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == c)
        .map_or(c, |&(_, to)| to)
}
