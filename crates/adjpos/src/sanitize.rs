use adjpos_types::{Tag, Token};

use crate::review::WordList;

/// Compounds the transcripts glue together with `+` or `{`, and what they
/// really are.
const KNOWN_COMPOUNDS: &[(&str, &[(&str, Tag)])] = &[
    ("chaise+lounge", &[("chaise", Tag::Noun), ("lounge", Tag::Adj)]),
    ("mécanique{elle", &[("mécanique", Tag::Adj), ("elle", Tag::Pron)]),
    ("rouge{pour", &[("rouge", Tag::Adj), ("pour", Tag::Adp)]),
];

/// Clean a token sequence of transcription debris.
///
/// Markers are stripped, compounds split, non-words and stray digits or
/// punctuation marked `BAD`, and every `BAD` token dropped. The result is
/// ready for a fresh pairing pass.
pub fn sanitize(tokens: &[Token], nonwords: &WordList) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.tag == Tag::Punct {
            out.push(token.clone());
            continue;
        }
        let surface = strip_markers(&token.surface);
        if surface.is_empty() {
            continue;
        }
        if surface.contains(['+', '{']) {
            split_compound(surface, &token.tag, &mut out);
        } else {
            out.push(Token::new(surface, token.tag.clone()));
        }
    }

    for token in &mut out {
        if is_nonword(&token.surface, nonwords) {
            token.tag = Tag::Bad;
        }
    }
    out.retain(|t| t.tag != Tag::Bad);
    out
}

/// Sentence text rebuilt from its tokens.
pub fn render_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.surface.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_markers(surface: &str) -> &str {
    let mut word = surface
        .strip_suffix("}.")
        .or_else(|| surface.strip_suffix(":}"))
        .unwrap_or(surface);
    word = word
        .strip_suffix('}')
        .or_else(|| word.strip_suffix('.'))
        .unwrap_or(word);
    word.strip_prefix('{').unwrap_or(word)
}

/// Unknown compounds split into cleaned parts that keep the compound's tag.
fn split_compound(surface: &str, tag: &Tag, out: &mut Vec<Token>) {
    if let Some((_, parts)) = KNOWN_COMPOUNDS.iter().find(|(raw, _)| *raw == surface) {
        out.extend(parts.iter().map(|(part, tag)| Token::new(*part, tag.clone())));
        return;
    }
    out.extend(
        surface
            .split(['+', '{'])
            .map(strip_markers)
            .filter(|part| !part.is_empty())
            .map(|part| Token::new(part, tag.clone())),
    );
}

fn is_nonword(surface: &str, nonwords: &WordList) -> bool {
    if nonwords.contains(surface) {
        return true;
    }
    let mut chars = surface.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_digit() || c.is_ascii_punctuation(),
        _ => false,
    }
}
