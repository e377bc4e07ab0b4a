//! Split answer text into chunks a synthesizer can speak in one utterance.
//!
//! # Algorithm
//!
//! 1. Break the text into sentences (`.`, `!`, `?` followed by whitespace or
//!    end of text).
//! 2. A sentence longer than the budget is broken at clause boundaries
//!    (`,`, `;`, `:`), and a clause still too long is broken between words.
//! 3. Pieces are packed greedily, joined by single spaces, until the next
//!    piece would overflow the budget.
//! 4. Chunk edges are rebalanced: a chunk that stops mid-phrase gives its
//!    tail (after the last `.`, `,` or `;` past its midpoint) to the next
//!    chunk, provided the next chunk stays within budget.
//!
//! Lengths are measured in characters. A single word longer than the budget
//! is emitted as its own oversize chunk.

/// Smallest budget ever used.
pub const MIN_CHUNK_LENGTH: usize = 500;

/// Budget used when the text carries contact details (long URLs).
pub const CONTACT_CHUNK_LENGTH: usize = 1000;

const CONTACT_MARKER: &str = "Contact information:";

/// Resolve the character budget for `text`.
///
/// `override_len` (from configuration) replaces the device default, but the
/// [`MIN_CHUNK_LENGTH`] floor and the contact-information bump still apply.
pub fn effective_chunk_length(device_default: usize, override_len: Option<usize>, text: &str) -> usize {
    let mut len = override_len.unwrap_or(device_default).max(MIN_CHUNK_LENGTH);
    if text.contains(CONTACT_MARKER) {
        len = len.max(CONTACT_CHUNK_LENGTH);
    }
    len
}

/// Split `text` into trimmed, non-empty chunks of at most `max_len`
/// characters.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);

    let mut pieces = Vec::new();
    for sentence in split_after(text, &['.', '!', '?']) {
        if char_len(&sentence) <= max_len {
            pieces.push(sentence);
            continue;
        }
        for phrase in split_after(&sentence, &[',', ';', ':']) {
            if char_len(&phrase) <= max_len {
                pieces.push(phrase);
            } else {
                pieces.extend(phrase.split_whitespace().map(str::to_string));
            }
        }
    }

    let mut chunks = pack(pieces, max_len);
    rebalance(&mut chunks, max_len);

    chunks
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split after runs of `delims` that are followed by whitespace or the end
/// of the text. Each returned segment is trimmed and non-empty.
fn split_after(text: &str, delims: &[char]) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if !delims.contains(&c) {
            continue;
        }
        while let Some(&next) = chars.peek() {
            if delims.contains(&next) {
                current.push(next);
                chars.next();
            } else {
                break;
            }
        }
        let at_boundary = chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            let segment = current.trim();
            if !segment.is_empty() {
                segments.push(segment.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        segments.push(rest.to_string());
    }
    segments
}

fn pack(pieces: Vec<String>, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let piece_len = char_len(&piece);
        if current.is_empty() {
            current = piece;
            current_len = piece_len;
        } else if current_len + 1 + piece_len <= max_len {
            current.push(' ');
            current.push_str(&piece);
            current_len += 1 + piece_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current = piece;
            current_len = piece_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn ends_with_pause(s: &str) -> bool {
    s.trim_end()
        .ends_with(['.', '!', '?', ',', ';', ':'])
}

fn starts_lowercase(s: &str) -> bool {
    s.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase())
}

fn rebalance(chunks: &mut [String], max_len: usize) {
    for i in 0..chunks.len().saturating_sub(1) {
        let current = chunks[i].trim_end();
        if ends_with_pause(current) || !starts_lowercase(&chunks[i + 1]) {
            continue;
        }

        let midpoint = current.len() / 2;
        let Some(break_at) = current
            .rfind(['.', ',', ';'])
            .filter(|&pos| pos > midpoint)
        else {
            continue;
        };

        let moved = current[break_at + 1..].trim();
        let next = chunks[i + 1].trim_start();
        let merged = if moved.is_empty() {
            next.to_string()
        } else {
            format!("{moved} {next}")
        };
        if char_len(&merged) > max_len {
            continue;
        }

        chunks[i] = current[..=break_at].to_string();
        chunks[i + 1] = merged;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
